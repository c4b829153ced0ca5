// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local network introspection and IPv4 address helpers.

use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use tracing::{debug, warn};

use printhub_core::types::NetworkInfo;

use crate::discovery::NetworkBase;

/// Connecting a UDP socket sends nothing; it only asks the OS which
/// interface would route to this address.
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

/// Hostname, outbound IPv4 address and the /24 to scan. Falls back to
/// [`NetworkInfo::fallback`] when no IPv4 route is available.
pub fn local_network_info() -> NetworkInfo {
    match outbound_ipv4() {
        Ok(ip) => {
            let base = NetworkBase::of(ip);
            let info = NetworkInfo {
                hostname: local_hostname(),
                local_ip: ip.to_string(),
                network_base: base.to_string(),
                suggested_scan_range: base.scan_range(),
            };
            debug!(local_ip = %info.local_ip, network = %info.network_base, "local network detected");
            info
        }
        Err(e) => {
            warn!(error = %e, "could not determine local network, using defaults");
            NetworkInfo::fallback()
        }
    }
}

fn outbound_ipv4() -> io::Result<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(ROUTE_PROBE_ADDR)?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Ok(ip),
        other => Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no usable IPv4 interface (got {other})"),
        )),
    }
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".into())
}

/// Dotted-quad IPv4 only: four decimal octets, nothing else.
pub fn validate_ip_address(candidate: &str) -> bool {
    candidate.parse::<Ipv4Addr>().is_ok()
}

/// RFC 1918 ranges: 10/8, 172.16/12, 192.168/16.
pub fn is_private_ip(candidate: &str) -> bool {
    candidate
        .parse::<Ipv4Addr>()
        .map(|ip| ip.is_private())
        .unwrap_or(false)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subnet discovery for raw TCP printers.
//
// Every address `a.b.c.1` … `a.b.c.254` gets a connect-only probe on the
// given port. At most `SCAN_CONCURRENCY` probes are in flight at once; each
// carries its own timeout. Hosts that time out, refuse, or fail in any other
// way are simply left out of the report. Results arrive in completion
// order, not address order.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use printhub_core::error::{PrinthubError, Result};
use printhub_core::types::{DiscoveryReport, ProbeResult};

use crate::transport::{Dialer, TcpDialer, Transport};

/// Maximum probes awaiting I/O at any moment.
pub const SCAN_CONCURRENCY: usize = 50;

/// Host numbers covered by a scan.
pub const HOST_RANGE: std::ops::RangeInclusive<u8> = 1..=254;

/// The first three octets of a /24, e.g. `192.168.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkBase([u8; 3]);

impl NetworkBase {
    pub fn new(a: u8, b: u8, c: u8) -> Self {
        Self([a, b, c])
    }

    /// The /24 containing `ip`.
    pub fn of(ip: Ipv4Addr) -> Self {
        let [a, b, c, _] = ip.octets();
        Self([a, b, c])
    }

    pub fn host(&self, last: u8) -> Ipv4Addr {
        let [a, b, c] = self.0;
        Ipv4Addr::new(a, b, c, last)
    }

    /// All 254 candidate host addresses.
    pub fn candidates(&self) -> Vec<Ipv4Addr> {
        HOST_RANGE.map(|last| self.host(last)).collect()
    }

    /// Human form of the scan range, `a.b.c.1-254`.
    pub fn scan_range(&self) -> String {
        format!("{self}.{}-{}", HOST_RANGE.start(), HOST_RANGE.end())
    }
}

impl fmt::Display for NetworkBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}.{b}.{c}")
    }
}

impl FromStr for NetworkBase {
    type Err = PrinthubError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PrinthubError::InvalidNetworkBase(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut octets = [0u8; 3];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *octet = part.parse().map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

/// Bounded fan-out of connect probes across one /24.
pub struct SubnetScanner<D = TcpDialer> {
    transport: Arc<Transport<D>>,
    concurrency: usize,
}

impl<D: Dialer> SubnetScanner<D> {
    pub fn new(transport: Arc<Transport<D>>) -> Self {
        Self {
            transport,
            concurrency: SCAN_CONCURRENCY,
        }
    }

    /// Probe every host of `base` on `port`. Waits for all probes; only
    /// fails if the scan machinery itself breaks.
    pub async fn scan(
        &self,
        base: NetworkBase,
        port: u16,
        per_host_timeout: Duration,
    ) -> Result<DiscoveryReport> {
        let started = Instant::now();
        let candidates = base.candidates();
        let scanned = candidates.len();
        info!(
            network = %base,
            port,
            timeout_ms = per_host_timeout.as_millis() as u64,
            "scanning {} on port {port}",
            base.scan_range()
        );

        let slots = Arc::new(Semaphore::new(self.concurrency));
        let mut probes = JoinSet::new();

        for ip in candidates {
            // A probe only starts once a slot is free.
            let permit = Arc::clone(&slots)
                .acquire_owned()
                .await
                .map_err(|e| PrinthubError::Discovery(format!("probe limiter closed: {e}")))?;
            let transport = Arc::clone(&self.transport);
            probes.spawn(async move {
                let _permit = permit;
                transport.probe(&ip.to_string(), port, per_host_timeout).await
            });
        }

        let mut found: Vec<ProbeResult> = Vec::new();
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok(result) if result.reachable => {
                    debug!(host = %result.host, latency_ms = result.latency_ms, "printer port open");
                    found.push(result);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "probe task failed"),
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(network = %base, found = found.len(), elapsed_ms, "scan complete");

        Ok(DiscoveryReport {
            network_base: base.to_string(),
            port,
            scanned,
            found_count: found.len(),
            found,
            elapsed_ms,
        })
    }
}

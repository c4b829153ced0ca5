// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connector facade: the three operations a front end calls.
//
// `deliver` encodes an intent and writes it to one printer, `probe` checks a
// single target, `discover` scans a /24. Defaults for port and timeouts come
// from `ConnectorConfig`; nothing is retried and nothing is kept between
// calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, info, info_span, warn};

use printhub_core::config::ConnectorConfig;
use printhub_core::error::{PrinthubError, Result};
use printhub_core::types::{
    DeliveryReceipt, DiscoveryReport, JobId, NetworkInfo, PrintIntent, PrinterTarget, ProbeResult,
    SCAN_TIMEOUT_RANGE_MS,
};

use crate::discovery::{NetworkBase, SubnetScanner};
use crate::encoder;
use crate::netinfo;
use crate::transport::{Dialer, TcpDialer, Transport};

pub struct Connector<D = TcpDialer> {
    transport: Arc<Transport<D>>,
    config: ConnectorConfig,
}

impl Connector<TcpDialer> {
    pub fn new(config: ConnectorConfig) -> Self {
        Self::with_dialer(config, TcpDialer)
    }
}

impl<D: Dialer> Connector<D> {
    pub fn with_dialer(config: ConnectorConfig, dialer: D) -> Self {
        Self {
            transport: Arc::new(Transport::new(dialer)),
            config,
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Build a target, filling port and timeout from the config.
    pub fn target(
        &self,
        host: &str,
        port: Option<u16>,
        timeout_ms: Option<u64>,
    ) -> Result<PrinterTarget> {
        PrinterTarget::new(
            host,
            port.unwrap_or(self.config.printer_port),
            timeout_ms.unwrap_or(self.config.ping_timeout_ms),
        )
    }

    /// [`target`](Self::target) for operations that only accept a dotted
    /// IPv4 literal as the host.
    pub fn ip_target(
        &self,
        host: &str,
        port: Option<u16>,
        timeout_ms: Option<u64>,
    ) -> Result<PrinterTarget> {
        if !netinfo::validate_ip_address(host.trim()) {
            return Err(PrinthubError::Validation(format!(
                "Invalid IP address: {host}"
            )));
        }
        self.target(host, port, timeout_ms)
    }

    /// Encode `intent` and write it to `target`.
    pub async fn deliver(
        &self,
        target: &PrinterTarget,
        intent: &PrintIntent,
    ) -> Result<DeliveryReceipt> {
        let job_id = JobId::new();
        let span = info_span!(
            "deliver",
            job_id = %job_id,
            addr = %target.addr(),
            intent = intent.label()
        );

        async {
            let job = encoder::encode(intent);
            match self.transport.send(target, job.as_bytes()).await {
                Ok(bytes_sent) => {
                    info!(bytes_sent, "print job delivered");
                    Ok(DeliveryReceipt {
                        job_id,
                        target: target.addr(),
                        intent: intent.label().to_string(),
                        bytes_sent,
                    })
                }
                Err(e) => {
                    warn!(kind = ?e.failure_kind(), error = %e, "print job failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Reachability check, with the status query when the config asks for
    /// it. Never fails: the outcome is in the result.
    pub async fn probe(&self, target: &PrinterTarget) -> ProbeResult {
        let result = self
            .transport
            .probe_with_status(
                target.host(),
                target.port(),
                target.timeout(),
                self.config.status_query,
            )
            .await;
        info!(
            addr = %target.addr(),
            reachable = result.reachable,
            latency_ms = result.latency_ms,
            "probe finished"
        );
        result
    }

    /// Scan `network_base` (`a.b.c`). Only a malformed base, port or
    /// timeout fails the call; unreachable hosts are just absent.
    pub async fn discover(
        &self,
        network_base: &str,
        port: Option<u16>,
        timeout_ms: Option<u64>,
    ) -> Result<DiscoveryReport> {
        let base: NetworkBase = network_base.parse()?;
        let port = port.unwrap_or(self.config.printer_port);
        if port == 0 {
            return Err(PrinthubError::Validation("port must be 1-65535".into()));
        }
        let per_host = match timeout_ms {
            Some(ms) if !SCAN_TIMEOUT_RANGE_MS.contains(&ms) => {
                return Err(PrinthubError::Validation(format!(
                    "scan timeout must be 100-10000ms, got {ms}ms"
                )));
            }
            Some(ms) => Duration::from_millis(ms),
            None => self.config.scan_timeout(),
        };
        if !netinfo::is_private_ip(&base.host(1).to_string()) {
            warn!(network = %base, "scanning a network outside the private ranges");
        }

        SubnetScanner::new(Arc::clone(&self.transport))
            .scan(base, port, per_host)
            .await
    }

    pub fn network_info(&self) -> NetworkInfo {
        netinfo::local_network_info()
    }
}

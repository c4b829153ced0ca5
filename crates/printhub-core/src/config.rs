// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connector configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PrinthubError, Result};
use crate::types::{RAW_PORT, SCAN_TIMEOUT_RANGE_MS, TIMEOUT_RANGE_MS};

/// Settings shared by every connector operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Port used when a caller does not name one (JetDirect, 9100).
    pub printer_port: u16,
    /// Default probe / delivery timeout in milliseconds.
    pub ping_timeout_ms: u64,
    /// Default per-host timeout for subnet scans in milliseconds.
    pub scan_timeout_ms: u64,
    /// Whether the enhanced probe writes the status query after connecting.
    pub status_query: bool,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            printer_port: RAW_PORT,
            ping_timeout_ms: 1500,
            scan_timeout_ms: 1000,
            status_query: true,
            log_filter: "info".into(),
        }
    }
}

impl ConnectorConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the connector cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.printer_port == 0 {
            return Err(PrinthubError::Config("printer_port must be 1-65535".into()));
        }
        if !TIMEOUT_RANGE_MS.contains(&self.ping_timeout_ms) {
            return Err(PrinthubError::Config(format!(
                "ping_timeout_ms must be 100-30000, got {}",
                self.ping_timeout_ms
            )));
        }
        if !SCAN_TIMEOUT_RANGE_MS.contains(&self.scan_timeout_ms) {
            return Err(PrinthubError::Config(format!(
                "scan_timeout_ms must be 100-10000, got {}",
                self.scan_timeout_ms
            )));
        }
        Ok(())
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }
}

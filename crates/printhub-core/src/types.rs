// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the PrintHub printer bridge.
//
// Everything here is request-scoped: intents and targets are validated once
// at construction and never mutated, probe results live for one discovery
// call, and nothing is persisted.

use std::ops::RangeInclusive;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PrinthubError, Result};

/// Default raw TCP port (HP JetDirect).
pub const RAW_PORT: u16 = 9100;

/// Accepted probe / delivery timeouts (milliseconds).
pub const TIMEOUT_RANGE_MS: RangeInclusive<u64> = 100..=30_000;

/// Accepted per-host timeouts for subnet scans (milliseconds).
pub const SCAN_TIMEOUT_RANGE_MS: RangeInclusive<u64> = 100..=10_000;

/// Upper bound on trailing line feeds for a text job.
pub const MAX_TRAILING_NEWLINES: u8 = 10;

/// Character encoding used when a caller does not name one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Unique identifier for a delivered print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Targets ----------------------------------------------------------------

/// A raw-TCP print receiver: host, port and the deadline every operation
/// against it must respect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterTarget {
    host: String,
    port: u16,
    timeout: Duration,
}

impl PrinterTarget {
    /// Validate and build a target. The host is trimmed but not resolved.
    pub fn new(host: &str, port: u16, timeout_ms: u64) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(PrinthubError::Validation("host cannot be empty".into()));
        }
        if port == 0 {
            return Err(PrinthubError::Validation("port must be 1-65535".into()));
        }
        if !TIMEOUT_RANGE_MS.contains(&timeout_ms) {
            return Err(PrinthubError::Validation(format!(
                "timeout must be 100-30000ms, got {timeout_ms}ms"
            )));
        }
        Ok(Self {
            host: host.to_string(),
            port,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `host:port`, as used in every log line and error message.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// -- Print intents ----------------------------------------------------------

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_trailing_newlines() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

/// Plain text followed by line feeds and an optional cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextJob {
    pub content: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_trailing_newlines")]
    pub trailing_newlines: u8,
    #[serde(default = "default_true")]
    pub cut_after: bool,
}

impl TextJob {
    /// A text job with the stock options: UTF-8, two line feeds, full cut.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            encoding: default_encoding(),
            trailing_newlines: default_trailing_newlines(),
            cut_after: true,
        }
    }
}

/// One line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    #[serde(alias = "qty")]
    pub quantity: u32,
    #[serde(alias = "price")]
    pub unit_price: f64,
}

/// An itemised receipt rendered through the fixed receipt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptJob {
    pub items: Vec<ReceiptItem>,
    pub total: f64,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default, alias = "datetime")]
    pub timestamp_label: Option<String>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

/// The three shapes a print request can take.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentKind {
    Text(TextJob),
    Receipt(ReceiptJob),
    /// Device-ready bytes, sent verbatim.
    Raw(Vec<u8>),
}

/// A validated print request. Only obtainable through the checking
/// constructors, so the encoder never sees malformed input.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintIntent {
    kind: IntentKind,
}

impl PrintIntent {
    pub fn text(job: TextJob) -> Result<Self> {
        if job.content.is_empty() {
            return Err(PrinthubError::Validation(
                "text is required for a text job".into(),
            ));
        }
        if job.trailing_newlines > MAX_TRAILING_NEWLINES {
            return Err(PrinthubError::Validation(format!(
                "trailing_newlines must be 0-{MAX_TRAILING_NEWLINES}, got {}",
                job.trailing_newlines
            )));
        }
        Ok(Self {
            kind: IntentKind::Text(job),
        })
    }

    pub fn receipt(job: ReceiptJob) -> Result<Self> {
        for (idx, item) in job.items.iter().enumerate() {
            if item.quantity < 1 {
                return Err(PrinthubError::Validation(format!(
                    "item {} ({:?}): quantity must be at least 1",
                    idx + 1,
                    item.name
                )));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(PrinthubError::Validation(format!(
                    "item {} ({:?}): price must be a non-negative number",
                    idx + 1,
                    item.name
                )));
            }
        }
        if !job.total.is_finite() || job.total < 0.0 {
            return Err(PrinthubError::Validation(
                "total must be a non-negative number".into(),
            ));
        }
        Ok(Self {
            kind: IntentKind::Receipt(job),
        })
    }

    pub fn raw(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(PrinthubError::Validation("raw payload is empty".into()));
        }
        Ok(Self {
            kind: IntentKind::Raw(bytes),
        })
    }

    /// Decode a strict (padded, standard alphabet) base64 payload.
    pub fn raw_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| PrinthubError::Validation(format!("raw payload is not valid base64: {e}")))?;
        Self::raw(bytes)
    }

    pub fn kind(&self) -> &IntentKind {
        &self.kind
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self.kind {
            IntentKind::Text(_) => "text",
            IntentKind::Receipt(_) => "receipt",
            IntentKind::Raw(_) => "raw",
        }
    }
}

/// The device byte stream produced from exactly one `PrintIntent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedJob {
    bytes: Vec<u8>,
}

impl EncodedJob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// -- Probing and discovery --------------------------------------------------

/// Why a probe did not reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeErrorKind {
    Timeout,
    Refused,
    Other,
}

impl ProbeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Refused => "refused",
            Self::Other => "other",
        }
    }
}

/// Bytes a device volunteered in answer to the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceResponse {
    /// Lowercase hex of the received bytes.
    pub hex: String,
    pub length: usize,
}

/// Outcome of probing one `host:port`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub host: String,
    pub port: u16,
    pub reachable: bool,
    /// Connect latency on success, time until failure otherwise.
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ProbeErrorKind>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_response: Option<DeviceResponse>,
    pub checked_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn reachable(host: &str, port: u16, latency: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            reachable: true,
            latency_ms: duration_ms(latency),
            error_kind: None,
            message: format!("Connected {host}:{port}"),
            device_response: None,
            checked_at: Utc::now(),
        }
    }

    pub fn unreachable(
        host: &str,
        port: u16,
        latency: Duration,
        kind: ProbeErrorKind,
        message: String,
    ) -> Self {
        Self {
            host: host.to_string(),
            port,
            reachable: false,
            latency_ms: duration_ms(latency),
            error_kind: Some(kind),
            message,
            device_response: None,
            checked_at: Utc::now(),
        }
    }
}

/// Reachable hosts from one subnet scan, in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub network_base: String,
    pub port: u16,
    /// Number of addresses probed.
    pub scanned: usize,
    /// Number of reachable addresses (`found.len()`).
    pub found_count: usize,
    pub found: Vec<ProbeResult>,
    pub elapsed_ms: u64,
}

impl DiscoveryReport {
    pub fn count(&self) -> usize {
        self.found.len()
    }
}

/// What this host knows about its own LAN position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub hostname: String,
    pub local_ip: String,
    pub network_base: String,
    pub suggested_scan_range: String,
}

impl NetworkInfo {
    /// Reported when the outbound interface cannot be determined.
    pub fn fallback() -> Self {
        Self {
            hostname: "unknown".into(),
            local_ip: "unknown".into(),
            network_base: "192.168.1".into(),
            suggested_scan_range: "192.168.1.1-254".into(),
        }
    }
}

/// Proof of a completed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub job_id: JobId,
    /// `host:port` the job was written to.
    pub target: String,
    /// `text`, `receipt` or `raw`.
    pub intent: String,
    pub bytes_sent: usize,
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PrintHub.

use thiserror::Error;

/// Top-level error type for all PrintHub operations.
#[derive(Debug, Error)]
pub enum PrinthubError {
    // -- Boundary validation --
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid network base {0:?}: expected three dotted octets such as 192.168.1")]
    InvalidNetworkBase(String),

    // -- Connect phase --
    #[error("timed out connecting to {addr} after {after_ms}ms")]
    Timeout { addr: String, after_ms: u64 },

    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // -- Send phase --
    #[error("sending to {addr} failed: {reason}")]
    Send { addr: String, reason: String },

    // -- Discovery --
    #[error("network scan failed: {0}")]
    Discovery(String),

    // -- Configuration / plumbing --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse outcome class handed to the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Caller-fixable input problem; nothing touched the network.
    Validation,
    /// The connect deadline elapsed.
    Timeout,
    /// Refused, unreachable, reset, or a failure while writing the job.
    Transport,
    /// Local plumbing (config file, serialization, scan machinery).
    Internal,
}

impl PrinthubError {
    /// Classify this error for the boundary layer.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) | Self::InvalidNetworkBase(_) => FailureKind::Validation,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Connect { .. } | Self::Send { .. } => FailureKind::Transport,
            Self::Discovery(_) | Self::Config(_) | Self::Io(_) | Self::Serialization(_) => {
                FailureKind::Internal
            }
        }
    }

    /// The `host:port` this error concerns, if any.
    pub fn addr(&self) -> Option<&str> {
        match self {
            Self::Timeout { addr, .. } | Self::Connect { addr, .. } | Self::Send { addr, .. } => {
                Some(addr)
            }
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrinthubError>;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for whoever sits behind the till.
//
// Every failure that leaves the connector is mapped to a plain sentence that
// names the printer address, a suggestion, and the status code the boundary
// layer should answer with.

use std::io::ErrorKind;

use crate::error::{FailureKind, PrinthubError};

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or busy printer; sending again may work.
    Transient,
    /// The operator must fix something (request fields, printer power, cable).
    ActionRequired,
    /// Retrying the same request will not help.
    Permanent,
}

/// A human-readable error with a plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary, always including `host:port` when there is one.
    pub message: String,
    /// What to try next.
    pub suggestion: String,
    /// Whether resending the identical request could succeed.
    pub retriable: bool,
    pub severity: Severity,
    /// Suggested HTTP-style status for the boundary layer.
    pub status_code: u16,
}

/// Convert a `PrinthubError` into a `HumanError`.
pub fn humanize_error(err: &PrinthubError) -> HumanError {
    match err {
        PrinthubError::Validation(detail) => HumanError {
            message: format!("The print request was rejected: {detail}."),
            suggestion: "Correct the request and send it again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
            status_code: 422,
        },

        PrinthubError::InvalidNetworkBase(base) => HumanError {
            message: format!("{base:?} is not a network to scan."),
            suggestion: "Give the first three parts of an address, for example 192.168.1.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
            status_code: 422,
        },

        PrinthubError::Timeout { addr, after_ms } => HumanError {
            message: format!("Timeout sending to {addr} (no answer within {after_ms}ms)."),
            suggestion: "Check the printer is switched on and on the same network, or allow a longer timeout.".into(),
            retriable: true,
            severity: Severity::Transient,
            status_code: 504,
        },

        PrinthubError::Connect { addr, source } => humanize_connect(addr, source),

        PrinthubError::Send { addr, reason } => HumanError {
            message: format!("Print error: the connection to {addr} broke while sending ({reason})."),
            suggestion: "Part of the job may already have printed. Check the printer before sending again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
            status_code: 502,
        },

        PrinthubError::Discovery(detail) => HumanError {
            message: "The network scan could not run.".into(),
            suggestion: format!("Try again in a moment. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
            status_code: 500,
        },

        PrinthubError::Config(detail) => HumanError {
            message: "The connector settings are not valid.".into(),
            suggestion: format!("Fix the configuration file. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
            status_code: 500,
        },

        PrinthubError::Io(e) => HumanError {
            message: "A local file could not be read.".into(),
            suggestion: format!("Check the path and permissions. ({e})"),
            retriable: false,
            severity: Severity::Permanent,
            status_code: 500,
        },

        PrinthubError::Serialization(e) => HumanError {
            message: "Some data was not in the expected format.".into(),
            suggestion: format!("Check the JSON is well formed. ({e})"),
            retriable: false,
            severity: Severity::Permanent,
            status_code: 500,
        },
    }
}

fn humanize_connect(addr: &str, source: &std::io::Error) -> HumanError {
    let (message, suggestion) = match source.kind() {
        ErrorKind::ConnectionRefused => (
            format!("Print error: {addr} refused the connection."),
            "The device is up but nothing listens on that port. Check the port number (raw printing is usually 9100).",
        ),
        ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable => (
            format!("Print error: {addr} cannot be reached."),
            "Check the address and that this computer is on the printer's network.",
        ),
        _ => (
            format!("Print error: could not connect to {addr} ({source})."),
            "Check the printer's network cable or Wi-Fi and try again.",
        ),
    };
    HumanError {
        message,
        suggestion: suggestion.into(),
        retriable: true,
        severity: Severity::Transient,
        status_code: 502,
    }
}

/// Boundary status for a failure class, for callers that only hold the kind.
pub fn status_for(kind: FailureKind) -> u16 {
    match kind {
        FailureKind::Validation => 422,
        FailureKind::Timeout => 504,
        FailureKind::Transport => 502,
        FailureKind::Internal => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let human = humanize_error(&PrinthubError::Timeout {
            addr: "192.168.1.50:9100".into(),
            after_ms: 1500,
        });
        assert_eq!(human.status_code, 504);
        assert!(human.retriable);
        assert!(human.message.contains("192.168.1.50:9100"));
    }

    #[test]
    fn refused_names_the_port() {
        let human = humanize_error(&PrinthubError::Connect {
            addr: "192.168.1.50:9100".into(),
            source: std::io::Error::from(ErrorKind::ConnectionRefused),
        });
        assert_eq!(human.status_code, 502);
        assert!(human.message.contains("refused"));
        assert!(human.suggestion.contains("9100"));
    }

    #[test]
    fn send_failure_warns_about_partial_job() {
        let human = humanize_error(&PrinthubError::Send {
            addr: "192.168.1.50:9100".into(),
            reason: "connection reset".into(),
        });
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("Part of the job"));
    }

    #[test]
    fn validation_is_not_retriable() {
        let err = PrinthubError::Validation("host cannot be empty".into());
        let human = humanize_error(&err);
        assert!(!human.retriable);
        assert_eq!(human.status_code, status_for(err.failure_kind()));
    }

    #[test]
    fn every_kind_has_a_status() {
        assert_eq!(status_for(FailureKind::Validation), 422);
        assert_eq!(status_for(FailureKind::Timeout), 504);
        assert_eq!(status_for(FailureKind::Transport), 502);
        assert_eq!(status_for(FailureKind::Internal), 500);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintHub: Core types, configuration and error definitions shared by the
// encoder, transport and discovery crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::ConnectorConfig;
pub use error::PrinthubError;
pub use types::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintHub Print: ESC/POS encoding, raw TCP transport and subnet discovery.
// This crate turns the core domain types defined in `printhub-core` into
// bytes on the wire and reachability reports.

pub mod charset;
pub mod connector;
pub mod discovery;
pub mod encoder;
pub mod escpos;
pub mod netinfo;
pub mod transport;

#[cfg(test)]
mod testing;

pub use connector::Connector;
pub use discovery::{NetworkBase, SubnetScanner};
pub use escpos::EscPos;
pub use transport::{Dialer, TcpDialer, Transport};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory network for transport and discovery tests.
//
// Each host is given a behaviour; accepted connections are tokio `duplex`
// pipes whose far end is served by a spawned task. Delays use tokio time, so
// tests run with a paused clock and never touch real sockets.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use crate::transport::Dialer;

/// How a simulated host answers a connection attempt.
#[derive(Debug, Clone)]
pub(crate) enum HostBehavior {
    /// Accept after `delay` and swallow whatever is written.
    Accept { delay: Duration },
    /// Accept after `delay`, answer the 2-byte status query with `reply`.
    Respond { delay: Duration, reply: Vec<u8> },
    /// Accept after `delay` through a pipe of `capacity` bytes that is
    /// never read, so writes beyond it stall.
    Stall { delay: Duration, capacity: usize },
    /// Accept after `delay`, then drop the far end at once.
    HangUp { delay: Duration },
    /// Reject immediately with `ConnectionRefused`.
    Refuse,
    /// Fail immediately with `HostUnreachable`.
    Unreachable,
    /// Never answer.
    Hang,
}

impl HostBehavior {
    pub(crate) fn accept(delay: Duration) -> Self {
        Self::Accept { delay }
    }
}

/// Decrements the in-flight gauge however the dial ends, including being
/// cancelled by a timeout.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SimulatedDialer {
    hosts: Arc<HashMap<String, HostBehavior>>,
    default: HostBehavior,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

impl SimulatedDialer {
    /// Every host behaves the same way.
    pub(crate) fn uniform(default: HostBehavior) -> Self {
        Self {
            hosts: Arc::new(HashMap::new()),
            default,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Override the behaviour of one host.
    pub(crate) fn with_host(mut self, host: &str, behavior: HostBehavior) -> Self {
        Arc::make_mut(&mut self.hosts).insert(host.to_string(), behavior);
        self
    }

    /// Most dials ever pending at the same moment.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn behavior(&self, host: &str) -> HostBehavior {
        self.hosts.get(host).unwrap_or(&self.default).clone()
    }
}

impl Dialer for SimulatedDialer {
    type Stream = DuplexStream;

    fn dial(&self, host: &str, _port: u16) -> impl Future<Output = io::Result<DuplexStream>> + Send {
        let behavior = self.behavior(host);
        let in_flight = Arc::clone(&self.in_flight);
        let peak = Arc::clone(&self.peak);
        self.attempts.fetch_add(1, Ordering::SeqCst);

        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlight(in_flight);

            match behavior {
                HostBehavior::Accept { delay } => {
                    tokio::time::sleep(delay).await;
                    Ok(serve(None))
                }
                HostBehavior::Respond { delay, reply } => {
                    tokio::time::sleep(delay).await;
                    Ok(serve(Some(reply)))
                }
                HostBehavior::Stall { delay, capacity } => {
                    tokio::time::sleep(delay).await;
                    Ok(stall(capacity))
                }
                HostBehavior::HangUp { delay } => {
                    tokio::time::sleep(delay).await;
                    let (client, _server) = tokio::io::duplex(64);
                    Ok(client)
                }
                HostBehavior::Refuse => Err(io::Error::from(io::ErrorKind::ConnectionRefused)),
                HostBehavior::Unreachable => Err(io::Error::from(io::ErrorKind::HostUnreachable)),
                HostBehavior::Hang => std::future::pending().await,
            }
        }
    }
}

/// Hand back the client end of a pipe whose server end drains input,
/// answering the status query first when a reply is configured.
fn serve(reply: Option<Vec<u8>>) -> DuplexStream {
    let (client, mut server) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        if let Some(reply) = reply {
            let mut query = [0u8; 2];
            if server.read_exact(&mut query).await.is_err() {
                return;
            }
            let _ = server.write_all(&reply).await;
        }
        let mut sink = Vec::new();
        let _ = server.read_to_end(&mut sink).await;
    });
    client
}

/// A pipe whose far end is held open but never read.
fn stall(capacity: usize) -> DuplexStream {
    let (client, server) = tokio::io::duplex(capacity);
    tokio::spawn(async move {
        let _server = server;
        std::future::pending::<()>().await
    });
    client
}

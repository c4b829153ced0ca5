// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP transport (JetDirect, port 9100).
//
// The simplest possible print protocol: open a TCP socket and dump bytes.
// One connection per call, no pool, no retries. A call against a target
// runs under one deadline, fixed before connecting: connect, write, status
// read and close all share it, so nothing outlives the target's timeout.
// Close failures are logged and ignored.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use printhub_core::error::{PrinthubError, Result};
use printhub_core::types::{DeviceResponse, PrinterTarget, ProbeErrorKind, ProbeResult};

use crate::escpos::cmd;

/// How long the enhanced probe waits for an answer to the status query.
pub const STATUS_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Largest status answer the enhanced probe keeps.
const STATUS_READ_LIMIT: usize = 1024;

/// Upper bound on the orderly shutdown after a write.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Largest single write, for progress logging.
const CHUNK_SIZE: usize = 8192;

/// Opens byte streams to `host:port`. The production implementation is
/// [`TcpDialer`]; tests substitute an in-memory network.
pub trait Dialer: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn dial(&self, host: &str, port: u16) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain OS sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&self, host: &str, port: u16) -> impl Future<Output = io::Result<TcpStream>> + Send {
        TcpStream::connect((host.to_owned(), port))
    }
}

/// The earlier of `deadline` and `cap` from now.
fn phase_end(deadline: Instant, cap: Duration) -> Instant {
    deadline.min(Instant::now() + cap)
}

/// An established connection to one printer. Owned exclusively by the call
/// that opened it and closed when that call finishes.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    addr: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Write the whole buffer before `deadline`, then close within what is
    /// left of it.
    ///
    /// Returns the full buffer length; callers never see a partial count.
    /// A failure mid-write is a `Send` error, since the printer may already
    /// have accepted part of the job.
    pub async fn send(mut self, bytes: &[u8], deadline: Instant) -> Result<usize> {
        let total = bytes.len();
        let mut sent = 0usize;

        let write = async {
            while sent < total {
                let end = total.min(sent + CHUNK_SIZE);
                let n = self.stream.write(&bytes[sent..end]).await?;
                if n == 0 {
                    return Err(io::Error::from(io::ErrorKind::WriteZero));
                }
                sent += n;
                debug!(sent, total, "raw TCP progress");
            }
            self.stream.flush().await
        };

        let outcome = timeout_at(deadline, write).await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(PrinthubError::Send {
                    addr: self.addr.clone(),
                    reason: format!("failed after {sent} of {total} bytes: {e}"),
                });
            }
            Err(_) => {
                return Err(PrinthubError::Send {
                    addr: self.addr.clone(),
                    reason: format!(
                        "write did not finish before the deadline ({sent} of {total} bytes accepted)"
                    ),
                });
            }
        }

        self.close_by(deadline).await;
        Ok(total)
    }

    /// Write the status query and wait briefly for an answer, never past
    /// `deadline`. Silence is normal; every failure here is logged and
    /// reported as `None`.
    pub async fn query_status(&mut self, deadline: Instant) -> Option<DeviceResponse> {
        let write = async {
            self.stream.write_all(cmd::STATUS_QUERY).await?;
            self.stream.flush().await
        };
        let written = timeout_at(phase_end(deadline, STATUS_READ_TIMEOUT), write).await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "could not send status query");
                return None;
            }
            Err(_) => {
                debug!(addr = %self.addr, "status query write stalled");
                return None;
            }
        }

        let mut buf = vec![0u8; STATUS_READ_LIMIT];
        let read = timeout_at(
            phase_end(deadline, STATUS_READ_TIMEOUT),
            self.stream.read(&mut buf),
        )
        .await;
        match read {
            Ok(Ok(0)) => None,
            Ok(Ok(n)) => {
                debug!(addr = %self.addr, length = n, "printer answered status query");
                Some(DeviceResponse {
                    hex: hex::encode(&buf[..n]),
                    length: n,
                })
            }
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "status read failed");
                None
            }
            Err(_) => {
                debug!(addr = %self.addr, "no status response");
                None
            }
        }
    }

    /// Shut the write side down within the grace period or by `deadline`,
    /// whichever comes first. Errors are logged, never surfaced.
    pub async fn close_by(mut self, deadline: Instant) {
        match timeout_at(phase_end(deadline, CLOSE_GRACE), self.stream.shutdown()).await {
            Ok(Ok(())) => debug!(addr = %self.addr, "connection closed"),
            Ok(Err(e)) => warn!(addr = %self.addr, error = %e, "close failed, ignoring"),
            Err(_) => warn!(addr = %self.addr, "close timed out, dropping connection"),
        }
    }
}

/// Connects, sends and probes through a [`Dialer`].
#[derive(Debug, Clone, Default)]
pub struct Transport<D = TcpDialer> {
    dialer: D,
}

impl Transport<TcpDialer> {
    pub fn tcp() -> Self {
        Self { dialer: TcpDialer }
    }
}

impl<D: Dialer> Transport<D> {
    pub fn new(dialer: D) -> Self {
        Self { dialer }
    }

    /// Open a connection, giving up after `budget`.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        budget: Duration,
    ) -> Result<Connection<D::Stream>> {
        self.connect_by(host, port, Instant::now() + budget, budget).await
    }

    async fn connect_by(
        &self,
        host: &str,
        port: u16,
        deadline: Instant,
        budget: Duration,
    ) -> Result<Connection<D::Stream>> {
        let addr = format!("{host}:{port}");
        debug!(addr = %addr, timeout_ms = budget.as_millis() as u64, "connecting via raw TCP");

        match timeout_at(deadline, self.dialer.dial(host, port)).await {
            Ok(Ok(stream)) => Ok(Connection { stream, addr }),
            Ok(Err(source)) => Err(PrinthubError::Connect { addr, source }),
            Err(_) => Err(PrinthubError::Timeout {
                addr,
                after_ms: budget.as_millis() as u64,
            }),
        }
    }

    /// Connect to `target`, write `bytes` in full, close. The whole call
    /// finishes within the target's timeout.
    pub async fn send(&self, target: &PrinterTarget, bytes: &[u8]) -> Result<usize> {
        let deadline = Instant::now() + target.timeout();
        info!(addr = %target.addr(), total = bytes.len(), "connecting via raw TCP");
        let connection = self
            .connect_by(target.host(), target.port(), deadline, target.timeout())
            .await?;
        let sent = connection.send(bytes, deadline).await?;
        info!(addr = %target.addr(), total = sent, "raw TCP print job sent successfully");
        Ok(sent)
    }

    /// Connect-and-close reachability check. Latency covers the connect
    /// only.
    pub async fn probe(&self, host: &str, port: u16, budget: Duration) -> ProbeResult {
        self.probe_with_status(host, port, budget, false).await
    }

    /// [`probe`](Self::probe), plus the optional status query. The answer
    /// is diagnostic only: reachability is decided by the connect alone.
    pub async fn probe_with_status(
        &self,
        host: &str,
        port: u16,
        budget: Duration,
        query_status: bool,
    ) -> ProbeResult {
        let started = Instant::now();
        let deadline = started + budget;
        let mut connection = match self.connect_by(host, port, deadline, budget).await {
            Ok(connection) => connection,
            Err(err) => return probe_failure(host, port, started.elapsed(), &err),
        };
        let mut result = ProbeResult::reachable(host, port, started.elapsed());

        if query_status {
            result.device_response = connection.query_status(deadline).await;
        }
        connection.close_by(deadline).await;
        result
    }
}

/// Map a connect failure onto the probe reason codes.
pub fn classify_failure(err: &PrinthubError) -> ProbeErrorKind {
    match err {
        PrinthubError::Timeout { .. } => ProbeErrorKind::Timeout,
        PrinthubError::Connect { source, .. } if source.kind() == io::ErrorKind::ConnectionRefused => {
            ProbeErrorKind::Refused
        }
        _ => ProbeErrorKind::Other,
    }
}

fn probe_failure(host: &str, port: u16, elapsed: Duration, err: &PrinthubError) -> ProbeResult {
    let kind = classify_failure(err);
    let message = match kind {
        ProbeErrorKind::Timeout => format!("Timeout connecting {host}:{port}"),
        ProbeErrorKind::Refused => format!("Connection refused {host}:{port}"),
        ProbeErrorKind::Other => format!("Error: {err}"),
    };
    debug!(host, port, reason = kind.as_str(), "probe failed");
    ProbeResult::unreachable(host, port, elapsed, kind, message)
}

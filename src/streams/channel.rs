//! # Error channel: many reporters, one supervisor.
//!
//! Every forwarding task and every stream source reports through an
//! [`ErrorSender`]; the foreman is the only consumer.
//!
//! ## Hand-off
//! ```text
//! reporter ── send(Report{result, ack}) ──► [mpsc, cap 1] ──► Foreman
//!    ▲                                                          │ classify
//!    └──────────────── ack (oneshot) ◄───────── Continue ───────┘
//!                      ack dropped  ◄───────── Fatal / stopped
//! ```
//!
//! ## Rules
//! - `report()` resolves only once the foreman has classified the report, so
//!   a reporter never runs ahead of supervision (backpressure).
//! - `report()` returning `false` means the run is over; the reporter stops.
//! - Reports are classified in arrival order.

use tokio::sync::{mpsc, oneshot};

use crate::error::FeedError;

/// One outcome handed to the foreman, with its acknowledgement.
pub(crate) struct Report {
    pub(crate) result: Result<(), FeedError>,
    pub(crate) ack: oneshot::Sender<()>,
}

/// Reporting side of the run's error channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ErrorSender {
    tx: mpsc::Sender<Report>,
}

impl ErrorSender {
    /// Hands `result` to the supervisor and waits until it has been classified.
    ///
    /// Returns `true` if the run keeps going, `false` if it is over (the
    /// report was fatal, or the run had already stopped).
    pub async fn report(&self, result: Result<(), FeedError>) -> bool {
        let (ack, acked) = oneshot::channel();
        if self.tx.send(Report { result, ack }).await.is_err() {
            return false;
        }
        acked.await.is_ok()
    }

    /// Shorthand for `report(Err(err.into()))`.
    pub async fn report_err(&self, err: impl Into<FeedError>) -> bool {
        self.report(Err(err.into())).await
    }

    /// Reports whether the supervisor has stopped listening.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming side, owned by the foreman.
pub(crate) struct ErrorReceiver {
    rx: mpsc::Receiver<Report>,
}

impl ErrorReceiver {
    /// Next report, or `None` once every sender is gone.
    pub(crate) async fn recv(&mut self) -> Option<Report> {
        self.rx.recv().await
    }
}

/// Creates the channel for one run.
pub(crate) fn error_channel() -> (ErrorSender, ErrorReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (ErrorSender { tx }, ErrorReceiver { rx })
}

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Report").field("result", &self.result).finish()
    }
}

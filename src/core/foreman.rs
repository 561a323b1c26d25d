//! # Foreman: the single consumer of the error channel.
//!
//! Classifies every report and decides whether the run goes on.
//!
//! ## States
//! ```text
//! Running ── stop token fired ─────────► Stopped   → Ok(())
//!    │
//!    └──── report classified Fatal ────► Failed    → Err(that exact error)
//!
//! Running ── report classified Continue ─► ack, stay Running
//! ```
//!
//! ## Rules
//! - The children token fires on **every** exit path, exactly once, through a
//!   drop guard (so an aborted or panicking foreman still releases the run)
//! - Stop is checked before the next report when both are ready
//! - A closed error channel is not an exit; the foreman then waits for stop

use std::{future::Future, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::{
    error::FeedError,
    events::{Bus, Event, EventKind},
    policies::{Classify, Verdict, classify},
    streams::{ErrorReceiver, Report},
};

/// Supervises one run.
pub(crate) struct Foreman {
    classifier: Arc<dyn Classify>,
    bus: Bus,
}

impl Foreman {
    pub(crate) fn new(classifier: Arc<dyn Classify>, bus: Bus) -> Self {
        Self { classifier, bus }
    }

    /// Loops until `stop` fires or a report is classified fatal.
    ///
    /// `children` is cancelled before this returns, whichever way it returns.
    /// The guard is armed when the future is created, so aborting it before
    /// its first poll still releases the run.
    pub(crate) fn run(
        self,
        stop: CancellationToken,
        children: CancellationToken,
        errors: ErrorReceiver,
    ) -> impl Future<Output = Result<(), FeedError>> + Send + 'static {
        let release = ReleaseChildren {
            token: children,
            bus: self.bus.clone(),
        };
        async move {
            let _release = release;
            self.supervise(stop, errors).await
        }
    }

    async fn supervise(
        self,
        stop: CancellationToken,
        mut errors: ErrorReceiver,
    ) -> Result<(), FeedError> {
        loop {
            let report = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                report = errors.recv() => report,
            };
            let Some(Report { result, ack }) = report else {
                stop.cancelled().await;
                break;
            };

            match (classify(&result, self.classifier.as_ref()), result) {
                (Verdict::Fatal, Err(err)) => {
                    self.bus
                        .publish(Event::new(EventKind::FatalError).with_error(&err));
                    return Err(err);
                }
                (_, Err(err)) => {
                    self.bus
                        .publish(Event::new(EventKind::TransientError).with_error(&err));
                    let _ = ack.send(());
                }
                (_, Ok(())) => {
                    let _ = ack.send(());
                }
            }
        }

        self.bus.publish(Event::new(EventKind::StopRequested));
        Ok(())
    }
}

/// Fires the children token when dropped.
struct ReleaseChildren {
    token: CancellationToken,
    bus: Bus,
}

impl Drop for ReleaseChildren {
    fn drop(&mut self) {
        if !self.token.is_cancelled() {
            self.token.cancel();
            self.bus.publish(Event::new(EventKind::ChildrenCancelled));
        }
    }
}

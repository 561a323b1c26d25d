//! # LogWriter: renders runtime events through `tracing`.
//!
//! Installed by default on every run (feature `logging`). Transient errors,
//! which never reach the caller, are only visible here.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  feedvisor: stream started stream="subreddits:rust"
//! WARN  feedvisor: transient error; staying up label="upstream_busy" reason="reddit is busy right now"
//! ERROR feedvisor: fatal error; shutting down label="handler_failed" reason="stream=subreddits:rust error: boom"
//! INFO  feedvisor: children cancelled
//! INFO  feedvisor: handler torn down handler="my-bot"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let stream = e.stream.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let label = e.label.unwrap_or("-");

        match e.kind {
            EventKind::StreamStarted => info!(target: "feedvisor", stream, "stream started"),
            EventKind::StreamEnded => info!(target: "feedvisor", stream, "stream ended"),
            EventKind::ForwarderPanicked => {
                error!(target: "feedvisor", stream, reason, "handler panicked")
            }
            EventKind::TransientError => {
                warn!(target: "feedvisor", label, reason, "transient error; staying up")
            }
            EventKind::FatalError => {
                error!(target: "feedvisor", label, reason, "fatal error; shutting down")
            }
            EventKind::StopRequested => info!(target: "feedvisor", "stop requested"),
            EventKind::ChildrenCancelled => info!(target: "feedvisor", "children cancelled"),
            EventKind::SetUpCompleted => {
                debug!(target: "feedvisor", handler = stream, "handler set up")
            }
            EventKind::TornDown => info!(target: "feedvisor", handler = stream, "handler torn down"),
            EventKind::GraceExceeded => {
                warn!(target: "feedvisor", stuck = reason, "forwarders did not drain within grace")
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "feedvisor", subscriber = stream, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                error!(target: "feedvisor", subscriber = stream, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

//! Error types used by the feedvisor runtime, stream sources and handlers.
//!
//! This module defines two main error enums:
//!
//! - [`UpstreamError`]: conditions reported by the Reddit transport.
//! - [`FeedError`]: everything a run can produce, from configuration
//!   mistakes to the fatal error surfaced by [`RunHandle::wait`](crate::RunHandle::wait).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Whether an error stops the run is not decided here; see [`Classify`](crate::Classify).

use std::error::Error as StdError;

use thiserror::Error;

use crate::handlers::Capability;

/// Boxed error returned by handler capabilities, set-up hooks and stream sources.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// # Conditions reported by the upstream API.
///
/// Transports map HTTP responses onto these with [`UpstreamError::from_status`].
/// The default [`TransientSet`](crate::TransientSet) treats `Busy`, `Gateway`
/// and `GatewayTimeout` as transient.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// 403 from the endpoint.
    #[error("unauthorized access to endpoint")]
    PermissionDenied,

    /// 503 from the endpoint.
    #[error("reddit is busy right now")]
    Busy,

    /// 429 from the endpoint.
    #[error("reddit is rate limiting requests")]
    RateLimit,

    /// 502 from the endpoint.
    #[error("502 bad gateway code from reddit")]
    Gateway,

    /// 504 from the endpoint.
    #[error("504 gateway timeout from reddit")]
    GatewayTimeout,

    /// The requested thread is gone.
    #[error("the requested post does not exist")]
    ThreadDoesNotExist,

    /// Any other non-OK status code.
    #[error("bad response code: {0}")]
    Status(u16),
}

impl UpstreamError {
    /// Maps an HTTP status code onto an upstream condition.
    ///
    /// Returns `None` for `200 OK`.
    ///
    /// # Example
    /// ```
    /// use feedvisor::UpstreamError;
    ///
    /// assert_eq!(UpstreamError::from_status(200), None);
    /// assert_eq!(UpstreamError::from_status(503), Some(UpstreamError::Busy));
    /// assert_eq!(UpstreamError::from_status(418), Some(UpstreamError::Status(418)));
    /// ```
    pub fn from_status(code: u16) -> Option<Self> {
        match code {
            200 => None,
            403 => Some(UpstreamError::PermissionDenied),
            429 => Some(UpstreamError::RateLimit),
            502 => Some(UpstreamError::Gateway),
            503 => Some(UpstreamError::Busy),
            504 => Some(UpstreamError::GatewayTimeout),
            other => Some(UpstreamError::Status(other)),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            UpstreamError::PermissionDenied => "upstream_permission_denied",
            UpstreamError::Busy => "upstream_busy",
            UpstreamError::RateLimit => "upstream_rate_limit",
            UpstreamError::Gateway => "upstream_bad_gateway",
            UpstreamError::GatewayTimeout => "upstream_gateway_timeout",
            UpstreamError::ThreadDoesNotExist => "upstream_thread_missing",
            UpstreamError::Status(_) => "upstream_status",
        }
    }
}

/// # Errors produced by a feedvisor run.
///
/// Configuration errors (`MissingCapability`, `LoggedOut`, `SetUp`,
/// `StreamStart`) are returned synchronously by the entry points before the
/// run is launched. Everything else travels over the error channel and, if
/// classified fatal, comes back out of [`RunHandle::wait`](crate::RunHandle::wait)
/// as the exact value that was reported.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FeedError {
    /// A switch is enabled but the handler lacks the matching capability.
    #[error("you must implement {capability} to take {} feeds", .capability.feed())]
    MissingCapability {
        /// The capability that was queried.
        capability: Capability,
    },

    /// Inbox feeds were requested without a logged in identity.
    #[error("you must be running as a logged in bot to get inbox feeds")]
    LoggedOut,

    /// The handler's set-up hook failed; nothing was started.
    #[error("handler set up failed: {0}")]
    SetUp(#[source] BoxError),

    /// A stream source refused to start a stream.
    #[error("stream {stream} failed to start: {error}")]
    StreamStart {
        /// Name of the stream that could not be started.
        stream: String,
        /// The source's error.
        #[source]
        error: BoxError,
    },

    /// An upstream condition reported by a stream source.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A handler capability returned an error for an item.
    #[error("handler failed on {stream}: {error}")]
    Handler {
        /// Name of the stream whose item was being handled.
        stream: String,
        /// The error the handler returned.
        #[source]
        error: BoxError,
    },

    /// A stream source could not continue producing.
    #[error("stream failed: {0}")]
    Stream(#[source] BoxError),

    /// A handler invocation or a stream poll panicked inside a forwarding task.
    #[error("forwarder for {stream} panicked: {info}")]
    Panicked {
        /// Name of the stream whose forwarder panicked.
        stream: String,
        /// Panic payload rendered as text.
        info: String,
    },

    /// The supervising task itself disappeared before producing a result.
    #[error("supervisor lost: {0}")]
    SupervisorLost(String),
}

impl FeedError {
    /// Wraps a handler error for the named stream.
    pub fn handler(stream: impl Into<String>, error: impl Into<BoxError>) -> Self {
        FeedError::Handler {
            stream: stream.into(),
            error: error.into(),
        }
    }

    /// Wraps a source error that ended a stream.
    pub fn stream(error: impl Into<BoxError>) -> Self {
        FeedError::Stream(error.into())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use feedvisor::{FeedError, UpstreamError};
    ///
    /// assert_eq!(FeedError::LoggedOut.as_label(), "config_logged_out");
    /// assert_eq!(FeedError::from(UpstreamError::Busy).as_label(), "upstream_busy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FeedError::MissingCapability { .. } => "config_missing_capability",
            FeedError::LoggedOut => "config_logged_out",
            FeedError::SetUp(_) => "setup_failed",
            FeedError::StreamStart { .. } => "stream_start_failed",
            FeedError::Upstream(e) => e.as_label(),
            FeedError::Handler { .. } => "handler_failed",
            FeedError::Stream(_) => "stream_failed",
            FeedError::Panicked { .. } => "forwarder_panicked",
            FeedError::SupervisorLost(_) => "supervisor_lost",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FeedError::MissingCapability { capability } => {
                format!("missing capability: {capability}")
            }
            FeedError::Handler { stream, error } => format!("stream={stream} error: {error}"),
            FeedError::Panicked { stream, info } => format!("stream={stream} panic: {info}"),
            other => other.to_string(),
        }
    }

    /// Reports whether this error belongs to the synchronous configuration class.
    ///
    /// These are returned by the entry points and never reach the supervisor.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FeedError::MissingCapability { .. }
                | FeedError::LoggedOut
                | FeedError::SetUp(_)
                | FeedError::StreamStart { .. }
        )
    }

    /// Finds an [`UpstreamError`] carried by this error, looking through boxed sources.
    ///
    /// A handler that propagates an upstream condition from its own API call
    /// is matched the same way as a stream source reporting it directly.
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            FeedError::Upstream(e) => Some(e),
            FeedError::Handler { error, .. }
            | FeedError::Stream(error)
            | FeedError::StreamStart { error, .. } => find_upstream(&**error),
            _ => None,
        }
    }
}

fn find_upstream<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a UpstreamError> {
    let mut cur: Option<&'a (dyn StdError + 'static)> = Some(err);
    while let Some(e) = cur {
        if let Some(up) = e.downcast_ref::<UpstreamError>() {
            return Some(up);
        }
        if let Some(FeedError::Upstream(up)) = e.downcast_ref::<FeedError>() {
            return Some(up);
        }
        cur = e.source();
    }
    None
}

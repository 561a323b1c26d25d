//! # Lifecycle handle returned to the caller.
//!
//! [`RunHandle`] is the `stop` / `wait` pair of one run; [`Stopper`] is a
//! cloneable `stop` that can be moved into signal handlers or other tasks.
//!
//! ## Shutdown paths
//! ```text
//! stop()  ──► stop token ──► Foreman exits Ok ──► children token fires
//!    └──► spawn teardown (waits for children token) ─┐
//!                                                    ├─► Teardown (once)
//! wait()  ──► Foreman result ──► drain forwarders ───┘        │
//!                                 (≤ grace)                   ▼
//!                                                     return Run Result
//! ```
//!
//! ## Rules
//! - `stop()` never blocks and is safe to call any number of times
//! - `wait()` returns the Foreman's result unchanged; drain overruns are events
//! - Teardown runs **at most once**, only after the children token fired

use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use tokio::{runtime::Handle, sync::OnceCell, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    core::dispatcher::Spawned,
    error::FeedError,
    events::{Bus, Event, EventKind},
    handlers::Tearer,
    subscribers::panic_message,
};

/// Single-fire guard around the handler's tear-down hook.
pub(crate) struct Teardown {
    hook: Option<Arc<dyn Tearer>>,
    handler: Arc<str>,
    children: CancellationToken,
    bus: Bus,
    done: OnceCell<()>,
}

impl Teardown {
    pub(crate) fn new(
        hook: Option<Arc<dyn Tearer>>,
        handler: Arc<str>,
        children: CancellationToken,
        bus: Bus,
    ) -> Self {
        Self {
            hook,
            handler,
            children,
            bus,
            done: OnceCell::new(),
        }
    }

    /// Runs the hook once the run is cancelled. Later calls wait for the first.
    pub(crate) async fn run(&self) {
        self.done
            .get_or_init(|| async {
                self.children.cancelled().await;
                let Some(hook) = &self.hook else { return };

                let mut ev = Event::new(EventKind::TornDown).with_stream(self.handler.clone());
                if let Err(payload) = AssertUnwindSafe(hook.tear_down()).catch_unwind().await {
                    ev = ev.with_reason(format!("panicked: {}", panic_message(payload.as_ref())));
                }
                self.bus.publish(ev);
            })
            .await;
    }
}

/// Cloneable, non-blocking stop request for one run.
#[derive(Clone)]
pub struct Stopper {
    stop: CancellationToken,
    teardown: Arc<Teardown>,
    runtime: Handle,
}

impl Stopper {
    /// Requests termination without waiting for it.
    ///
    /// May be called from any thread, including outside the runtime.
    pub fn stop(&self) {
        self.stop.cancel();
        let teardown = Arc::clone(&self.teardown);
        self.runtime.spawn(async move { teardown.run().await });
    }

    /// Reports whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

impl std::fmt::Debug for Stopper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopper")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Handle to a launched run.
///
/// Dropping it without calling [`wait`](RunHandle::wait) leaves the run going
/// until a [`Stopper`] stops it or a fatal error ends it.
pub struct RunHandle {
    stopper: Stopper,
    foreman: JoinHandle<Result<(), FeedError>>,
    forwarders: Vec<Spawned>,
    grace: Option<Duration>,
    bus: Bus,
}

impl RunHandle {
    pub(crate) fn new(
        stop: CancellationToken,
        teardown: Arc<Teardown>,
        foreman: JoinHandle<Result<(), FeedError>>,
        forwarders: Vec<Spawned>,
        grace: Option<Duration>,
        bus: Bus,
    ) -> Self {
        Self {
            stopper: Stopper {
                stop,
                teardown,
                runtime: Handle::current(),
            },
            foreman,
            forwarders,
            grace,
            bus,
        }
    }

    /// Requests termination without waiting for it. See [`Stopper::stop`].
    pub fn stop(&self) {
        self.stopper.stop();
    }

    /// Returns a cloneable stop handle.
    pub fn stopper(&self) -> Stopper {
        self.stopper.clone()
    }

    /// Names of the streams this run forwards, in wiring order.
    pub fn streams(&self) -> Vec<&str> {
        self.forwarders.iter().map(|f| &*f.stream).collect()
    }

    /// Blocks until the run is over and returns its result.
    ///
    /// `Ok(())` after a stop; otherwise the exact error classified fatal.
    /// Forwarders get up to the configured grace period to drain, then the
    /// tear-down hook runs (once, whichever path reaches it first).
    pub async fn wait(self) -> Result<(), FeedError> {
        let result = match self.foreman.await {
            Ok(result) => result,
            Err(join) => Err(FeedError::SupervisorLost(join.to_string())),
        };

        drain(self.forwarders, self.grace, &self.bus).await;
        self.stopper.teardown.run().await;
        result
    }
}

/// Joins forwarders until all are done or `grace` runs out.
async fn drain(forwarders: Vec<Spawned>, grace: Option<Duration>, bus: &Bus) {
    let Some(grace) = grace else { return };
    let deadline = time::Instant::now() + grace;

    let mut stuck = Vec::new();
    for mut forwarder in forwarders {
        if time::timeout_at(deadline, &mut forwarder.join).await.is_err() {
            stuck.push(forwarder.stream);
        }
    }
    if !stuck.is_empty() {
        bus.publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(", ")));
    }
}

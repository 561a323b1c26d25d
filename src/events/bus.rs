//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so that the foreman, every
//! forwarding task and the lifecycle hooks can publish without blocking.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Consumer (one):
//!   Foreman     ──┐
//!   Forwarder 1 ──┼──────► Bus ───────► event listener ────► SubscriberSet
//!   Forwarder N ──┤  (broadcast chan)   (spawned by Runtime)
//!   Teardown    ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits; a supervision report
//!   is never held up by observability.
//! - **Bounded capacity**: one ring buffer of `Config::bus_capacity` events.
//! - **Lag handling**: a slow listener skips the oldest events and keeps going.
//! - **No persistence**: events published with no listener attached are lost.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

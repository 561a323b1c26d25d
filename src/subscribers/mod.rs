//! # Event subscribers for the feedvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Foreman / forwarders ── publish(Event) ──► Bus ──► event listener
//!                                                          │
//!                                                  SubscriberSet::emit(Event)
//!                                                   ┌──────┴──────┐
//!                                                   ▼             ▼
//!                                               LogWriter      Custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;

use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, mpsc};

use crate::events::Bus;

/// Subscribers installed when none are given explicitly.
pub(crate) fn default_subscribers() -> Vec<Arc<dyn Subscribe>> {
    #[cfg(feature = "logging")]
    {
        vec![Arc::new(LogWriter::new())]
    }
    #[cfg(not(feature = "logging"))]
    {
        Vec::new()
    }
}

/// Subscribes to the bus and forwards events to a fresh subscriber set.
///
/// Runs until every bus publisher is gone, then drains and stops the workers.
/// Overflow/panic reports from the set itself are fanned out the same way.
pub(crate) fn spawn_listener(bus: &Bus, subs: Vec<Arc<dyn Subscribe>>) {
    if subs.is_empty() {
        return;
    }
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        let (reports_tx, mut reports) = mpsc::unbounded_channel();
        let set = SubscriberSet::new(subs, reports_tx);
        loop {
            tokio::select! {
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                Some(ev) = reports.recv() => set.emit(ev),
            }
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::events::{Event, EventKind};

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, ev: &Event) {
            if ev.kind == EventKind::StopRequested {
                panic!("panicker saw stop");
            }
        }
        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn test_fan_out_and_panic_isolation() {
        let bus = Bus::new(64);
        let rec = Arc::new(Recorder::default());
        spawn_listener(&bus, vec![rec.clone(), Arc::new(Panicker)]);

        bus.publish(Event::new(EventKind::StopRequested));
        bus.publish(Event::new(EventKind::ChildrenCancelled));

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if rec.kinds.lock().unwrap().contains(&EventKind::SubscriberPanicked) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("panic reported");

        let kinds = rec.kinds.lock().unwrap().clone();
        assert_eq!(&kinds[..2], &[EventKind::StopRequested, EventKind::ChildrenCancelled]);
    }

    #[tokio::test]
    async fn test_overflow_is_reported() {
        struct Stalled;

        #[async_trait]
        impl Subscribe for Stalled {
            async fn on_event(&self, _ev: &Event) {
                futures::future::pending::<()>().await;
            }
            fn queue_capacity(&self) -> usize {
                1
            }
            fn name(&self) -> &'static str {
                "stalled"
            }
        }

        let (reports_tx, mut reports) = mpsc::unbounded_channel();
        let set = SubscriberSet::new(vec![Arc::new(Stalled)], reports_tx);

        for _ in 0..4 {
            set.emit(Event::new(EventKind::StreamStarted));
            tokio::task::yield_now().await;
        }

        let ev = tokio::time::timeout(Duration::from_secs(1), reports.recv())
            .await
            .expect("overflow reported")
            .expect("reports open");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.stream.as_deref(), Some("stalled"));
    }
}

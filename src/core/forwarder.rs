//! # Forwarder: one stream, one handler capability.
//!
//! Pulls items from an [`ItemStream`] and hands each one to the handler,
//! then reports the outcome to the foreman.
//!
//! ## Loop
//! ```text
//! publish StreamStarted
//! loop {
//!   ├─► cancel fired?            → exit
//!   ├─► items.next()
//!   │     ├─► None               → publish StreamEnded, exit
//!   │     └─► panic              → report Panicked, exit
//!   ├─► deliver(item)            (panic caught → Panicked, ForwarderPanicked)
//!   └─► errors.report(outcome)
//!         └─► false (fatal/stop) → exit
//! }
//! ```
//!
//! ## Rules
//! - Items are delivered **one at a time**, in stream order
//! - The next item is not pulled until the previous outcome was classified
//! - A handler or stream panic is reported like any other error (classified fatal by default)

use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::{FutureExt, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{BoxError, FeedError},
    events::{Bus, Event, EventKind},
    streams::{ErrorSender, ItemStream},
    subscribers::panic_message,
};

/// Drives one stream into one handler capability.
pub(crate) struct Forwarder<T, F> {
    /// Stream name used in errors and events.
    pub stream: Arc<str>,
    pub items: ItemStream<T>,
    /// Invokes the handler capability for one item.
    pub deliver: F,
    pub errors: ErrorSender,
    pub bus: Bus,
}

impl<T, F, Fut> Forwarder<T, F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    /// Runs until the stream ends, the run is cancelled, or a report is refused.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.bus
            .publish(Event::new(EventKind::StreamStarted).with_stream(self.stream.clone()));

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = AssertUnwindSafe(self.items.next()).catch_unwind() => next,
            };
            let item = match next {
                Ok(Some(item)) => item,
                Ok(None) => {
                    self.bus.publish(
                        Event::new(EventKind::StreamEnded).with_stream(self.stream.clone()),
                    );
                    break;
                }
                Err(payload) => {
                    // A panicked stream cannot be polled again.
                    let err = panicked(&self.stream, &self.bus, payload);
                    let _ = self.errors.report(Err(err)).await;
                    break;
                }
            };

            let outcome = deliver_one(&self.stream, &self.deliver, &self.bus, item).await;
            if !self.errors.report(outcome).await {
                break;
            }
        }
    }
}

/// Invokes the handler for one item, turning errors and panics into reports.
async fn deliver_one<T, F, Fut>(
    stream: &Arc<str>,
    deliver: &F,
    bus: &Bus,
    item: T,
) -> Result<(), FeedError>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), BoxError>>,
{
    match AssertUnwindSafe(deliver(item)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(FeedError::handler(&**stream, error)),
        Err(payload) => Err(panicked(stream, bus, payload)),
    }
}

fn panicked(stream: &Arc<str>, bus: &Bus, payload: Box<dyn Any + Send>) -> FeedError {
    let info = panic_message(payload.as_ref());
    bus.publish(
        Event::new(EventKind::ForwarderPanicked)
            .with_stream(stream.clone())
            .with_reason(info.clone()),
    );
    FeedError::Panicked {
        stream: stream.to_string(),
        info,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::streams::error_channel;

    fn forwarder(
        items: Vec<u32>,
        seen: Arc<Mutex<Vec<u32>>>,
        errors: ErrorSender,
    ) -> Forwarder<u32, impl Fn(u32) -> futures::future::Ready<Result<(), BoxError>>> {
        Forwarder {
            stream: Arc::from("numbers"),
            items: stream::iter(items).boxed(),
            deliver: move |n: u32| {
                seen.lock().unwrap().push(n);
                let res: Result<(), BoxError> = if n == 2 { Err("two".into()) } else { Ok(()) };
                futures::future::ready(res)
            },
            errors,
            bus: Bus::new(16),
        }
    }

    #[tokio::test]
    async fn test_reports_each_outcome_in_order() {
        let (tx, mut rx) = error_channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(forwarder(vec![1, 2, 3], seen.clone(), tx).run(CancellationToken::new()));

        let mut outcomes = Vec::new();
        while let Some(report) = rx.recv().await {
            outcomes.push(report.result.is_ok());
            let _ = report.ack.send(());
        }
        task.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(outcomes, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_refused_report_stops_delivery() {
        let (tx, mut rx) = error_channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(forwarder(vec![1, 2, 3], seen.clone(), tx).run(CancellationToken::new()));

        let first = rx.recv().await.expect("first");
        let _ = first.ack.send(());
        let second = rx.recv().await.expect("second");
        assert!(matches!(second.result, Err(FeedError::Handler { ref stream, .. }) if stream == "numbers"));
        drop(second);
        task.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let (tx, mut rx) = error_channel();
        let fwd = Forwarder {
            stream: Arc::from("explosive"),
            items: stream::iter(vec![1u32]).boxed(),
            deliver: |_n: u32| async move {
                if true {
                    panic!("kaboom");
                }
                Ok::<(), BoxError>(())
            },
            errors: tx,
            bus: Bus::new(16),
        };
        let task = tokio::spawn(fwd.run(CancellationToken::new()));

        let report = rx.recv().await.expect("report");
        match report.result {
            Err(FeedError::Panicked { stream, info }) => {
                assert_eq!(stream, "explosive");
                assert_eq!(info, "kaboom");
            }
            other => panic!("unexpected: {other:?}"),
        }
        drop(report.ack);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stream_panic_is_reported() {
        let (tx, mut rx) = error_channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let fwd = Forwarder {
            stream: Arc::from("brittle"),
            items: stream::iter(vec![1u32])
                .chain(stream::poll_fn(|_| -> std::task::Poll<Option<u32>> {
                    panic!("poll exploded")
                }))
                .boxed(),
            deliver: move |n: u32| {
                sink.lock().unwrap().push(n);
                futures::future::ready(Ok::<(), BoxError>(()))
            },
            errors: tx,
            bus: Bus::new(16),
        };
        let task = tokio::spawn(fwd.run(CancellationToken::new()));

        let first = rx.recv().await.expect("first item");
        assert!(first.result.is_ok());
        let _ = first.ack.send(());

        let report = rx.recv().await.expect("panic report");
        match report.result {
            Err(FeedError::Panicked { stream, info }) => {
                assert_eq!(stream, "brittle");
                assert_eq!(info, "poll exploded");
            }
            other => panic!("unexpected: {other:?}"),
        }
        let _ = report.ack.send(());
        task.await.unwrap();
        assert!(rx.recv().await.is_none());
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_cancel_stops_pending_stream() {
        let (tx, _rx) = error_channel();
        let cancel = CancellationToken::new();
        let fwd = Forwarder {
            stream: Arc::from("idle"),
            items: stream::pending::<u32>().boxed(),
            deliver: |_n: u32| async { Ok::<(), BoxError>(()) },
            errors: tx,
            bus: Bus::new(16),
        };
        let task = tokio::spawn(fwd.run(cancel.clone()));
        cancel.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("forwarder exits")
            .unwrap();
    }
}

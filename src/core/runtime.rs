//! # Runtime: entry points that turn a handler + a source into a run.
//!
//! ## Launch sequence
//! ```text
//! run(handler, bot) / scan(handler, scanner)
//!   1. inbox switches without a logged in identity ─► Err(LoggedOut)
//!   2. dispatcher::plan(handler, cfg)              ─► Err(MissingCapability)
//!   3. event bus + subscriber listener
//!   4. handler.loader().set_up()                   ─► Err(SetUp)
//!   5. spawn Foreman
//!   6. dispatcher::start(routes, source, ctx)
//!        └─ Err ─► abort Foreman, teardown         ─► Err(StreamStart)
//!   7. spawn forwarders                            ─► Ok(RunHandle)
//! ```
//!
//! Steps 1 and 2 have no side effects: a rejected configuration starts
//! nothing and never calls the handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::{
        dispatcher::{self, Route},
        foreman::Foreman,
        lifecycle::{RunHandle, Teardown},
    },
    error::FeedError,
    events::{Bus, Event, EventKind},
    handlers::HandlerRef,
    policies::{Classify, TransientSet},
    streams::{Bot, Scanner, StreamContext, error_channel},
    subscribers::{self, Subscribe},
};

/// Launches runs with a shared configuration, subscriber set and classifier.
///
/// ## Example
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use feedvisor::{Config, HandlerRef, Runtime, Scanner, TransientSet, UpstreamError};
/// # async fn demo(handler: HandlerRef, source: Arc<dyn Scanner>) -> Result<(), feedvisor::FeedError> {
/// let cfg = Config {
///     subreddits: vec!["rust".into()],
///     ..Config::default()
/// };
/// let runtime = Runtime::builder(cfg)
///     .with_classifier(TransientSet::default().with(UpstreamError::RateLimit))
///     .build();
///
/// let run = runtime.scan(handler, source).await?;
/// run.stopper().stop();
/// run.wait().await
/// # }
/// ```
#[derive(Clone)]
pub struct Runtime {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    classifier: Arc<dyn Classify>,
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Option<Vec<Arc<dyn Subscribe>>>,
    classifier: Arc<dyn Classify>,
}

impl RuntimeBuilder {
    /// Replaces the default subscribers (the built-in log writer, if enabled).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = Some(subscribers);
        self
    }

    /// Replaces the default [`TransientSet`] with another classifier.
    pub fn with_classifier(mut self, classifier: impl Classify) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Finishes the builder; unset subscribers fall back to the defaults.
    pub fn build(self) -> Runtime {
        Runtime {
            cfg: self.cfg,
            subscribers: self
                .subscribers
                .unwrap_or_else(subscribers::default_subscribers),
            classifier: self.classifier,
        }
    }
}

impl Runtime {
    /// Runtime with default subscribers and classifier.
    pub fn new(cfg: Config) -> Self {
        Self::builder(cfg).build()
    }

    /// Starts a [`RuntimeBuilder`] with the default [`TransientSet`] classifier.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder {
            cfg,
            subscribers: None,
            classifier: Arc::new(TransientSet::default()),
        }
    }

    /// Configuration every run of this runtime uses.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs `handler` against a bot; every switch is allowed.
    ///
    /// Inbox switches need `bot.logged_in()`; otherwise this fails with
    /// [`FeedError::LoggedOut`] before anything starts.
    pub async fn run(
        &self,
        handler: HandlerRef,
        bot: Arc<dyn Bot>,
    ) -> Result<RunHandle, FeedError> {
        if self.cfg.wants_inbox() && !bot.logged_in() {
            return Err(FeedError::LoggedOut);
        }
        let routes = dispatcher::plan(&handler, &self.cfg)?;
        self.launch(handler, routes, &*bot, Some(&*bot)).await
    }

    /// Runs `handler` against a logged-out scanner.
    ///
    /// Any inbox switch fails with [`FeedError::LoggedOut`], even before the
    /// handler's capabilities are checked.
    pub async fn scan(
        &self,
        handler: HandlerRef,
        scanner: Arc<dyn Scanner>,
    ) -> Result<RunHandle, FeedError> {
        if self.cfg.wants_inbox() {
            return Err(FeedError::LoggedOut);
        }
        let routes = dispatcher::plan(&handler, &self.cfg)?;
        self.launch(handler, routes, &*scanner, None).await
    }

    async fn launch<S: Scanner + ?Sized>(
        &self,
        handler: HandlerRef,
        routes: Vec<Route>,
        scanner: &S,
        bot: Option<&dyn Bot>,
    ) -> Result<RunHandle, FeedError> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        subscribers::spawn_listener(&bus, self.subscribers.clone());
        let name: Arc<str> = Arc::from(handler.name());

        if let Some(loader) = handler.clone().loader() {
            loader.set_up().await.map_err(FeedError::SetUp)?;
            bus.publish(Event::new(EventKind::SetUpCompleted).with_stream(name.clone()));
        }

        let children = CancellationToken::new();
        let teardown = Arc::new(Teardown::new(
            handler.clone().tearer(),
            name,
            children.clone(),
            bus.clone(),
        ));
        let (errors, reports) = error_channel();
        let ctx = StreamContext {
            cancel: children.clone(),
            errors,
        };

        // Sources may report while they start.
        let stop = CancellationToken::new();
        let foreman = tokio::spawn(
            Foreman::new(self.classifier.clone(), bus.clone()).run(
                stop.clone(),
                children.clone(),
                reports,
            ),
        );

        let wired = match dispatcher::start(routes, scanner, bot, &ctx).await {
            Ok(wired) => wired,
            Err(err) => {
                foreman.abort();
                let _ = foreman.await;
                teardown.run().await;
                return Err(err);
            }
        };
        let forwarders = wired.spawn(&ctx.errors, &children, &bus);
        drop(ctx);

        Ok(RunHandle::new(
            stop,
            teardown,
            foreman,
            forwarders,
            self.cfg.grace_period(),
            bus,
        ))
    }
}

/// Runs `handler` against `bot` with default subscribers and classifier.
///
/// Shorthand for `Runtime::new(cfg).run(handler, bot)`.
pub async fn run(
    handler: HandlerRef,
    bot: Arc<dyn Bot>,
    cfg: Config,
) -> Result<RunHandle, FeedError> {
    Runtime::new(cfg).run(handler, bot).await
}

/// Runs `handler` against a logged-out `scanner` with default subscribers and classifier.
///
/// Shorthand for `Runtime::new(cfg).scan(handler, scanner)`.
pub async fn scan(
    handler: HandlerRef,
    scanner: Arc<dyn Scanner>,
    cfg: Config,
) -> Result<RunHandle, FeedError> {
    Runtime::new(cfg).scan(handler, scanner).await
}

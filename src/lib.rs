//! # feedvisor
//!
//! **Feedvisor** supervises a handler attached to Reddit event streams.
//!
//! A caller hands over one handler object and a set of feed switches
//! (subreddit posts, comments, user activity, inbox). Feedvisor checks that
//! the handler can take every requested feed, starts one stream per feed,
//! forwards each item to the handler, and runs the whole set as one unit:
//! a non-blocking `stop()` and a blocking `wait()` that returns the error
//! that ended the run, if any.
//!
//! Polling, de-duplication and the HTTP transport are not part of this
//! crate; they plug in through the [`Scanner`] and [`Bot`] traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Config (switches)          Handler (capabilities)        Scanner / Bot
//!         │                            │                           │
//!         └─────────────┬──────────────┘                           │
//!                       ▼                                          │
//! ┌───────────────────────────────────────────────────────────┐    │
//! │  Dispatcher                                               │    │
//! │  - plan: one capability check per enabled switch          │    │
//! │  - start: one stream per route (in category order) ◄──────┼────┘
//! └──────┬──────────────────┬──────────────────┬──────────────┘
//!        ▼                  ▼                  ▼
//!   ┌───────────┐      ┌───────────┐      ┌───────────┐
//!   │ Forwarder │      │ Forwarder │      │ Forwarder │   item → handler
//!   └─────┬─────┘      └─────┬─────┘      └─────┬─────┘
//!         │ report(result)   │                  │        (sources report too)
//!         ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Error channel (mpsc, cap 1, acked hand-off)              │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Foreman                                                  │
//! │  - classify(result) ─► Continue: ack, keep looping        │
//! │                     └► Fatal:    return that error        │
//! │  - stop token fired ─► return Ok                          │
//! │  - on exit: children token fires exactly once             │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               ▼
//!            RunHandle::wait() ─► drain (≤ grace) ─► Teardown (once)
//! ```
//!
//! ### Events
//! Every component publishes [`Event`]s on a broadcast bus; a listener fans
//! them out to [`Subscribe`] implementors through per-subscriber queues. The
//! built-in [`LogWriter`] turns them into `tracing` records.
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                      |
//! |-------------------|-------------------------------------------------------------|-----------------------------------------|
//! | **Handlers**      | One narrow trait per feed, queried through [`Handler`].     | [`Handler`], [`PostHandler`], [`PostFn`] |
//! | **Sources**       | Stream collaborators for logged-out and logged-in feeds.    | [`Scanner`], [`Bot`], [`ItemStream`]    |
//! | **Policies**      | Which errors keep a run alive.                              | [`Classify`], [`TransientSet`]          |
//! | **Lifecycle**     | Launch, stop and wait for a run.                            | [`Runtime`], [`RunHandle`], [`Stopper`] |
//! | **Errors**        | Typed errors for configuration and runtime failures.        | [`FeedError`], [`UpstreamError`]        |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, alerts).        | [`Subscribe`], [`Event`]                |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use futures::StreamExt;
//! use feedvisor::{
//!     BoxError, Comment, Config, ItemStream, Post, PostFn, Scanner, StreamContext, UserStreams,
//! };
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Scanner for Canned {
//!     async fn subreddits(&self, _: &[String], _: StreamContext) -> Result<ItemStream<Post>, BoxError> {
//!         let post = Post { title: "hello".into(), ..Post::default() };
//!         Ok(futures::stream::iter([post]).chain(futures::stream::pending()).boxed())
//!     }
//!     async fn custom_feed(&self, _: &str, _: &[String], _: StreamContext) -> Result<ItemStream<Post>, BoxError> {
//!         Ok(futures::stream::pending().boxed())
//!     }
//!     async fn subreddit_comments(&self, _: &[String], _: StreamContext) -> Result<ItemStream<Comment>, BoxError> {
//!         Ok(futures::stream::pending().boxed())
//!     }
//!     async fn user(&self, _: &str, _: StreamContext) -> Result<UserStreams, BoxError> {
//!         Ok(UserStreams {
//!             posts: futures::stream::pending().boxed(),
//!             comments: futures::stream::pending().boxed(),
//!         })
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         subreddits: vec!["rust".into()],
//!         ..Config::default()
//!     };
//!
//!     let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();
//!     let handler = PostFn::arc("announcer", move |post: Post| {
//!         let seen_tx = seen_tx.clone();
//!         async move {
//!             seen_tx.send(post.title)?;
//!             Ok::<(), BoxError>(())
//!         }
//!     });
//!
//!     let run = feedvisor::scan(handler, Arc::new(Canned), cfg).await?;
//!     assert_eq!(seen_rx.recv().await.as_deref(), Some("hello"));
//!
//!     run.stop();
//!     run.wait().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod handlers;
mod items;
mod policies;
mod streams;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{RunHandle, Runtime, RuntimeBuilder, Stopper, run, scan};
pub use error::{BoxError, FeedError, UpstreamError};
pub use events::{Event, EventKind};
pub use handlers::{
    Capability, CommentHandler, CommentReplyHandler, Handler, HandlerRef, Loader, MentionHandler,
    MessageHandler, PostFn, PostHandler, PostReplyHandler, Tearer, UserHandler, offers,
};
pub use items::{Comment, Message, Post};
pub use policies::{Classify, TransientSet, Verdict, classify};
pub use streams::{Bot, ErrorSender, ItemStream, Scanner, StreamContext, UserStreams};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in subscriber rendering events through `tracing`.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

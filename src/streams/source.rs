//! # Stream source boundary.
//!
//! The polling and de-duplication that turn API responses into item streams
//! live outside this crate. A source implements [`Scanner`] (logged-out
//! feeds) and optionally [`Bot`] (inbox feeds, needs credentials).
//!
//! ## Contract
//! - Each method starts one stream and returns it. It may report through
//!   [`StreamContext::errors`] before returning; the supervisor is already
//!   running and a fatal report cancels the run.
//! - Producers stop once [`StreamContext::cancel`] fires; returned streams
//!   should end or stay pending after that.
//! - A producer that cannot continue reports through
//!   [`StreamContext::errors`]; the supervisor classifies it like any other
//!   error (an upstream `Busy` keeps the run alive).
//! - Returning `Err` from a method aborts wiring before the run starts.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;
use crate::items::{Comment, Message, Post};

use super::channel::ErrorSender;

/// Lazy, unbounded, cancellable sequence of items.
pub type ItemStream<T> = BoxStream<'static, T>;

/// Shared primitives handed to every stream source.
#[derive(Clone, Debug)]
pub struct StreamContext {
    /// Fires once when the run ends, for whatever reason.
    pub cancel: CancellationToken,
    /// Where producers report errors of their own.
    pub errors: ErrorSender,
}

/// The two streams of one watched user.
pub struct UserStreams {
    /// Posts the user submits.
    pub posts: ItemStream<Post>,
    /// Comments the user writes.
    pub comments: ItemStream<Comment>,
}

/// Feeds available without credentials.
#[async_trait]
pub trait Scanner: Send + Sync + 'static {
    /// New posts of all `subreddits`, as one stream.
    async fn subreddits(
        &self,
        subreddits: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Post>, BoxError>;

    /// New posts of `user`'s custom `feeds`, as one stream.
    async fn custom_feed(
        &self,
        user: &str,
        feeds: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Post>, BoxError>;

    /// New comments of all `subreddits`, as one stream.
    async fn subreddit_comments(
        &self,
        subreddits: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Comment>, BoxError>;

    /// New posts and comments of `user`.
    async fn user(&self, user: &str, ctx: StreamContext) -> Result<UserStreams, BoxError>;
}

/// Inbox feeds, available to an authenticated identity.
#[async_trait]
pub trait Bot: Scanner {
    /// Whether this identity holds credentials.
    ///
    /// A bot that answers `false` can still be run with logged-out feeds;
    /// inbox switches are then rejected before wiring.
    fn logged_in(&self) -> bool {
        true
    }

    async fn post_replies(&self, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError>;

    async fn comment_replies(&self, ctx: StreamContext)
    -> Result<ItemStream<Message>, BoxError>;

    async fn mentions(&self, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError>;

    async fn messages(&self, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError>;
}

//! # Capability traits.
//!
//! One narrow async trait per event category, plus the optional set-up and
//! tear-down hooks. A handler implements whichever of these it needs and
//! advertises them through [`Handler`](crate::Handler).
//!
//! ## Rules
//! - Capabilities are invoked **concurrently** from several forwarding tasks;
//!   implementors guard their own mutable state.
//! - Returning `Err` reports the error to the supervisor, which decides
//!   between continue and shutdown. An upstream `Busy` propagated with `?`
//!   keeps the run alive under the default classifier.
//! - A handler invocation is never preempted; cancellation is observed
//!   between items.

use std::fmt;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::items::{Comment, Message, Post};

/// Named capability, used in [`FeedError::MissingCapability`](crate::FeedError::MissingCapability).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// [`PostHandler`]: subreddit and custom feeds.
    Post,
    /// [`CommentHandler`]: subreddit comment feeds.
    Comment,
    /// [`UserHandler`]: watched users.
    User,
    /// [`PostReplyHandler`]: inbox post replies.
    PostReply,
    /// [`CommentReplyHandler`]: inbox comment replies.
    CommentReply,
    /// [`MentionHandler`]: inbox username mentions.
    Mention,
    /// [`MessageHandler`]: inbox private messages.
    Message,
}

impl Capability {
    /// Trait name a handler must implement for this capability.
    pub fn trait_name(self) -> &'static str {
        match self {
            Capability::Post => "PostHandler",
            Capability::Comment => "CommentHandler",
            Capability::User => "UserHandler",
            Capability::PostReply => "PostReplyHandler",
            Capability::CommentReply => "CommentReplyHandler",
            Capability::Mention => "MentionHandler",
            Capability::Message => "MessageHandler",
        }
    }

    /// Human name of the feeds this capability takes.
    pub fn feed(self) -> &'static str {
        match self {
            Capability::Post => "subreddit",
            Capability::Comment => "subreddit comment",
            Capability::User => "user",
            Capability::PostReply => "post reply",
            Capability::CommentReply => "comment reply",
            Capability::Mention => "mention",
            Capability::Message => "message",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trait_name())
    }
}

/// Receives new posts from subreddit and custom feeds.
#[async_trait]
pub trait PostHandler: Send + Sync + 'static {
    /// Handles one post, in feed order for its stream.
    async fn post(&self, post: Post) -> Result<(), BoxError>;
}

/// Receives new comments from subreddit comment feeds.
#[async_trait]
pub trait CommentHandler: Send + Sync + 'static {
    /// Handles one comment, in feed order for its stream.
    async fn comment(&self, comment: Comment) -> Result<(), BoxError>;
}

/// Receives activity of watched users.
///
/// Posts and comments arrive on independent streams; no ordering holds
/// between the two methods.
#[async_trait]
pub trait UserHandler: Send + Sync + 'static {
    /// Handles a post submitted by a watched user.
    async fn user_post(&self, post: Post) -> Result<(), BoxError>;
    /// Handles a comment written by a watched user.
    async fn user_comment(&self, comment: Comment) -> Result<(), BoxError>;
}

/// Receives replies to the bot's posts.
#[async_trait]
pub trait PostReplyHandler: Send + Sync + 'static {
    /// Handles one reply to a post the bot submitted.
    async fn post_reply(&self, reply: Message) -> Result<(), BoxError>;
}

/// Receives replies to the bot's comments.
#[async_trait]
pub trait CommentReplyHandler: Send + Sync + 'static {
    /// Handles one reply to a comment the bot wrote.
    async fn comment_reply(&self, reply: Message) -> Result<(), BoxError>;
}

/// Receives username mentions of the bot.
#[async_trait]
pub trait MentionHandler: Send + Sync + 'static {
    /// Handles one `u/` mention of the bot's username.
    async fn mention(&self, mention: Message) -> Result<(), BoxError>;
}

/// Receives private messages sent to the bot.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Handles one private message.
    async fn message(&self, msg: Message) -> Result<(), BoxError>;
}

/// Set-up hook, run once before any stream starts.
///
/// A failure aborts the run; nothing is started and tear-down is not invoked.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    /// Prepares the handler; `Err` is returned from the entry point as [`FeedError::SetUp`](crate::FeedError::SetUp).
    async fn set_up(&self) -> Result<(), BoxError>;
}

/// Tear-down hook, run at most once when the run ends.
///
/// Best-effort: there is no error to return and nothing waits on its outcome
/// beyond [`RunHandle::wait`](crate::RunHandle::wait).
#[async_trait]
pub trait Tearer: Send + Sync + 'static {
    /// Releases whatever [`Loader::set_up`] acquired.
    async fn tear_down(&self);
}

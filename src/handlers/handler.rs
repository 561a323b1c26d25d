//! # Capability query trait.
//!
//! [`Handler`] is how the dispatcher asks "does this object take feed X?"
//! without runtime type assertions. Every query defaults to `None`; a handler
//! opts into a capability by returning itself:
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use feedvisor::{BoxError, Handler, Post, PostHandler};
//!
//! struct Announcer;
//!
//! #[async_trait]
//! impl PostHandler for Announcer {
//!     async fn post(&self, post: Post) -> Result<(), BoxError> {
//!         println!("new post: {}", post.title);
//!         Ok(())
//!     }
//! }
//!
//! impl Handler for Announcer {
//!     fn post_handler(self: Arc<Self>) -> Option<Arc<dyn PostHandler>> {
//!         Some(self)
//!     }
//! }
//!
//! let h: Arc<dyn Handler> = Arc::new(Announcer);
//! assert!(h.clone().post_handler().is_some());
//! assert!(h.comment_handler().is_none());
//! ```
//!
//! The handler is shared (`Arc`), never copied; each forwarding task holds
//! its own clone of the capability handle it was wired with.

use std::sync::Arc;

use super::capability::{
    Capability, CommentHandler, CommentReplyHandler, Loader, MentionHandler, MessageHandler,
    PostHandler, PostReplyHandler, Tearer, UserHandler,
};

/// Shared reference to a handler (`Arc<dyn Handler>`).
pub type HandlerRef = Arc<dyn Handler>;

/// An object offering zero or more capabilities.
pub trait Handler: Send + Sync + 'static {
    /// Name used in runtime events. Override it; the default is the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn post_handler(self: Arc<Self>) -> Option<Arc<dyn PostHandler>> {
        None
    }

    fn comment_handler(self: Arc<Self>) -> Option<Arc<dyn CommentHandler>> {
        None
    }

    fn user_handler(self: Arc<Self>) -> Option<Arc<dyn UserHandler>> {
        None
    }

    fn post_reply_handler(self: Arc<Self>) -> Option<Arc<dyn PostReplyHandler>> {
        None
    }

    fn comment_reply_handler(self: Arc<Self>) -> Option<Arc<dyn CommentReplyHandler>> {
        None
    }

    fn mention_handler(self: Arc<Self>) -> Option<Arc<dyn MentionHandler>> {
        None
    }

    fn message_handler(self: Arc<Self>) -> Option<Arc<dyn MessageHandler>> {
        None
    }

    /// Optional set-up hook.
    fn loader(self: Arc<Self>) -> Option<Arc<dyn Loader>> {
        None
    }

    /// Optional tear-down hook.
    fn tearer(self: Arc<Self>) -> Option<Arc<dyn Tearer>> {
        None
    }
}

/// Reports whether `handler` offers `capability`.
///
/// Used for diagnostics; the dispatcher keeps the returned handle instead.
pub fn offers(handler: &HandlerRef, capability: Capability) -> bool {
    let h = Arc::clone(handler);
    match capability {
        Capability::Post => h.post_handler().is_some(),
        Capability::Comment => h.comment_handler().is_some(),
        Capability::User => h.user_handler().is_some(),
        Capability::PostReply => h.post_reply_handler().is_some(),
        Capability::CommentReply => h.comment_reply_handler().is_some(),
        Capability::Mention => h.mention_handler().is_some(),
        Capability::Message => h.message_handler().is_some(),
    }
}

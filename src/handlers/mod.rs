//! # Handler abstractions.
//!
//! This module provides the handler-side types:
//! - [`Handler`] - capability query trait every handler implements
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler>`)
//! - one capability trait per event category ([`PostHandler`], [`UserHandler`], ...)
//! - optional hooks [`Loader`] (set-up) and [`Tearer`] (tear-down)
//! - [`PostFn`] - closure-backed post handler

mod capability;
mod handler;
mod post_fn;

pub use capability::{
    Capability, CommentHandler, CommentReplyHandler, Loader, MentionHandler, MessageHandler,
    PostHandler, PostReplyHandler, Tearer, UserHandler,
};
pub use handler::{Handler, HandlerRef, offers};
pub use post_fn::PostFn;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::BoxError;
    use crate::items::{Comment, Post};

    struct Watcher;

    #[async_trait]
    impl UserHandler for Watcher {
        async fn user_post(&self, _post: Post) -> Result<(), BoxError> {
            Ok(())
        }
        async fn user_comment(&self, _comment: Comment) -> Result<(), BoxError> {
            Ok(())
        }
    }

    impl Handler for Watcher {
        fn name(&self) -> &str {
            "watcher"
        }

        fn user_handler(self: Arc<Self>) -> Option<Arc<dyn UserHandler>> {
            Some(self)
        }
    }

    #[test]
    fn test_offers_only_advertised_capabilities() {
        let h: HandlerRef = Arc::new(Watcher);
        assert!(offers(&h, Capability::User));
        for cap in [
            Capability::Post,
            Capability::Comment,
            Capability::PostReply,
            Capability::CommentReply,
            Capability::Mention,
            Capability::Message,
        ] {
            assert!(!offers(&h, cap), "{cap} should not be offered");
        }
        assert!(h.clone().loader().is_none());
        assert!(h.tearer().is_none());
    }

    #[tokio::test]
    async fn test_post_fn_delivers_to_closure() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let h: HandlerRef = PostFn::arc("collector", move |post: Post| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().map_err(|e| e.to_string())?.push(post.id);
                Ok::<_, BoxError>(())
            }
        });

        let ph = h.clone().post_handler().expect("post capability");
        ph.post(Post {
            id: "abc".into(),
            ..Post::default()
        })
        .await
        .expect("handler ok");

        assert_eq!(h.name(), "collector");
        assert_eq!(*seen.lock().unwrap(), vec!["abc".to_string()]);
    }
}

//! # Function-backed post handler (`PostFn`)
//!
//! [`PostFn`] wraps a closure `F: Fn(Post) -> Fut`, producing a fresh future
//! per post. Handy for scans that only watch subreddits or custom feeds.
//!
//! ## Concurrency semantics
//! - Each delivered post creates a **new** future that owns its state.
//! - The closure is shared between every forwarding task that takes posts;
//!   shared state goes behind an explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use feedvisor::{BoxError, HandlerRef, Post, PostFn};
//!
//! let h: HandlerRef = PostFn::arc("printer", |post: Post| async move {
//!     println!("{}", post.title);
//!     Ok::<_, BoxError>(())
//! });
//!
//! assert_eq!(h.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::handlers::{Handler, PostHandler};
use crate::items::Post;

/// Function-backed handler offering only the post capability.
#[derive(Debug)]
pub struct PostFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> PostFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`PostFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> PostHandler for PostFn<F>
where
    F: Fn(Post) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn post(&self, post: Post) -> Result<(), BoxError> {
        (self.f)(post).await
    }
}

impl<F, Fut> Handler for PostFn<F>
where
    F: Fn(Post) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn post_handler(self: Arc<Self>) -> Option<Arc<dyn PostHandler>> {
        Some(self)
    }
}

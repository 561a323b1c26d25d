//! # Dispatcher: configuration switches → capability-checked streams.
//!
//! Wiring happens in two phases so that nothing starts unless everything can:
//!
//! ```text
//! plan(handler, cfg)                 (pure, no side effects)
//!   for each enabled switch:
//!     handler.<capability>() ── None ──► Err(MissingCapability)
//!                            ── Some ──► Route
//!
//! start(routes, source, ctx)         (after the set-up hook)
//!   for each route, in category order:
//!     source.<feed>(ctx) ── Err ──► Err(StreamStart)   (caller cancels + tears down)
//!                        ── Ok  ──► Wired stream(s)
//!
//! Wired::spawn(bus)                  (after every start succeeded)
//!   one Forwarder task per stream
//! ```
//!
//! ## Stream names
//! `subreddits:a+b`, `custom_feed:user/feed1+feed2`, `subreddit_comments:a+b`,
//! `user_posts:name`, `user_comments:name`, `post_replies`, `comment_replies`,
//! `mentions`, `messages`.

use std::{future::Future, sync::Arc};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::forwarder::Forwarder,
    error::{BoxError, FeedError},
    events::Bus,
    handlers::{
        Capability, CommentHandler, CommentReplyHandler, HandlerRef, MentionHandler,
        MessageHandler, PostHandler, PostReplyHandler, UserHandler,
    },
    items::{Comment, Message, Post},
    streams::{Bot, ErrorSender, ItemStream, Scanner, StreamContext, UserStreams},
};

/// One capability-checked stream request.
pub(crate) enum Route {
    Subreddits {
        subreddits: Vec<String>,
        handler: Arc<dyn PostHandler>,
    },
    CustomFeed {
        user: String,
        feeds: Vec<String>,
        handler: Arc<dyn PostHandler>,
    },
    SubredditComments {
        subreddits: Vec<String>,
        handler: Arc<dyn CommentHandler>,
    },
    User {
        user: String,
        handler: Arc<dyn UserHandler>,
    },
    PostReplies(Arc<dyn PostReplyHandler>),
    CommentReplies(Arc<dyn CommentReplyHandler>),
    Mentions(Arc<dyn MentionHandler>),
    Messages(Arc<dyn MessageHandler>),
}

impl Route {
    /// Whether this route needs an authenticated source.
    pub(crate) fn is_inbox(&self) -> bool {
        matches!(
            self,
            Route::PostReplies(_) | Route::CommentReplies(_) | Route::Mentions(_) | Route::Messages(_)
        )
    }

    /// Primary stream name, used for start errors.
    fn name(&self) -> String {
        match self {
            Route::Subreddits { subreddits, .. } => format!("subreddits:{}", subreddits.join("+")),
            Route::CustomFeed { user, feeds, .. } => {
                format!("custom_feed:{user}/{}", feeds.join("+"))
            }
            Route::SubredditComments { subreddits, .. } => {
                format!("subreddit_comments:{}", subreddits.join("+"))
            }
            Route::User { user, .. } => format!("user:{user}"),
            Route::PostReplies(_) => "post_replies".to_string(),
            Route::CommentReplies(_) => "comment_replies".to_string(),
            Route::Mentions(_) => "mentions".to_string(),
            Route::Messages(_) => "messages".to_string(),
        }
    }
}

fn require<C: ?Sized>(found: Option<Arc<C>>, capability: Capability) -> Result<Arc<C>, FeedError> {
    found.ok_or(FeedError::MissingCapability { capability })
}

/// Checks every enabled switch against the handler, in category order.
///
/// Returns the first missing capability; no stream is started either way.
pub(crate) fn plan(handler: &HandlerRef, cfg: &Config) -> Result<Vec<Route>, FeedError> {
    let mut routes = Vec::new();

    if !cfg.subreddits.is_empty() || !cfg.custom_feeds.is_empty() {
        let posts = require(handler.clone().post_handler(), Capability::Post)?;
        if !cfg.subreddits.is_empty() {
            routes.push(Route::Subreddits {
                subreddits: cfg.subreddits.clone(),
                handler: posts.clone(),
            });
        }
        for (user, feeds) in &cfg.custom_feeds {
            routes.push(Route::CustomFeed {
                user: user.clone(),
                feeds: feeds.clone(),
                handler: posts.clone(),
            });
        }
    }

    if !cfg.subreddit_comments.is_empty() {
        routes.push(Route::SubredditComments {
            subreddits: cfg.subreddit_comments.clone(),
            handler: require(handler.clone().comment_handler(), Capability::Comment)?,
        });
    }

    if !cfg.users.is_empty() {
        let users = require(handler.clone().user_handler(), Capability::User)?;
        for user in &cfg.users {
            routes.push(Route::User {
                user: user.clone(),
                handler: users.clone(),
            });
        }
    }

    if cfg.post_replies {
        routes.push(Route::PostReplies(require(
            handler.clone().post_reply_handler(),
            Capability::PostReply,
        )?));
    }
    if cfg.comment_replies {
        routes.push(Route::CommentReplies(require(
            handler.clone().comment_reply_handler(),
            Capability::CommentReply,
        )?));
    }
    if cfg.mentions {
        routes.push(Route::Mentions(require(
            handler.clone().mention_handler(),
            Capability::Mention,
        )?));
    }
    if cfg.messages {
        routes.push(Route::Messages(require(
            handler.clone().message_handler(),
            Capability::Message,
        )?));
    }

    Ok(routes)
}

/// Streams that have started but are not yet being forwarded.
#[derive(Default)]
pub(crate) struct Wired {
    pending: Vec<Pending>,
}

type Deliver<T> = Box<dyn Fn(T) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

enum Pending {
    Posts(String, ItemStream<Post>, Deliver<Post>),
    Comments(String, ItemStream<Comment>, Deliver<Comment>),
    Messages(String, ItemStream<Message>, Deliver<Message>),
}

/// A spawned forwarder.
pub(crate) struct Spawned {
    pub stream: Arc<str>,
    pub join: JoinHandle<()>,
}

/// Binds a capability handle to the method that receives one item.
fn deliver<T, H, C, Fut>(handler: Arc<H>, call: C) -> Deliver<T>
where
    T: Send + 'static,
    H: ?Sized + Send + Sync + 'static,
    C: Fn(Arc<H>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Box::new(
        move |item: T| -> BoxFuture<'static, Result<(), BoxError>> {
            Box::pin(call(handler.clone(), item))
        },
    )
}

impl Wired {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    fn posts(&mut self, name: String, items: ItemStream<Post>, to: Deliver<Post>) {
        self.pending.push(Pending::Posts(name, items, to));
    }

    fn comments(&mut self, name: String, items: ItemStream<Comment>, to: Deliver<Comment>) {
        self.pending.push(Pending::Comments(name, items, to));
    }

    fn messages(&mut self, name: String, items: ItemStream<Message>, to: Deliver<Message>) {
        self.pending.push(Pending::Messages(name, items, to));
    }

    /// Spawns one forwarder per started stream.
    pub(crate) fn spawn(
        self,
        errors: &ErrorSender,
        cancel: &CancellationToken,
        bus: &Bus,
    ) -> Vec<Spawned> {
        self.pending
            .into_iter()
            .map(|pending| match pending {
                Pending::Posts(name, items, to) => spawn_one(name, items, to, errors, cancel, bus),
                Pending::Comments(name, items, to) => {
                    spawn_one(name, items, to, errors, cancel, bus)
                }
                Pending::Messages(name, items, to) => {
                    spawn_one(name, items, to, errors, cancel, bus)
                }
            })
            .collect()
    }
}

fn spawn_one<T: Send + 'static>(
    name: String,
    items: ItemStream<T>,
    deliver: Deliver<T>,
    errors: &ErrorSender,
    cancel: &CancellationToken,
    bus: &Bus,
) -> Spawned {
    let stream: Arc<str> = name.into();
    let forwarder = Forwarder {
        stream: stream.clone(),
        items,
        deliver,
        errors: errors.clone(),
        bus: bus.clone(),
    };
    Spawned {
        stream,
        join: tokio::spawn(forwarder.run(cancel.clone())),
    }
}

/// Starts every route in order; stops at the first source error.
///
/// Inbox routes need `bot`; they never reach here without one since the
/// entry points reject inbox switches first.
pub(crate) async fn start<S: Scanner + ?Sized>(
    routes: Vec<Route>,
    scanner: &S,
    bot: Option<&dyn Bot>,
    ctx: &StreamContext,
) -> Result<Wired, FeedError> {
    let mut wired = Wired::default();

    for route in routes {
        let name = route.name();
        let bot = match (route.is_inbox(), bot) {
            (true, None) => return Err(FeedError::LoggedOut),
            (_, bot) => bot,
        };
        let started = start_route(route, name.clone(), scanner, bot, ctx, &mut wired).await;
        started.map_err(|error| FeedError::StreamStart {
            stream: name,
            error,
        })?;
    }
    Ok(wired)
}

async fn start_route<S: Scanner + ?Sized>(
    route: Route,
    name: String,
    scanner: &S,
    bot: Option<&dyn Bot>,
    ctx: &StreamContext,
    wired: &mut Wired,
) -> Result<(), BoxError> {
    match route {
        Route::Subreddits {
            subreddits,
            handler,
        } => {
            let items = scanner.subreddits(&subreddits, ctx.clone()).await?;
            wired.posts(name, items, deliver(handler, |h, p| async move { h.post(p).await }));
        }
        Route::CustomFeed {
            user,
            feeds,
            handler,
        } => {
            let items = scanner.custom_feed(&user, &feeds, ctx.clone()).await?;
            wired.posts(name, items, deliver(handler, |h, p| async move { h.post(p).await }));
        }
        Route::SubredditComments {
            subreddits,
            handler,
        } => {
            let items = scanner.subreddit_comments(&subreddits, ctx.clone()).await?;
            wired.comments(
                name,
                items,
                deliver(handler, |h, c| async move { h.comment(c).await }),
            );
        }
        Route::User { user, handler } => {
            let UserStreams { posts, comments } = scanner.user(&user, ctx.clone()).await?;
            wired.posts(
                format!("user_posts:{user}"),
                posts,
                deliver(handler.clone(), |h, p| async move { h.user_post(p).await }),
            );
            wired.comments(
                format!("user_comments:{user}"),
                comments,
                deliver(handler, |h, c| async move { h.user_comment(c).await }),
            );
        }
        Route::PostReplies(handler) => {
            let items = inbox(bot)?.post_replies(ctx.clone()).await?;
            wired.messages(
                name,
                items,
                deliver(handler, |h, m| async move { h.post_reply(m).await }),
            );
        }
        Route::CommentReplies(handler) => {
            let items = inbox(bot)?.comment_replies(ctx.clone()).await?;
            wired.messages(
                name,
                items,
                deliver(handler, |h, m| async move { h.comment_reply(m).await }),
            );
        }
        Route::Mentions(handler) => {
            let items = inbox(bot)?.mentions(ctx.clone()).await?;
            wired.messages(
                name,
                items,
                deliver(handler, |h, m| async move { h.mention(m).await }),
            );
        }
        Route::Messages(handler) => {
            let items = inbox(bot)?.messages(ctx.clone()).await?;
            wired.messages(
                name,
                items,
                deliver(handler, |h, m| async move { h.message(m).await }),
            );
        }
    }
    Ok(())
}

fn inbox(bot: Option<&dyn Bot>) -> Result<&dyn Bot, BoxError> {
    bot.ok_or_else(|| FeedError::LoggedOut.into())
}

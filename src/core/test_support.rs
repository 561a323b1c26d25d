//! Scripted fakes shared by the core tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::task::Poll;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{BoxError, UpstreamError},
    events::{Event, EventKind},
    handlers::{
        Capability, CommentHandler, CommentReplyHandler, Handler, Loader, MentionHandler,
        MessageHandler, PostHandler, PostReplyHandler, Tearer, UserHandler,
    },
    items::{Comment, Message, Post},
    streams::{Bot, ItemStream, Scanner, StreamContext, UserStreams},
    subscribers::Subscribe,
};

/// Error returned by [`Recorder`] for a scripted item.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("boom on {0}")]
pub(crate) struct Boom(pub String);

/// Stream source yielding fixed items, then staying pending until cancelled.
pub(crate) struct FakeSource {
    posts: usize,
    comments: usize,
    messages: usize,
    ending: bool,
    logged_in: bool,
    fail_start: Option<String>,
    reports: Vec<UpstreamError>,
    start_report: Option<UpstreamError>,
    panicking: bool,
    started: Mutex<Vec<String>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            posts: 0,
            comments: 0,
            messages: 0,
            ending: false,
            logged_in: true,
            fail_start: None,
            reports: Vec::new(),
            start_report: None,
            panicking: false,
            started: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Every post stream yields `p1..=pN`.
    pub(crate) fn with_posts(mut self, n: usize) -> Self {
        self.posts = n;
        self
    }

    /// Every comment stream yields `c1..=cN`.
    pub(crate) fn with_comments(mut self, n: usize) -> Self {
        self.comments = n;
        self
    }

    /// Every inbox stream yields `m1..=mN`.
    pub(crate) fn with_messages(mut self, n: usize) -> Self {
        self.messages = n;
        self
    }

    /// Streams end after their items instead of staying pending.
    pub(crate) fn ending(mut self) -> Self {
        self.ending = true;
        self
    }

    pub(crate) fn logged_out(mut self) -> Self {
        self.logged_in = false;
        self
    }

    /// Refuses to start the stream called `name`.
    pub(crate) fn fail_start(mut self, name: &str) -> Self {
        self.fail_start = Some(name.to_string());
        self
    }

    /// Errors the subreddit stream's producer reports once it starts.
    pub(crate) fn reporting(mut self, errors: Vec<UpstreamError>) -> Self {
        self.reports = errors;
        self
    }

    /// The subreddit stream reports `err` and waits for its ack before returning.
    pub(crate) fn reporting_on_start(mut self, err: UpstreamError) -> Self {
        self.start_report = Some(err);
        self
    }

    /// Streams panic when polled past their items.
    pub(crate) fn panicking(mut self) -> Self {
        self.panicking = true;
        self
    }

    pub(crate) fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Names of started streams, in start order.
    pub(crate) fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// Whether every started stream has seen its cancellation.
    pub(crate) fn all_cancelled(&self) -> bool {
        self.tokens.lock().unwrap().iter().all(|t| t.is_cancelled())
    }

    fn open(&self, name: String, ctx: &StreamContext) -> Result<(), BoxError> {
        if self.fail_start.as_deref() == Some(name.as_str()) {
            return Err(format!("cannot start {name}").into());
        }
        self.started.lock().unwrap().push(name);
        self.tokens.lock().unwrap().push(ctx.cancel.clone());
        Ok(())
    }

    fn script<T: Send + 'static>(&self, items: Vec<T>, ctx: &StreamContext) -> ItemStream<T> {
        let items = stream::iter(items);
        let items = if self.panicking {
            items
                .chain(stream::poll_fn(|_| -> Poll<Option<T>> {
                    panic!("source stream panicked")
                }))
                .boxed()
        } else if self.ending {
            items.boxed()
        } else {
            items.chain(stream::pending()).boxed()
        };
        items.take_until(ctx.cancel.clone().cancelled_owned()).boxed()
    }

    fn posts(&self, ctx: &StreamContext) -> ItemStream<Post> {
        let posts = (1..=self.posts)
            .map(|i| Post {
                id: format!("p{i}"),
                ..Post::default()
            })
            .collect();
        self.script(posts, ctx)
    }

    fn comments(&self, ctx: &StreamContext) -> ItemStream<Comment> {
        let comments = (1..=self.comments)
            .map(|i| Comment {
                id: format!("c{i}"),
                ..Comment::default()
            })
            .collect();
        self.script(comments, ctx)
    }

    fn inbox(&self, name: &str, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError> {
        self.open(name.to_string(), &ctx)?;
        let messages = (1..=self.messages)
            .map(|i| Message {
                id: format!("m{i}"),
                ..Message::default()
            })
            .collect();
        Ok(self.script(messages, &ctx))
    }
}

#[async_trait]
impl Scanner for FakeSource {
    async fn subreddits(
        &self,
        subreddits: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Post>, BoxError> {
        self.open(format!("subreddits:{}", subreddits.join("+")), &ctx)?;
        if let Some(err) = self.start_report.clone() {
            let _ = ctx.errors.report_err(err).await;
        }
        if !self.reports.is_empty() {
            let (errors, reports) = (ctx.errors.clone(), self.reports.clone());
            tokio::spawn(async move {
                for err in reports {
                    if !errors.report_err(err).await {
                        break;
                    }
                }
            });
        }
        Ok(self.posts(&ctx))
    }

    async fn custom_feed(
        &self,
        user: &str,
        feeds: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Post>, BoxError> {
        self.open(format!("custom_feed:{user}/{}", feeds.join("+")), &ctx)?;
        Ok(self.posts(&ctx))
    }

    async fn subreddit_comments(
        &self,
        subreddits: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Comment>, BoxError> {
        self.open(format!("subreddit_comments:{}", subreddits.join("+")), &ctx)?;
        Ok(self.comments(&ctx))
    }

    async fn user(&self, user: &str, ctx: StreamContext) -> Result<UserStreams, BoxError> {
        self.open(format!("user:{user}"), &ctx)?;
        Ok(UserStreams {
            posts: self.posts(&ctx),
            comments: self.comments(&ctx),
        })
    }
}

#[async_trait]
impl Bot for FakeSource {
    fn logged_in(&self) -> bool {
        self.logged_in
    }

    async fn post_replies(&self, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError> {
        self.inbox("post_replies", ctx)
    }

    async fn comment_replies(
        &self,
        ctx: StreamContext,
    ) -> Result<ItemStream<Message>, BoxError> {
        self.inbox("comment_replies", ctx)
    }

    async fn mentions(&self, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError> {
        self.inbox("mentions", ctx)
    }

    async fn messages(&self, ctx: StreamContext) -> Result<ItemStream<Message>, BoxError> {
        self.inbox("messages", ctx)
    }
}

/// Handler recording every delivery as `"<capability>:<id>"`.
pub(crate) struct Recorder {
    caps: Vec<Capability>,
    fail_on: Option<String>,
    panic_on: Option<String>,
    hang_on: Option<String>,
    fail_setup: bool,
    seen: Mutex<Vec<String>>,
    set_ups: AtomicUsize,
    tear_downs: AtomicUsize,
}

impl Recorder {
    pub(crate) fn new(caps: &[Capability]) -> Self {
        Self {
            caps: caps.to_vec(),
            fail_on: None,
            panic_on: None,
            hang_on: None,
            fail_setup: false,
            seen: Mutex::new(Vec::new()),
            set_ups: AtomicUsize::new(0),
            tear_downs: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with(caps: &[Capability]) -> Arc<Self> {
        Arc::new(Self::new(caps))
    }

    pub(crate) fn all() -> Arc<Self> {
        Self::with(&[
            Capability::Post,
            Capability::Comment,
            Capability::User,
            Capability::PostReply,
            Capability::CommentReply,
            Capability::Mention,
            Capability::Message,
        ])
    }

    /// Returns [`Boom`] for the item with this id.
    pub(crate) fn failing_on(mut self, id: &str) -> Self {
        self.fail_on = Some(id.to_string());
        self
    }

    pub(crate) fn panicking_on(mut self, id: &str) -> Self {
        self.panic_on = Some(id.to_string());
        self
    }

    /// Never returns for the item with this id.
    pub(crate) fn hanging_on(mut self, id: &str) -> Self {
        self.hang_on = Some(id.to_string());
        self
    }

    pub(crate) fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    pub(crate) fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn set_ups(&self) -> usize {
        self.set_ups.load(Ordering::SeqCst)
    }

    pub(crate) fn tear_downs(&self) -> usize {
        self.tear_downs.load(Ordering::SeqCst)
    }

    async fn record(&self, kind: &str, id: &str) -> Result<(), BoxError> {
        self.seen.lock().unwrap().push(format!("{kind}:{id}"));
        if self.panic_on.as_deref() == Some(id) {
            panic!("handler panicked on {id}");
        }
        if self.hang_on.as_deref() == Some(id) {
            futures::future::pending::<()>().await;
        }
        match self.fail_on.as_deref() {
            Some(bad) if bad == id => Err(Boom(id.to_string()).into()),
            _ => Ok(()),
        }
    }

    fn offers(&self, capability: Capability) -> bool {
        self.caps.contains(&capability)
    }
}

#[async_trait]
impl PostHandler for Recorder {
    async fn post(&self, post: Post) -> Result<(), BoxError> {
        self.record("post", &post.id).await
    }
}

#[async_trait]
impl CommentHandler for Recorder {
    async fn comment(&self, comment: Comment) -> Result<(), BoxError> {
        self.record("comment", &comment.id).await
    }
}

#[async_trait]
impl UserHandler for Recorder {
    async fn user_post(&self, post: Post) -> Result<(), BoxError> {
        self.record("user_post", &post.id).await
    }

    async fn user_comment(&self, comment: Comment) -> Result<(), BoxError> {
        self.record("user_comment", &comment.id).await
    }
}

#[async_trait]
impl PostReplyHandler for Recorder {
    async fn post_reply(&self, reply: Message) -> Result<(), BoxError> {
        self.record("post_reply", &reply.id).await
    }
}

#[async_trait]
impl CommentReplyHandler for Recorder {
    async fn comment_reply(&self, reply: Message) -> Result<(), BoxError> {
        self.record("comment_reply", &reply.id).await
    }
}

#[async_trait]
impl MentionHandler for Recorder {
    async fn mention(&self, mention: Message) -> Result<(), BoxError> {
        self.record("mention", &mention.id).await
    }
}

#[async_trait]
impl MessageHandler for Recorder {
    async fn message(&self, msg: Message) -> Result<(), BoxError> {
        self.record("message", &msg.id).await
    }
}

#[async_trait]
impl Loader for Recorder {
    async fn set_up(&self) -> Result<(), BoxError> {
        self.set_ups.fetch_add(1, Ordering::SeqCst);
        if self.fail_setup {
            return Err("no credentials file".into());
        }
        Ok(())
    }
}

#[async_trait]
impl Tearer for Recorder {
    async fn tear_down(&self) {
        self.tear_downs.fetch_add(1, Ordering::SeqCst);
    }
}

impl Handler for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn post_handler(self: Arc<Self>) -> Option<Arc<dyn PostHandler>> {
        if self.offers(Capability::Post) {
            Some(self)
        } else {
            None
        }
    }

    fn comment_handler(self: Arc<Self>) -> Option<Arc<dyn CommentHandler>> {
        if self.offers(Capability::Comment) {
            Some(self)
        } else {
            None
        }
    }

    fn user_handler(self: Arc<Self>) -> Option<Arc<dyn UserHandler>> {
        if self.offers(Capability::User) {
            Some(self)
        } else {
            None
        }
    }

    fn post_reply_handler(self: Arc<Self>) -> Option<Arc<dyn PostReplyHandler>> {
        if self.offers(Capability::PostReply) {
            Some(self)
        } else {
            None
        }
    }

    fn comment_reply_handler(self: Arc<Self>) -> Option<Arc<dyn CommentReplyHandler>> {
        if self.offers(Capability::CommentReply) {
            Some(self)
        } else {
            None
        }
    }

    fn mention_handler(self: Arc<Self>) -> Option<Arc<dyn MentionHandler>> {
        if self.offers(Capability::Mention) {
            Some(self)
        } else {
            None
        }
    }

    fn message_handler(self: Arc<Self>) -> Option<Arc<dyn MessageHandler>> {
        if self.offers(Capability::Message) {
            Some(self)
        } else {
            None
        }
    }

    fn loader(self: Arc<Self>) -> Option<Arc<dyn Loader>> {
        Some(self)
    }

    fn tearer(self: Arc<Self>) -> Option<Arc<dyn Tearer>> {
        Some(self)
    }
}

/// Subscriber keeping every event kind it receives.
#[derive(Default)]
pub(crate) struct EventLog {
    kinds: Mutex<Vec<EventKind>>,
}

impl EventLog {
    pub(crate) fn count(&self, kind: EventKind) -> usize {
        self.kinds.lock().unwrap().iter().filter(|k| **k == kind).count()
    }
}

#[async_trait]
impl Subscribe for EventLog {
    async fn on_event(&self, ev: &Event) {
        self.kinds.lock().unwrap().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "event-log"
    }
}

/// Polls `cond` until it holds; fails the test after two seconds.
pub(crate) async fn eventually(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

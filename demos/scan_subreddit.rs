//! # Example: Scan a subreddit
//!
//! A fake scanner emits a post every 200ms and reports one transient
//! `Busy` from upstream; the handler fails on the fifth post, which ends the
//! run. Runtime events are rendered by the built-in `LogWriter`.
//!
//! Run with: `RUST_LOG=feedvisor=debug cargo run --example scan_subreddit`

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use feedvisor::{
    BoxError, Comment, Config, ItemStream, Post, PostFn, Scanner, StreamContext, UpstreamError,
    UserStreams,
};

/// Emits `post-1`, `post-2`, ... until the run is cancelled.
struct Ticker;

#[async_trait]
impl Scanner for Ticker {
    async fn subreddits(
        &self,
        subreddits: &[String],
        ctx: StreamContext,
    ) -> Result<ItemStream<Post>, BoxError> {
        let subreddit = subreddits.join("+");

        let errors = ctx.errors.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            // `false` means the run already ended.
            let _ = errors.report_err(UpstreamError::Busy).await;
        });

        let posts = futures::stream::unfold(1u64, move |n| {
            let subreddit = subreddit.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                let post = Post {
                    id: format!("post-{n}"),
                    subreddit,
                    title: format!("tick #{n}"),
                    ..Post::default()
                };
                Some((post, n + 1))
            }
        });
        Ok(posts.take_until(ctx.cancel.cancelled_owned()).boxed())
    }

    async fn custom_feed(
        &self,
        _user: &str,
        _feeds: &[String],
        _ctx: StreamContext,
    ) -> Result<ItemStream<Post>, BoxError> {
        Err("custom feeds are not scripted".into())
    }

    async fn subreddit_comments(
        &self,
        _subreddits: &[String],
        _ctx: StreamContext,
    ) -> Result<ItemStream<Comment>, BoxError> {
        Err("comments are not scripted".into())
    }

    async fn user(&self, _user: &str, _ctx: StreamContext) -> Result<UserStreams, BoxError> {
        Err("users are not scripted".into())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let cfg = Config {
        subreddits: vec!["rust".into()],
        grace: Duration::from_secs(1),
        ..Config::default()
    };

    let handler = PostFn::arc("printer", |post: Post| async move {
        println!("[printer] r/{} {}", post.subreddit, post.title);
        if post.id == "post-5" {
            return Err::<(), BoxError>("refusing to print a fifth post".into());
        }
        Ok(())
    });

    let run = feedvisor::scan(handler, Arc::new(Ticker), cfg).await?;
    println!("[main] streams: {:?}", run.streams());

    match run.wait().await {
        Ok(()) => println!("[main] stopped"),
        Err(e) => println!("[main] run ended: {e}"),
    }

    // Let the log writer flush the last events.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

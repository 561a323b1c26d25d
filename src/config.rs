//! # Run configuration.
//!
//! Provides [`Config`] the flat set of switches selecting which feeds a run
//! subscribes to, plus a few runtime knobs.
//!
//! Every switch is independent; any combination may be active at once. A
//! switch may only be enabled if the handler offers the matching capability,
//! which the dispatcher checks before anything starts.
//!
//! | Switch               | Capability            | Entry point     |
//! |----------------------|-----------------------|-----------------|
//! | `subreddits`         | `PostHandler`         | `run`, `scan`   |
//! | `custom_feeds`       | `PostHandler`         | `run`, `scan`   |
//! | `subreddit_comments` | `CommentHandler`      | `run`, `scan`   |
//! | `users`              | `UserHandler`         | `run`, `scan`   |
//! | `post_replies`       | `PostReplyHandler`    | `run` only      |
//! | `comment_replies`    | `CommentReplyHandler` | `run` only      |
//! | `mentions`           | `MentionHandler`      | `run` only      |
//! | `messages`           | `MessageHandler`      | `run` only      |
//!
//! ## Sentinel values
//! - `grace = 0s` → `wait()` does not wait for forwarding tasks to drain
//! - `bus_capacity = 0` → clamped to 1

use std::collections::BTreeMap;
use std::time::Duration;

/// Feed selection and runtime settings for one run.
///
/// ## Example
/// ```rust
/// use feedvisor::Config;
///
/// let cfg = Config {
///     subreddits: vec!["rust".into(), "golang".into()],
///     mentions: true,
///     ..Config::default()
/// };
/// assert!(cfg.wants_inbox());
/// assert!(!cfg.is_idle());
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Subreddits whose new posts are delivered to `PostHandler`.
    ///
    /// All listed subreddits share a single stream.
    pub subreddits: Vec<String>,

    /// Custom feeds (user → feed names) whose new posts go to `PostHandler`.
    ///
    /// One stream per user.
    pub custom_feeds: BTreeMap<String, Vec<String>>,

    /// Subreddits whose new comments are delivered to `CommentHandler`.
    pub subreddit_comments: Vec<String>,

    /// Users whose posts and comments go to `UserHandler`.
    ///
    /// Each user yields two streams.
    pub users: Vec<String>,

    /// Replies to the bot's posts. Requires a logged in bot.
    pub post_replies: bool,

    /// Replies to the bot's comments. Requires a logged in bot.
    pub comment_replies: bool,

    /// Username mentions. Requires a logged in bot.
    pub mentions: bool,

    /// Private messages. Requires a logged in bot.
    pub messages: bool,

    /// Capacity of the runtime event bus ring buffer (min 1).
    pub bus_capacity: usize,

    /// How long `wait()` lets forwarding tasks drain after cancellation.
    ///
    /// Never changes the run result; an overrun is only reported as an event.
    pub grace: Duration,
}

impl Config {
    /// Reports whether any inbox switch is on.
    #[inline]
    pub fn wants_inbox(&self) -> bool {
        self.post_replies || self.comment_replies || self.mentions || self.messages
    }

    /// Reports whether no switch is on at all.
    ///
    /// An idle run is legal: it simply waits for `stop()`.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.subreddits.is_empty()
            && self.custom_feeds.is_empty()
            && self.subreddit_comments.is_empty()
            && self.users.is_empty()
            && !self.wants_inbox()
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the drain grace period as an `Option` (`None` = don't wait).
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - every switch off
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            subreddits: Vec::new(),
            custom_feeds: BTreeMap::new(),
            subreddit_comments: Vec::new(),
            users: Vec::new(),
            post_replies: false,
            comment_replies: false,
            mentions: false,
            messages: false,
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}

//! # Items delivered to handlers.
//!
//! Stream sources produce these; forwarding tasks hand them to the matching
//! handler capability by value. Fields mirror what the Reddit listing
//! endpoints return for each kind of thing.

/// A link or self post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Post {
    /// Base36 id, e.g. `"5e3wd3"`.
    pub id: String,
    /// Fullname, e.g. `"t3_5e3wd3"`.
    pub name: String,
    /// Username of the submitter, without the `u/` prefix.
    pub author: String,
    /// Subreddit name, without the `r/` prefix.
    pub subreddit: String,
    pub title: String,
    /// Markdown body; empty for link posts.
    pub self_text: String,
    /// Link target; the post's own permalink for self posts.
    pub url: String,
    /// Path relative to `https://www.reddit.com`.
    pub permalink: String,
    /// Seconds since the unix epoch.
    pub created_utc: u64,
}

/// A comment on a post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    /// Base36 id.
    pub id: String,
    /// Fullname, e.g. `"t1_dbmyu4z"`.
    pub name: String,
    /// Username of the commenter.
    pub author: String,
    pub subreddit: String,
    /// Markdown body.
    pub body: String,
    /// Fullname of the post this comment belongs to.
    pub link_id: String,
    /// Fullname of the post or comment this replies to.
    pub parent_id: String,
    /// Path relative to `https://www.reddit.com`.
    pub permalink: String,
    /// Seconds since the unix epoch.
    pub created_utc: u64,
}

/// An inbox item: private message, reply or username mention.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// Base36 id.
    pub id: String,
    /// Fullname: `t4_` for private messages, `t1_` for comments.
    pub name: String,
    /// Username of the sender.
    pub author: String,
    /// Subject line; `"post reply"`, `"comment reply"` or
    /// `"username mention"` for comment items.
    pub subject: String,
    /// Markdown body.
    pub body: String,
    /// `true` when the inbox item is a comment (reply or mention).
    pub was_comment: bool,
    /// Fullname of the thing this item answers; empty for new conversations.
    pub parent_id: String,
    /// Subreddit of the originating comment; empty for private messages.
    pub subreddit: String,
    /// Seconds since the unix epoch.
    pub created_utc: u64,
}

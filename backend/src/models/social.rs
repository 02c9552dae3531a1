//! Social feed models: posts, comments, votes, whispers.
//!
//! The feed is not conserved money, but it feeds the intel tiers and the
//! reputation economy, so posts keep both organic and fake vote tallies
//! and whispers stay around as purchasable history.

use serde::{Deserialize, Serialize};

/// Flavour of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    General,
    Rumor,
    Accusation,
    Confession,
    MarketAnalysis,
    Recruitment,
}

/// A comment on a post. `bot` marks comments injected by a paid
/// bot-comment purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub author_id: String,
    pub content: String,
    pub bot: bool,
    pub created_secs: u64,
}

/// One feed post with its comments and votes inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    id: String,
    pub author_id: String,
    pub kind: PostKind,
    pub content: String,
    pub upvotes: u32,
    pub downvotes: u32,
    pub fake_upvotes: u32,
    pub fake_downvotes: u32,
    pub trending: bool,
    pub deleted: bool,
    pub flagged: bool,
    pub comments: Vec<Comment>,
    /// (voter, is_upvote) - one organic vote per actor per post
    pub voters: Vec<(String, bool)>,
    pub created_secs: u64,
}

impl Post {
    pub fn new(author_id: String, kind: PostKind, content: String, created_secs: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author_id,
            kind,
            content,
            upvotes: 0,
            downvotes: 0,
            fake_upvotes: 0,
            fake_downvotes: 0,
            trending: false,
            deleted: false,
            flagged: false,
            comments: Vec::new(),
            voters: Vec::new(),
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_voted(&self, actor_id: &str) -> bool {
        self.voters.iter().any(|(id, _)| id == actor_id)
    }

    /// Displayed score including fake votes.
    pub fn score(&self) -> i64 {
        (self.upvotes + self.fake_upvotes) as i64 - (self.downvotes + self.fake_downvotes) as i64
    }
}

/// A private message. The send cost is burned, not transferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whisper {
    id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub cost: i64,
    pub read: bool,
    pub created_secs: u64,
}

impl Whisper {
    pub fn new(
        sender_id: String,
        receiver_id: String,
        content: String,
        cost: i64,
        created_secs: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id,
            receiver_id,
            content,
            cost,
            read: false,
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

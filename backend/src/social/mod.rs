//! Social engine
//!
//! The public feed (posts, comments, organic votes) and private whispers.
//! Not conserved money itself, but it drives the reputation economy and
//! is what the covert market's intel tiers and manipulation purchases
//! read and write.

use std::sync::Arc;

use crate::config::GameConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::social::{Comment, Post, PostKind, Whisper};
use crate::notice::Notice;
use crate::reputation::ReputationEngine;
use crate::store::GameStore;

/// Engine for posts, comments, votes, and whispers.
#[derive(Debug)]
pub struct SocialEngine {
    store: Arc<GameStore>,
    config: GameConfig,
}

impl SocialEngine {
    pub fn new(store: Arc<GameStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    /// Publish a post, subject to the per-hour spam guard.
    pub async fn create_post(
        &self,
        author_id: &str,
        kind: PostKind,
        content: &str,
    ) -> EngineResult<Post> {
        if content.trim().is_empty() {
            return Err(EngineError::validation("post content cannot be empty"));
        }

        let mut world = self.store.write().await;
        let hour = world.game_state.current_hour;
        let now = world.game_state.elapsed_secs;
        let author = world
            .actor_mut(author_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {author_id}")))?;
        if !author.is_active() {
            return Err(EngineError::rule(format!(
                "actor {author_id} has been eliminated"
            )));
        }

        // Hourly counter rolls over when the game hour advances.
        if author.posts_hour != hour {
            author.posts_hour = hour;
            author.posts_this_hour = 0;
        }
        if author.posts_this_hour >= self.config.max_posts_per_hour {
            return Err(EngineError::rule(format!(
                "post limit reached: {} posts this hour",
                author.posts_this_hour
            )));
        }
        author.posts_this_hour += 1;
        author.total_posts += 1;

        let post = Post::new(author_id.to_string(), kind, content.trim().to_string(), now);
        let snapshot = post.clone();
        world.posts.insert(post.id().to_string(), post);
        drop(world);

        self.store.publish(Notice::PostPublished {
            post_id: snapshot.id().to_string(),
            author: author_id.to_string(),
        });
        Ok(snapshot)
    }

    /// Comment on an existing post.
    pub async fn create_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> EngineResult<()> {
        if content.trim().is_empty() {
            return Err(EngineError::validation("comment cannot be empty"));
        }
        let mut world = self.store.write().await;
        if world.active_actor(author_id).is_none() {
            return Err(EngineError::rule(format!(
                "actor {author_id} not found or eliminated"
            )));
        }
        let now = world.game_state.elapsed_secs;
        let post = world
            .posts
            .get_mut(post_id)
            .ok_or_else(|| EngineError::not_found(format!("post {post_id}")))?;
        if post.deleted {
            return Err(EngineError::rule("cannot comment on a deleted post"));
        }
        post.comments.push(Comment {
            author_id: author_id.to_string(),
            content: content.trim().to_string(),
            bot: false,
            created_secs: now,
        });
        Ok(())
    }

    /// Cast an organic vote: one per actor per post, self-votes rejected.
    /// The post author's reputation moves with the vote.
    pub async fn vote(&self, post_id: &str, voter_id: &str, upvote: bool) -> EngineResult<()> {
        let mut world = self.store.write().await;
        if world.active_actor(voter_id).is_none() {
            return Err(EngineError::rule(format!(
                "actor {voter_id} not found or eliminated"
            )));
        }
        let post = world
            .posts
            .get_mut(post_id)
            .ok_or_else(|| EngineError::not_found(format!("post {post_id}")))?;
        if post.author_id == voter_id {
            return Err(EngineError::validation("cannot vote on your own post"));
        }
        if post.has_voted(voter_id) {
            return Err(EngineError::rule("already voted on this post"));
        }

        post.voters.push((voter_id.to_string(), upvote));
        if upvote {
            post.upvotes += 1;
        } else {
            post.downvotes += 1;
        }
        let author_id = post.author_id.clone();

        let (delta, reason) = if upvote {
            (self.config.rep_upvote, "upvote_received")
        } else {
            (self.config.rep_downvote, "downvote_received")
        };
        ReputationEngine::modify_in(&mut world, &author_id, delta, reason)?;
        Ok(())
    }

    /// Send a whisper. The fixed cost is debited from the sender and
    /// burned.
    pub async fn send_whisper(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> EngineResult<Whisper> {
        if sender_id == receiver_id {
            return Err(EngineError::validation("cannot whisper to yourself"));
        }
        if content.trim().is_empty() {
            return Err(EngineError::validation("whisper cannot be empty"));
        }

        let mut world = self.store.write().await;
        if world.active_actor(receiver_id).is_none() {
            return Err(EngineError::rule(format!(
                "actor {receiver_id} not found or eliminated"
            )));
        }
        let cost = self.config.whisper_cost;
        let sender = world
            .actor_mut(sender_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {sender_id}")))?;
        if !sender.is_active() {
            return Err(EngineError::rule(format!(
                "actor {sender_id} has been eliminated"
            )));
        }
        sender
            .debit(cost)
            .map_err(|e| EngineError::rule(e.to_string()))?;
        world.game_state.total_circulation -= cost;

        let now = world.game_state.elapsed_secs;
        let whisper = Whisper::new(
            sender_id.to_string(),
            receiver_id.to_string(),
            content.trim().chars().take(200).collect(),
            cost,
            now,
        );
        let snapshot = whisper.clone();
        world.whispers.push(whisper);
        Ok(snapshot)
    }

    /// Unread whispers for a receiver, marking them read.
    pub async fn drain_unread_whispers(&self, receiver_id: &str) -> Vec<Whisper> {
        let mut world = self.store.write().await;
        let mut drained = Vec::new();
        for whisper in world
            .whispers
            .iter_mut()
            .filter(|w| w.receiver_id == receiver_id && !w.read)
        {
            whisper.read = true;
            drained.push(whisper.clone());
        }
        drained
    }

    /// The latest posts, newest first, skipping deleted ones.
    pub async fn feed(&self, limit: usize) -> Vec<Post> {
        let world = self.store.read().await;
        let mut posts: Vec<Post> = world
            .posts
            .values()
            .filter(|p| !p.deleted)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_secs.cmp(&a.created_secs));
        posts.truncate(limit);
        posts
    }
}

//! Optimistic interaction bookkeeping.
//!
//! Like toggles flip the UI immediately and reconcile when the server
//! answers. Every request carries a generation token; only a response
//! matching the latest generation for that post may touch state, so
//! responses arriving out of order converge on the newest intent.
//!
//! Rollback restores the snapshot taken before the FIRST flip of a flight.
//! Re-toggling while a request is in flight reuses that snapshot: if the
//! final request fails, the post returns to its true pre-interaction state
//! rather than an intermediate optimistic one.
//!
//! Follow toggles are deliberately not optimistic. The server is asked to
//! flip, and on success the whole profile is re-fetched; follower counts
//! have too many writers to guess at locally.

use std::collections::{HashMap, HashSet};

use quill_core::Post;

/// Pre-interaction state restored when the last in-flight toggle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeRollback {
    pub is_liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Clone, Copy)]
struct LikeFlight {
    generation: u64,
    rollback: LikeRollback,
}

#[derive(Debug, Default)]
pub struct Interactions {
    next_generation: u64,
    likes: HashMap<u64, LikeFlight>,
    follows: HashMap<String, u64>,
    comments: HashSet<u64>,
}

impl Interactions {
    fn bump(&mut self) -> u64 {
        self.next_generation = self.next_generation.wrapping_add(1);
        self.next_generation
    }

    /// Starts (or re-toggles) a like flight for `post`, returning the
    /// generation to tag the request with. The rollback snapshot is taken
    /// only on the first flip of the flight.
    pub fn begin_like(&mut self, post: &Post) -> u64 {
        let generation = self.bump();
        self.likes
            .entry(post.id)
            .and_modify(|flight| flight.generation = generation)
            .or_insert(LikeFlight {
                generation,
                rollback: LikeRollback {
                    is_liked: post.is_liked,
                    likes_count: post.likes_count,
                },
            });
        generation
    }

    /// Reconciles a successful like response. Returns true when the
    /// response is current and its authoritative values should overwrite
    /// the optimistic ones; a stale response returns false and must be
    /// dropped entirely.
    pub fn settle_like(&mut self, post_id: u64, generation: u64) -> bool {
        match self.likes.get(&post_id) {
            Some(flight) if flight.generation == generation => {
                self.likes.remove(&post_id);
                true
            }
            _ => false,
        }
    }

    /// Reconciles a failed like request. A current failure ends the flight
    /// and yields the snapshot to restore; a stale failure yields nothing.
    pub fn fail_like(&mut self, post_id: u64, generation: u64) -> Option<LikeRollback> {
        match self.likes.get(&post_id) {
            Some(flight) if flight.generation == generation => {
                let rollback = flight.rollback;
                self.likes.remove(&post_id);
                Some(rollback)
            }
            _ => None,
        }
    }

    pub fn like_in_flight(&self, post_id: u64) -> bool {
        self.likes.contains_key(&post_id)
    }

    pub fn begin_follow(&mut self, username: &str) -> u64 {
        let generation = self.bump();
        self.follows.insert(username.to_string(), generation);
        generation
    }

    /// True when the follow response is current; the caller then re-fetches
    /// the profile for authoritative counts.
    pub fn settle_follow(&mut self, username: &str, generation: u64) -> bool {
        match self.follows.get(username) {
            Some(current) if *current == generation => {
                self.follows.remove(username);
                true
            }
            _ => false,
        }
    }

    pub fn follow_in_flight(&self, username: &str) -> bool {
        self.follows.contains_key(username)
    }

    /// Claims the single comment slot for a post. Returns false when a
    /// submission is already pending, which blocks double submits.
    pub fn begin_comment(&mut self, post_id: u64) -> bool {
        self.comments.insert(post_id)
    }

    pub fn settle_comment(&mut self, post_id: u64) {
        self.comments.remove(&post_id);
    }

    pub fn comment_in_flight(&self, post_id: u64) -> bool {
        self.comments.contains(&post_id)
    }

    /// Drops all pending flights. Responses that arrive afterwards carry
    /// generations that no longer match and fall through harmlessly.
    pub fn clear(&mut self) {
        self.likes.clear();
        self.follows.clear();
        self.comments.clear();
    }
}

//! Wire types for the blogging service API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token pair returned by `/api/token/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// A user profile. The current user's own profile is the session identity.
///
/// `is_following` and the counters describe the relation between the
/// requesting viewer and this profile; they are meaningless on the
/// viewer's own profile and default accordingly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub is_following: bool,
}

impl Profile {
    /// Human-readable name: "First Last" when set, else the handle.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// A comment on a post. Append-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    /// Author handle. Some service versions serialize this as `user`.
    #[serde(alias = "user")]
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A blog post as served by the feed, profile, and my-posts listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    /// Author-controlled visibility toggle.
    #[serde(default = "default_true")]
    pub is_show: bool,
    /// Moderation flag; hidden from listings when false.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Encoded image payload reference, if any.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

fn default_true() -> bool {
    true
}

/// `{status, likes_count}` from the like toggle endpoint. The server, not
/// the optimistic flip, decides the final state.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeResponse {
    pub status: String,
    pub likes_count: i64,
}

impl LikeResponse {
    pub fn is_liked(&self) -> bool {
        self.status == "liked"
    }
}

/// `{status}` from the follow toggle endpoint. Counts are deliberately not
/// trusted from this response; callers re-fetch the profile.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowStatus {
    pub status: String,
}

/// `{profile, posts}` bundle from `/api/profile/{username}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileBundle {
    pub profile: Profile,
    pub posts: Vec<Post>,
}

/// Partial profile update for `PUT /api/profile/update/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

/// Account creation payload for `POST /api/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// New or edited post payload for create/update.
#[derive(Debug, Clone, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_show: Option<bool>,
}

/// A post category for authoring.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_decodes_with_sparse_fields() {
        // Older service versions omit the interaction counters.
        let post: Post = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "Hello",
                "content": "World",
                "author": "alice",
                "created_at": "2024-06-01T12:00:00.123456Z"
            }"#,
        )
        .unwrap();
        assert!(post.is_show);
        assert!(post.is_active);
        assert!(!post.is_liked);
        assert_eq!(post.likes_count, 0);
        assert!(post.comments.is_empty());
    }

    #[test]
    fn comment_accepts_user_alias() {
        let comment: Comment = serde_json::from_str(
            r#"{"id":1,"user":"bob","content":"nice","created_at":"2024-06-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(comment.author, "bob");
    }

    #[test]
    fn display_name_falls_back_to_handle() {
        let profile = Profile {
            username: "carol".into(),
            ..Profile::default()
        };
        assert_eq!(profile.display_name(), "carol");

        let named = Profile {
            username: "carol".into(),
            first_name: "Carol".into(),
            last_name: "Jones".into(),
            ..Profile::default()
        };
        assert_eq!(named.display_name(), "Carol Jones");
    }
}

//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! This keeps the reducer pure: it only mutates state and returns effects,
//! never performs network calls or spawns tasks directly.

use quill_core::{PostDraft, ProfileUpdate, RegisterRequest};

use crate::common::TaskId;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Exchange credentials for a token pair.
    Login { username: String, password: String },

    /// Create an account, then log in with the same credentials.
    Register { request: RegisterRequest },

    /// Revoke the session server-side and clear it locally.
    Logout,

    /// Run the implicit logout after an authenticated call came back 401.
    InvalidateSession,

    /// Fetch the identity behind the stored credential.
    RefreshIdentity,

    /// Persist profile edits.
    SaveProfile { update: ProfileUpdate },

    /// Load the public feed. The epoch tags the response so a remount can
    /// discard results from a previous epoch.
    LoadFeed { task: Option<TaskId>, epoch: u64 },

    /// Load the viewer's own posts.
    LoadMyPosts { task: Option<TaskId> },

    /// Load a profile with its posts.
    LoadProfile {
        task: Option<TaskId>,
        username: String,
    },

    /// Load the category list for the compose form.
    LoadCategories { task: Option<TaskId> },

    /// Toggle a like. The generation ties the response back to the
    /// optimistic flip it settles.
    ToggleLike { post_id: u64, generation: u64 },

    /// Submit a comment. The comment is appended only on acknowledgement.
    AddComment { post_id: u64, content: String },

    /// Toggle follow state; on success the profile is re-fetched.
    ToggleFollow { username: String, generation: u64 },

    /// Create a new post or save edits to an existing one.
    SavePost {
        editing: Option<u64>,
        draft: PostDraft,
    },

    /// Delete one of the viewer's posts.
    DeletePost { post_id: u64 },
}

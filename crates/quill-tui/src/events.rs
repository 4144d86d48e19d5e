//! UI event types.
//!
//! Everything that can change state flows through here: terminal input,
//! ticks, and the results of async work sent back by runtime handlers.

use quill_core::{
    ApiError, Category, Comment, FollowStatus, LikeResponse, Post, Profile, ProfileBundle,
};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

/// A failed request, flattened for the reducer. `unauthorized` marks the
/// failures that must trigger the implicit logout cascade.
#[derive(Debug, Clone)]
pub struct Fault {
    pub message: String,
    pub unauthorized: bool,
}

impl From<ApiError> for Fault {
    fn from(e: ApiError) -> Self {
        Self {
            unauthorized: e.is_auth_failure(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Terminal(crossterm::event::Event),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    Session(SessionUiEvent),
    Data(DataUiEvent),
    Interaction(InteractionUiEvent),
}

/// Results of session lifecycle operations.
#[derive(Debug)]
pub enum SessionUiEvent {
    LoggedIn,
    LoginFailed { error: String },
    Registered { username: String },
    RegisterFailed { error: String },
    IdentityRefreshed { profile: Profile },
    IdentityAnonymous,
    /// The credential was rejected somewhere and the session is gone.
    SessionExpired,
    RefreshFailed { error: String },
    LoggedOut,
    ProfileSaved { profile: Profile },
    ProfileSaveFailed { fault: Fault },
}

/// Results of view data loads and post authoring.
#[derive(Debug)]
pub enum DataUiEvent {
    FeedLoaded {
        epoch: u64,
        posts: Vec<Post>,
    },
    FeedFailed {
        epoch: u64,
        fault: Fault,
    },
    MyPostsLoaded {
        posts: Vec<Post>,
    },
    MyPostsFailed {
        fault: Fault,
    },
    ProfileLoaded {
        username: String,
        bundle: ProfileBundle,
    },
    ProfileFailed {
        username: String,
        fault: Fault,
    },
    PostSaved {
        post: Post,
        created: bool,
    },
    PostSaveFailed {
        fault: Fault,
    },
    PostDeleted {
        post_id: u64,
    },
    PostDeleteFailed {
        fault: Fault,
    },
    CategoriesLoaded {
        categories: Vec<Category>,
    },
}

/// Results of optimistic interactions, tagged with the generation of the
/// request that produced them.
#[derive(Debug)]
pub enum InteractionUiEvent {
    LikeSettled {
        post_id: u64,
        generation: u64,
        result: Result<LikeResponse, Fault>,
    },
    CommentSettled {
        post_id: u64,
        result: Result<Comment, Fault>,
    },
    FollowSettled {
        username: String,
        generation: u64,
        result: Result<FollowStatus, Fault>,
    },
}

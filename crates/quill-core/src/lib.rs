//! Core client library for the quill blogging service.
//!
//! Protocol and session layer only; no terminal or rendering code lives
//! here. The TUI crate drives these types from its effect handlers.

pub mod api;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod session;

pub use api::types::{
    Category, Comment, FollowStatus, LikeResponse, Post, PostDraft, Profile, ProfileBundle,
    ProfileUpdate, RegisterRequest, TokenPair,
};
pub use api::{ApiClient, ApiError, ApiErrorKind, ApiResult};
pub use credentials::{Credential, CredentialStore};
pub use session::{RefreshOutcome, SessionManager, SessionPhase, SessionSnapshot};

//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── session: SessionView   (phase + identity mirror)
//! │   ├── router: Router         (active view, feed epoch)
//! │   ├── feed / my_posts / profile / detail  (per-view data)
//! │   ├── interactions: Interactions (optimistic flight bookkeeping)
//! │   ├── task_seq / tasks       (async load lifecycle)
//! │   └── notices: Notices
//! └── modal: Option<Modal>       (login, register, profile, compose)
//! ```
//!
//! State is split between `TuiState` and `Option<Modal>` so modal handlers
//! can hold `&mut Modal` and `&mut TuiState` without borrow conflicts.
//!
//! A post can be on screen in several places at once (feed row, detail,
//! profile listing). [`TuiState::mutate_post`] applies a change to every
//! copy so the optimistic flip and its reconciliation stay consistent
//! across views.

use quill_core::{Category, Post, Profile, ProfileBundle, SessionPhase};

use crate::common::{TaskSeq, Tasks};
use crate::interactions::Interactions;
use crate::modal::Modal;
use crate::notices::Notices;
use crate::router::Router;

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub modal: Option<Modal>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tui: TuiState::new(),
            modal: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirror of the session manager's state, updated only through events.
#[derive(Debug)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub identity: Option<Profile>,
}

impl SessionView {
    pub fn logged_in(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|p| p.username.as_str())
    }
}

/// The public feed listing.
#[derive(Debug, Default)]
pub struct FeedState {
    pub posts: Vec<Post>,
    pub selected: usize,
    pub loading: bool,
    /// Epoch of the data currently held; responses tagged with an older
    /// epoch are dropped.
    pub loaded_epoch: Option<u64>,
}

/// The viewer's own posts, including hidden ones.
#[derive(Debug, Default)]
pub struct MyPostsState {
    pub posts: Vec<Post>,
    pub selected: usize,
    pub loading: bool,
}

/// A viewed profile with its visible posts.
#[derive(Debug, Default)]
pub struct ProfilePane {
    pub username: Option<String>,
    pub bundle: Option<ProfileBundle>,
    pub selected: usize,
    pub loading: bool,
}

/// The open post with comments. The detail is populated from the listing
/// copy (listings embed comments), so opening it needs no fetch.
#[derive(Debug, Default)]
pub struct DetailState {
    pub post: Option<Post>,
    pub comment_input: String,
    /// When true, printable keys go to the comment box.
    pub comment_focus: bool,
}

pub struct TuiState {
    pub should_quit: bool,
    pub session: SessionView,
    pub router: Router,
    pub feed: FeedState,
    pub my_posts: MyPostsState,
    pub profile: ProfilePane,
    pub detail: DetailState,
    pub categories: Vec<Category>,
    pub interactions: Interactions,
    pub notices: Notices,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            session: SessionView {
                phase: SessionPhase::Anonymous,
                identity: None,
            },
            router: Router::default(),
            feed: FeedState::default(),
            my_posts: MyPostsState::default(),
            profile: ProfilePane::default(),
            detail: DetailState::default(),
            categories: Vec::new(),
            interactions: Interactions::default(),
            notices: Notices::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
        }
    }

    /// Applies `f` to every on-screen copy of the post.
    pub fn mutate_post(&mut self, post_id: u64, f: impl Fn(&mut Post)) {
        for post in self.feed.posts.iter_mut().filter(|p| p.id == post_id) {
            f(post);
        }
        for post in self.my_posts.posts.iter_mut().filter(|p| p.id == post_id) {
            f(post);
        }
        if let Some(bundle) = &mut self.profile.bundle {
            for post in bundle.posts.iter_mut().filter(|p| p.id == post_id) {
                f(post);
            }
        }
        if let Some(post) = &mut self.detail.post
            && post.id == post_id
        {
            f(post);
        }
    }

    /// Finds a copy of the post to snapshot before an optimistic flip.
    /// The detail copy is preferred since it is the richest.
    pub fn find_post(&self, post_id: u64) -> Option<&Post> {
        if let Some(post) = &self.detail.post
            && post.id == post_id
        {
            return Some(post);
        }
        self.feed
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .or_else(|| self.my_posts.posts.iter().find(|p| p.id == post_id))
            .or_else(|| {
                self.profile
                    .bundle
                    .as_ref()
                    .and_then(|b| b.posts.iter().find(|p| p.id == post_id))
            })
    }

    /// Clears everything tied to the authenticated user. Runs on both
    /// explicit logout and the implicit cascade, after which the router
    /// has already been reset to the feed (rendered as the landing page
    /// while anonymous).
    pub fn drop_session_data(&mut self) {
        self.session.phase = SessionPhase::Anonymous;
        self.session.identity = None;
        self.feed = FeedState::default();
        self.my_posts = MyPostsState::default();
        self.profile = ProfilePane::default();
        self.detail = DetailState::default();
        self.interactions.clear();
        self.tasks = Tasks::default();
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is the single source of truth for how events modify state.

use crossterm::event::{Event, KeyCode, KeyEvent};
use quill_core::SessionPhase;

use crate::effects::UiEffect;
use crate::events::{DataUiEvent, Fault, InteractionUiEvent, SessionUiEvent, UiEvent};
use crate::modal::{
    ComposeForm, LoginForm, Modal, ModalAction, ModalSubmit, ProfileForm, RegisterForm,
};
use crate::router::{NavOutcome, View};
use crate::state::{AppState, TuiState};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            app.tui.notices.expire();
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else if carries_unauthorized(&completed.result) {
                // Superseded load; its payload must not touch state, but
                // a 401 inside it still invalidates the session.
                vec![UiEffect::InvalidateSession]
            } else {
                // Superseded load; its payload must not touch state.
                vec![]
            }
        }
        UiEvent::Session(session_event) => handle_session_event(app, session_event),
        UiEvent::Data(data_event) => handle_data_event(app, data_event),
        UiEvent::Interaction(interaction_event) => {
            handle_interaction_event(app, interaction_event)
        }
    }
}

// ============================================================================
// Session Events
// ============================================================================

fn handle_session_event(app: &mut AppState, event: SessionUiEvent) -> Vec<UiEffect> {
    match event {
        SessionUiEvent::LoggedIn => {
            app.modal = None;
            app.tui.session.phase = SessionPhase::Authenticated;
            app.tui.notices.info("Signed in.");
            // The feed is personalized once logged in (like state), so it
            // is re-fetched alongside the identity.
            vec![UiEffect::RefreshIdentity, start_feed_load(&mut app.tui)]
        }
        SessionUiEvent::LoginFailed { error } => {
            if let Some(modal) = &mut app.modal {
                modal.set_submitting(false);
                modal.set_error(error);
            } else {
                app.tui.notices.error(error);
            }
            vec![]
        }
        SessionUiEvent::Registered { username } => {
            // Account exists but the follow-up login did not complete;
            // hand the user a prefilled sign-in form.
            app.modal = Some(Modal::Login(LoginForm {
                username,
                ..LoginForm::default()
            }));
            app.tui.notices.info("Account created. Sign in to continue.");
            vec![]
        }
        SessionUiEvent::RegisterFailed { error } => {
            if let Some(modal) = &mut app.modal {
                modal.set_submitting(false);
                modal.set_error(error);
            }
            vec![]
        }
        SessionUiEvent::IdentityRefreshed { profile } => {
            app.tui.session.phase = SessionPhase::Authenticated;
            app.tui.session.identity = Some(profile);
            // Startup with a persisted credential lands here before any
            // view data exists; fetch the feed once.
            if app.tui.feed.loaded_epoch != Some(app.tui.router.feed_epoch)
                && !app.tui.feed.loading
            {
                vec![start_feed_load(&mut app.tui)]
            } else {
                vec![]
            }
        }
        SessionUiEvent::IdentityAnonymous => vec![],
        // Deliberately silent beyond the reset: the user simply finds
        // themselves back on the landing view.
        SessionUiEvent::SessionExpired => reset_to_anonymous(app),
        SessionUiEvent::RefreshFailed { error } => {
            app.tui.notices.error(error);
            vec![]
        }
        SessionUiEvent::LoggedOut => {
            let effects = reset_to_anonymous(app);
            app.tui.notices.info("Signed out.");
            effects
        }
        SessionUiEvent::ProfileSaved { profile } => {
            app.modal = None;
            if app.tui.profile.username.as_deref() == Some(profile.username.as_str())
                && let Some(bundle) = &mut app.tui.profile.bundle
            {
                bundle.profile = profile.clone();
            }
            app.tui.session.identity = Some(profile);
            app.tui.notices.info("Profile updated.");
            vec![]
        }
        SessionUiEvent::ProfileSaveFailed { fault } => {
            let mut effects = Vec::new();
            if escalate_unauthorized(&fault, &mut effects) {
                return effects;
            }
            if let Some(modal) = &mut app.modal {
                modal.set_submitting(false);
                modal.set_error(fault.message);
            }
            effects
        }
    }
}

/// The single local side of logout, shared by the explicit and implicit
/// paths: back to the landing view with nothing personalized left behind.
fn reset_to_anonymous(app: &mut AppState) -> Vec<UiEffect> {
    app.modal = None;
    app.tui.router.reset_for_logout();
    app.tui.drop_session_data();
    app.tui.notices.clear();
    vec![]
}

/// Routes an unauthorized fault into the implicit logout. Returns true when
/// the fault was escalated and must not be reported locally.
fn escalate_unauthorized(fault: &Fault, effects: &mut Vec<UiEffect>) -> bool {
    if fault.unauthorized {
        effects.push(UiEffect::InvalidateSession);
        true
    } else {
        false
    }
}

/// True when the event carries an auth-failure fault. Stale-response
/// filters may drop the payload, never the 401.
fn carries_unauthorized(event: &UiEvent) -> bool {
    match event {
        UiEvent::Data(
            DataUiEvent::FeedFailed { fault, .. }
            | DataUiEvent::MyPostsFailed { fault }
            | DataUiEvent::ProfileFailed { fault, .. }
            | DataUiEvent::PostSaveFailed { fault }
            | DataUiEvent::PostDeleteFailed { fault },
        ) => fault.unauthorized,
        UiEvent::Interaction(
            InteractionUiEvent::LikeSettled {
                result: Err(fault), ..
            }
            | InteractionUiEvent::CommentSettled {
                result: Err(fault), ..
            }
            | InteractionUiEvent::FollowSettled {
                result: Err(fault), ..
            },
        ) => fault.unauthorized,
        _ => false,
    }
}

// ============================================================================
// Data Events
// ============================================================================

fn handle_data_event(app: &mut AppState, event: DataUiEvent) -> Vec<UiEffect> {
    match event {
        DataUiEvent::FeedLoaded { epoch, posts } => {
            if epoch == app.tui.router.feed_epoch {
                app.tui.feed.posts = posts;
                app.tui.feed.loading = false;
                app.tui.feed.loaded_epoch = Some(epoch);
                let len = app.tui.feed.posts.len();
                app.tui.feed.selected = app.tui.feed.selected.min(len.saturating_sub(1));
            }
            vec![]
        }
        DataUiEvent::FeedFailed { epoch, fault } => {
            let mut effects = Vec::new();
            // A 401 escalates even when the epoch is superseded.
            let escalated = escalate_unauthorized(&fault, &mut effects);
            if epoch == app.tui.router.feed_epoch {
                app.tui.feed.loading = false;
                if !escalated {
                    app.tui.notices.error(fault.message);
                }
            }
            effects
        }
        DataUiEvent::MyPostsLoaded { posts } => {
            app.tui.my_posts.posts = posts;
            app.tui.my_posts.loading = false;
            let len = app.tui.my_posts.posts.len();
            app.tui.my_posts.selected = app.tui.my_posts.selected.min(len.saturating_sub(1));
            vec![]
        }
        DataUiEvent::MyPostsFailed { fault } => {
            app.tui.my_posts.loading = false;
            let mut effects = Vec::new();
            if !escalate_unauthorized(&fault, &mut effects) {
                app.tui.notices.error(fault.message);
            }
            effects
        }
        DataUiEvent::ProfileLoaded { username, bundle } => {
            if app.tui.profile.username.as_deref() == Some(username.as_str()) {
                let len = bundle.posts.len();
                app.tui.profile.bundle = Some(bundle);
                app.tui.profile.loading = false;
                app.tui.profile.selected = app.tui.profile.selected.min(len.saturating_sub(1));
            }
            vec![]
        }
        DataUiEvent::ProfileFailed { username, fault } => {
            let mut effects = Vec::new();
            let escalated = escalate_unauthorized(&fault, &mut effects);
            if app.tui.profile.username.as_deref() == Some(username.as_str()) {
                app.tui.profile.loading = false;
                if !escalated {
                    app.tui.notices.error(fault.message);
                }
            }
            effects
        }
        DataUiEvent::PostSaved { post, created } => {
            app.modal = None;
            let mut effects = Vec::new();
            if created {
                app.tui.notices.info("Post published.");
                // A new post lands at the top of the feed; remount it.
                app.tui.router.go_feed();
                app.tui.feed.selected = 0;
                effects.push(start_feed_load(&mut app.tui));
            } else {
                app.tui.notices.info("Post updated.");
                app.tui.mutate_post(post.id, |p| {
                    p.title = post.title.clone();
                    p.content = post.content.clone();
                    p.category = post.category.clone();
                    p.is_show = post.is_show;
                });
            }
            if app.tui.router.view == View::MyPosts || !app.tui.my_posts.posts.is_empty() {
                effects.push(start_my_posts_load(&mut app.tui));
            }
            effects
        }
        DataUiEvent::PostSaveFailed { fault } => {
            let mut effects = Vec::new();
            if escalate_unauthorized(&fault, &mut effects) {
                return effects;
            }
            if let Some(modal) = &mut app.modal {
                modal.set_submitting(false);
                modal.set_error(fault.message);
            } else {
                app.tui.notices.error(fault.message);
            }
            effects
        }
        DataUiEvent::PostDeleted { post_id } => {
            app.tui.feed.posts.retain(|p| p.id != post_id);
            app.tui.my_posts.posts.retain(|p| p.id != post_id);
            if let Some(bundle) = &mut app.tui.profile.bundle {
                bundle.posts.retain(|p| p.id != post_id);
            }
            if matches!(
                &app.tui.router.view,
                View::PostDetail { post_id: current, .. } if *current == post_id
            ) {
                app.tui.router.back();
                app.tui.detail = Default::default();
            }
            app.tui.notices.info("Post deleted.");
            vec![]
        }
        DataUiEvent::PostDeleteFailed { fault } => {
            let mut effects = Vec::new();
            if !escalate_unauthorized(&fault, &mut effects) {
                app.tui.notices.error(fault.message);
            }
            effects
        }
        DataUiEvent::CategoriesLoaded { categories } => {
            app.tui.categories = categories;
            vec![]
        }
    }
}

// ============================================================================
// Interaction Events
// ============================================================================

fn handle_interaction_event(app: &mut AppState, event: InteractionUiEvent) -> Vec<UiEffect> {
    match event {
        InteractionUiEvent::LikeSettled {
            post_id,
            generation,
            result,
        } => match result {
            Ok(response) => {
                // Only the latest generation may write; the server response
                // then overwrites the optimistic values wholesale.
                if app.tui.interactions.settle_like(post_id, generation) {
                    let is_liked = response.is_liked();
                    let likes_count = response.likes_count;
                    app.tui.mutate_post(post_id, |p| {
                        p.is_liked = is_liked;
                        p.likes_count = likes_count;
                    });
                }
                vec![]
            }
            Err(fault) => {
                let mut effects = Vec::new();
                // The 401 escalates regardless of generation; only the
                // rollback and the notice are generation-gated.
                let escalated = escalate_unauthorized(&fault, &mut effects);
                if let Some(rollback) = app.tui.interactions.fail_like(post_id, generation) {
                    app.tui.mutate_post(post_id, |p| {
                        p.is_liked = rollback.is_liked;
                        p.likes_count = rollback.likes_count;
                    });
                    if !escalated {
                        app.tui.notices.error(fault.message);
                    }
                }
                effects
            }
        },
        InteractionUiEvent::CommentSettled { post_id, result } => {
            app.tui.interactions.settle_comment(post_id);
            match result {
                Ok(comment) => {
                    // Append only after the ack, to every copy of the post.
                    app.tui
                        .mutate_post(post_id, |p| p.comments.push(comment.clone()));
                    if app.tui.detail.post.as_ref().is_some_and(|p| p.id == post_id) {
                        app.tui.detail.comment_input.clear();
                    }
                    vec![]
                }
                Err(fault) => {
                    // The draft stays in the input for a retry.
                    let mut effects = Vec::new();
                    if !escalate_unauthorized(&fault, &mut effects) {
                        app.tui.notices.error(fault.message);
                    }
                    effects
                }
            }
        }
        InteractionUiEvent::FollowSettled {
            username,
            generation,
            result,
        } => match result {
            Ok(status) => {
                let mut effects = Vec::new();
                if app.tui.interactions.settle_follow(&username, generation)
                    && app.tui.profile.username.as_deref() == Some(username.as_str())
                {
                    // No local guess: re-fetch the profile for the
                    // authoritative relationship and counts.
                    app.tui.notices.info(match status.status.as_str() {
                        "followed" => format!("Following {username}."),
                        _ => format!("Unfollowed {username}."),
                    });
                    effects.push(start_profile_load(&mut app.tui, username));
                }
                effects
            }
            Err(fault) => {
                app.tui.interactions.settle_follow(&username, generation);
                let mut effects = Vec::new();
                if !escalate_unauthorized(&fault, &mut effects) {
                    app.tui.notices.error(fault.message);
                }
                effects
            }
        },
    }
}

// ============================================================================
// Load Starters
// ============================================================================

fn start_feed_load(tui: &mut TuiState) -> UiEffect {
    tui.feed.loading = true;
    UiEffect::LoadFeed {
        task: Some(tui.task_seq.next_id()),
        epoch: tui.router.feed_epoch,
    }
}

fn start_my_posts_load(tui: &mut TuiState) -> UiEffect {
    tui.my_posts.loading = true;
    UiEffect::LoadMyPosts {
        task: Some(tui.task_seq.next_id()),
    }
}

fn start_profile_load(tui: &mut TuiState, username: String) -> UiEffect {
    tui.profile.username = Some(username.clone());
    tui.profile.loading = true;
    UiEffect::LoadProfile {
        task: Some(tui.task_seq.next_id()),
        username,
    }
}

// ============================================================================
// Terminal Event Handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != crossterm::event::KeyEventKind::Release => {
            handle_key(app, key)
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // An open modal captures all input.
    if let Some(modal) = &mut app.modal {
        let action = modal.handle_key(key);
        return apply_modal_action(app, action);
    }

    // The comment box captures printable input while focused.
    if app.tui.detail.comment_focus {
        return handle_comment_key(&mut app.tui, key);
    }

    match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Esc => {
            if app.tui.router.back() == NavOutcome::Changed {
                app.tui.detail = Default::default();
            }
            vec![]
        }
        KeyCode::Char('f') => go_feed(&mut app.tui),
        KeyCode::Char('m') => go_my_posts(app),
        KeyCode::Char('p') => {
            let Some(username) = app.tui.session.username().map(str::to_string) else {
                return open_login(app);
            };
            go_profile(app, username)
        }
        KeyCode::Char('a') => {
            let Some(author) = selected_post(&app.tui).map(|p| p.author.clone()) else {
                return vec![];
            };
            go_profile(app, author)
        }
        KeyCode::Char('i') => {
            if app.tui.session.logged_in() {
                vec![]
            } else {
                open_login(app)
            }
        }
        KeyCode::Char('o') => {
            if app.tui.session.logged_in() {
                app.tui.session.phase = SessionPhase::Invalidating;
                vec![UiEffect::Logout]
            } else {
                vec![]
            }
        }
        KeyCode::Char('n') => {
            if !app.tui.session.logged_in() {
                return open_login(app);
            }
            app.modal = Some(Modal::Compose(ComposeForm::new_post()));
            if app.tui.categories.is_empty() {
                vec![UiEffect::LoadCategories {
                    task: Some(app.tui.task_seq.next_id()),
                }]
            } else {
                vec![]
            }
        }
        KeyCode::Char('e') => edit_selected_post(app),
        KeyCode::Char('d') => delete_selected_post(app),
        KeyCode::Char('u') => {
            let Some(identity) = app.tui.session.identity.as_ref() else {
                return open_login(app);
            };
            app.modal = Some(Modal::EditProfile(ProfileForm::prefill(identity)));
            vec![]
        }
        KeyCode::Char('c') => {
            if matches!(app.tui.router.view, View::PostDetail { .. }) {
                if app.tui.session.logged_in() {
                    app.tui.detail.comment_focus = true;
                    vec![]
                } else {
                    open_login(app)
                }
            } else {
                vec![]
            }
        }
        KeyCode::Char('w') => toggle_follow(app),
        KeyCode::Char(' ') => toggle_like(app),
        KeyCode::Char('j') | KeyCode::Down => {
            move_selection(&mut app.tui, 1);
            vec![]
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_selection(&mut app.tui, -1);
            vec![]
        }
        KeyCode::Enter => open_selected_post(app),
        _ => vec![],
    }
}

fn handle_comment_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Esc => {
            tui.detail.comment_focus = false;
            vec![]
        }
        KeyCode::Enter => submit_comment(tui),
        KeyCode::Char(c) => {
            tui.detail.comment_input.push(c);
            vec![]
        }
        KeyCode::Backspace => {
            tui.detail.comment_input.pop();
            vec![]
        }
        _ => vec![],
    }
}

fn submit_comment(tui: &mut TuiState) -> Vec<UiEffect> {
    let Some(post_id) = tui.detail.post.as_ref().map(|p| p.id) else {
        return vec![];
    };
    let content = tui.detail.comment_input.trim().to_string();
    // Whitespace-only comments never leave the client.
    if content.is_empty() {
        tui.notices.error("Comment cannot be empty.");
        return vec![];
    }
    if !tui.interactions.begin_comment(post_id) {
        return vec![];
    }
    vec![UiEffect::AddComment { post_id, content }]
}

fn apply_modal_action(app: &mut AppState, action: ModalAction) -> Vec<UiEffect> {
    match action {
        ModalAction::Stay => vec![],
        ModalAction::Close => {
            app.modal = None;
            vec![]
        }
        ModalAction::SwitchToRegister => {
            app.modal = Some(Modal::Register(RegisterForm::default()));
            vec![]
        }
        ModalAction::SwitchToLogin => {
            app.modal = Some(Modal::Login(LoginForm::default()));
            vec![]
        }
        ModalAction::Submit(submit) => {
            if let Some(modal) = &mut app.modal {
                modal.set_submitting(true);
            }
            match submit {
                ModalSubmit::Login { username, password } => {
                    vec![UiEffect::Login { username, password }]
                }
                ModalSubmit::Register { request } => vec![UiEffect::Register { request }],
                ModalSubmit::Profile { update } => vec![UiEffect::SaveProfile { update }],
                ModalSubmit::Compose { editing, draft } => {
                    vec![UiEffect::SavePost { editing, draft }]
                }
            }
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

fn open_login(app: &mut AppState) -> Vec<UiEffect> {
    app.modal = Some(Modal::Login(LoginForm::default()));
    vec![]
}

fn go_feed(tui: &mut TuiState) -> Vec<UiEffect> {
    match tui.router.go_feed() {
        NavOutcome::Remounted => {
            if !tui.session.logged_in() {
                // Anonymous feed renders as the landing page; nothing to
                // fetch.
                return vec![];
            }
            // Remount: scroll resets and the list is fetched fresh.
            tui.feed.selected = 0;
            vec![start_feed_load(tui)]
        }
        NavOutcome::Changed => {
            tui.detail = Default::default();
            if !tui.session.logged_in() || tui.feed.loaded_epoch == Some(tui.router.feed_epoch) {
                // Plain navigation keeps the cached list and scroll.
                vec![]
            } else {
                vec![start_feed_load(tui)]
            }
        }
        _ => vec![],
    }
}

fn go_my_posts(app: &mut AppState) -> Vec<UiEffect> {
    match app.tui.router.go_my_posts(app.tui.session.logged_in()) {
        NavOutcome::RequiresAuth => open_login(app),
        NavOutcome::Changed => {
            app.tui.detail = Default::default();
            vec![start_my_posts_load(&mut app.tui)]
        }
        _ => vec![],
    }
}

fn go_profile(app: &mut AppState, username: String) -> Vec<UiEffect> {
    match app
        .tui
        .router
        .go_profile(&username, app.tui.session.logged_in())
    {
        NavOutcome::RequiresAuth => open_login(app),
        NavOutcome::Changed => {
            app.tui.detail = Default::default();
            app.tui.profile.selected = 0;
            vec![start_profile_load(&mut app.tui, username)]
        }
        _ => vec![],
    }
}

fn selected_post(tui: &TuiState) -> Option<&quill_core::Post> {
    match &tui.router.view {
        View::Feed => tui.feed.posts.get(tui.feed.selected),
        View::MyPosts => tui.my_posts.posts.get(tui.my_posts.selected),
        View::Profile(_) => tui
            .profile
            .bundle
            .as_ref()
            .and_then(|b| b.posts.get(tui.profile.selected)),
        View::PostDetail { .. } => tui.detail.post.as_ref(),
    }
}

fn move_selection(tui: &mut TuiState, delta: isize) {
    let (selected, len) = match &tui.router.view {
        View::Feed => (&mut tui.feed.selected, tui.feed.posts.len()),
        View::MyPosts => (&mut tui.my_posts.selected, tui.my_posts.posts.len()),
        View::Profile(_) => (
            &mut tui.profile.selected,
            tui.profile.bundle.as_ref().map_or(0, |b| b.posts.len()),
        ),
        View::PostDetail { .. } => return,
    };
    if len == 0 {
        return;
    }
    let next = selected.saturating_add_signed(delta).min(len - 1);
    *selected = next;
}

fn open_selected_post(app: &mut AppState) -> Vec<UiEffect> {
    let Some(post) = selected_post(&app.tui).cloned() else {
        return vec![];
    };
    let tui = &mut app.tui;
    match tui.router.open_post(post.id, tui.session.logged_in()) {
        NavOutcome::Changed => {}
        NavOutcome::RequiresAuth => return open_login(app),
        _ => return vec![],
    }
    let tui = &mut app.tui;
    // Listings embed comments, so the listing copy is the full record.
    tui.detail.post = Some(post);
    tui.detail.comment_input.clear();
    tui.detail.comment_focus = false;
    vec![]
}

// ============================================================================
// Interactions
// ============================================================================

fn toggle_like(app: &mut AppState) -> Vec<UiEffect> {
    if !app.tui.session.logged_in() {
        return open_login(app);
    }
    let Some(snapshot) = selected_post(&app.tui).cloned() else {
        return vec![];
    };
    let generation = app.tui.interactions.begin_like(&snapshot);
    // Optimistic flip, applied to every visible copy.
    let flipped = !snapshot.is_liked;
    app.tui.mutate_post(snapshot.id, |p| {
        p.likes_count += if flipped { 1 } else { -1 };
        p.is_liked = flipped;
    });
    vec![UiEffect::ToggleLike {
        post_id: snapshot.id,
        generation,
    }]
}

fn toggle_follow(app: &mut AppState) -> Vec<UiEffect> {
    if !matches!(app.tui.router.view, View::Profile(_)) {
        return vec![];
    }
    if !app.tui.session.logged_in() {
        return open_login(app);
    }
    let Some(username) = app.tui.profile.username.clone() else {
        return vec![];
    };
    if app.tui.session.username() == Some(username.as_str()) {
        return vec![];
    }
    if app.tui.interactions.follow_in_flight(&username) {
        return vec![];
    }
    let generation = app.tui.interactions.begin_follow(&username);
    vec![UiEffect::ToggleFollow {
        username,
        generation,
    }]
}

// ============================================================================
// Post Authoring
// ============================================================================

fn edit_selected_post(app: &mut AppState) -> Vec<UiEffect> {
    if app.tui.router.view != View::MyPosts {
        return vec![];
    }
    let Some(post) = app.tui.my_posts.posts.get(app.tui.my_posts.selected) else {
        return vec![];
    };
    app.modal = Some(Modal::Compose(ComposeForm::edit(post)));
    if app.tui.categories.is_empty() {
        vec![UiEffect::LoadCategories {
            task: Some(app.tui.task_seq.next_id()),
        }]
    } else {
        vec![]
    }
}

fn delete_selected_post(app: &mut AppState) -> Vec<UiEffect> {
    if app.tui.router.view != View::MyPosts {
        return vec![];
    }
    let Some(post) = app.tui.my_posts.posts.get(app.tui.my_posts.selected) else {
        return vec![];
    };
    vec![UiEffect::DeletePost { post_id: post.id }]
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crossterm::event::KeyModifiers;
    use quill_core::{LikeResponse, Post, Profile};

    use super::*;
    use crate::events::Fault;

    fn post(id: u64, is_liked: bool, likes_count: i64) -> Post {
        Post {
            id,
            title: format!("post {id}"),
            content: "body".into(),
            author: "bob".into(),
            created_at: Utc::now(),
            is_show: true,
            is_active: true,
            image: None,
            category: None,
            is_liked,
            likes_count,
            comments: Vec::new(),
        }
    }

    fn logged_in_app() -> AppState {
        let mut app = AppState::new();
        app.tui.session.phase = SessionPhase::Authenticated;
        app.tui.session.identity = Some(Profile {
            username: "alice".into(),
            ..Profile::default()
        });
        app
    }

    fn press(app: &mut AppState, code: KeyCode) -> Vec<UiEffect> {
        update(
            app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE))),
        )
    }

    fn like_generation(effects: &[UiEffect]) -> u64 {
        match effects {
            [UiEffect::ToggleLike { generation, .. }] => *generation,
            other => panic!("expected a single ToggleLike, got {other:?}"),
        }
    }

    #[test]
    fn empty_comment_never_produces_a_request() {
        let mut app = logged_in_app();
        app.tui.detail.post = Some(post(1, false, 0));
        app.tui.router.open_post(1, true);
        app.tui.detail.comment_focus = true;
        app.tui.detail.comment_input = "   ".into();

        let effects = press(&mut app, KeyCode::Enter);
        assert!(effects.is_empty());
        assert!(app.tui.notices.current().is_some());
        assert!(!app.tui.interactions.comment_in_flight(1));
    }

    #[test]
    fn comment_appends_only_after_ack() {
        let mut app = logged_in_app();
        app.tui.detail.post = Some(post(1, false, 0));
        app.tui.router.open_post(1, true);
        app.tui.detail.comment_focus = true;
        app.tui.detail.comment_input = "nice post".into();

        let effects = press(&mut app, KeyCode::Enter);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::AddComment { post_id: 1, content }] if content == "nice post"
        ));
        // Nothing appended yet; the draft stays visible.
        assert!(app.tui.detail.post.as_ref().unwrap().comments.is_empty());
        assert_eq!(app.tui.detail.comment_input, "nice post");

        update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::CommentSettled {
                post_id: 1,
                result: Ok(quill_core::Comment {
                    id: 9,
                    author: "alice".into(),
                    content: "nice post".into(),
                    created_at: Utc::now(),
                }),
            }),
        );
        let detail = app.tui.detail.post.as_ref().unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert!(app.tui.detail.comment_input.is_empty());
    }

    #[test]
    fn failed_comment_keeps_the_draft() {
        let mut app = logged_in_app();
        app.tui.detail.post = Some(post(1, false, 0));
        app.tui.router.open_post(1, true);
        app.tui.detail.comment_focus = true;
        app.tui.detail.comment_input = "draft".into();
        press(&mut app, KeyCode::Enter);

        update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::CommentSettled {
                post_id: 1,
                result: Err(Fault {
                    message: "server error".into(),
                    unauthorized: false,
                }),
            }),
        );
        assert_eq!(app.tui.detail.comment_input, "draft");
        assert!(app.tui.detail.post.as_ref().unwrap().comments.is_empty());
        // The slot is free again for a retry.
        assert!(!app.tui.interactions.comment_in_flight(1));
    }

    #[test]
    fn like_flips_optimistically_and_latest_generation_wins() {
        let mut app = logged_in_app();
        app.tui.feed.posts = vec![post(1, false, 3)];

        let first = like_generation(&press(&mut app, KeyCode::Char(' ')));
        assert!(app.tui.feed.posts[0].is_liked);
        assert_eq!(app.tui.feed.posts[0].likes_count, 4);

        let second = like_generation(&press(&mut app, KeyCode::Char(' ')));
        assert!(!app.tui.feed.posts[0].is_liked);
        assert_eq!(app.tui.feed.posts[0].likes_count, 3);

        // The stale first response must not disturb the newer flip.
        update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::LikeSettled {
                post_id: 1,
                generation: first,
                result: Ok(LikeResponse {
                    status: "liked".into(),
                    likes_count: 99,
                }),
            }),
        );
        assert!(!app.tui.feed.posts[0].is_liked);
        assert_eq!(app.tui.feed.posts[0].likes_count, 3);

        // The current response overwrites with authoritative values.
        update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::LikeSettled {
                post_id: 1,
                generation: second,
                result: Ok(LikeResponse {
                    status: "unliked".into(),
                    likes_count: 3,
                }),
            }),
        );
        assert!(!app.tui.feed.posts[0].is_liked);
        assert_eq!(app.tui.feed.posts[0].likes_count, 3);
        assert!(!app.tui.interactions.like_in_flight(1));
    }

    #[test]
    fn failed_like_rolls_back_to_pre_interaction_state() {
        let mut app = logged_in_app();
        app.tui.feed.posts = vec![post(1, false, 3)];
        app.tui.detail.post = Some(post(1, false, 3));

        let generation = like_generation(&press(&mut app, KeyCode::Char(' ')));
        assert!(app.tui.feed.posts[0].is_liked);
        assert!(app.tui.detail.post.as_ref().unwrap().is_liked);

        update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::LikeSettled {
                post_id: 1,
                generation,
                result: Err(Fault {
                    message: "boom".into(),
                    unauthorized: false,
                }),
            }),
        );
        // Every copy rolled back together.
        assert!(!app.tui.feed.posts[0].is_liked);
        assert_eq!(app.tui.feed.posts[0].likes_count, 3);
        let detail = app.tui.detail.post.as_ref().unwrap();
        assert!(!detail.is_liked);
        assert_eq!(detail.likes_count, 3);
    }

    #[test]
    fn unauthorized_fault_escalates_to_session_invalidation() {
        let mut app = logged_in_app();
        app.tui.feed.posts = vec![post(1, false, 0)];
        let generation = like_generation(&press(&mut app, KeyCode::Char(' ')));

        let effects = update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::LikeSettled {
                post_id: 1,
                generation,
                result: Err(Fault {
                    message: "401".into(),
                    unauthorized: true,
                }),
            }),
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::InvalidateSession]
        ));

        // The cascade lands as a session event and resets everything,
        // silently.
        let effects = update(&mut app, UiEvent::Session(SessionUiEvent::SessionExpired));
        assert!(effects.is_empty());
        assert_eq!(app.tui.router.view, View::Feed);
        assert!(app.tui.session.identity.is_none());
        assert!(app.tui.feed.posts.is_empty());
        assert!(app.modal.is_none());
        assert!(app.tui.notices.current().is_none());
    }

    #[test]
    fn stale_like_auth_failure_still_invalidates_session() {
        let mut app = logged_in_app();
        app.tui.feed.posts = vec![post(1, false, 3)];

        // Two rapid toggles; the first response is superseded by the time
        // it lands.
        let first = like_generation(&press(&mut app, KeyCode::Char(' ')));
        press(&mut app, KeyCode::Char(' '));

        let effects = update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::LikeSettled {
                post_id: 1,
                generation: first,
                result: Err(Fault {
                    message: "401".into(),
                    unauthorized: true,
                }),
            }),
        );
        // The 401 must not be swallowed by the generation gate.
        assert!(matches!(effects.as_slice(), [UiEffect::InvalidateSession]));
        // The superseded rollback still does not touch the newer flip.
        assert!(!app.tui.feed.posts[0].is_liked);
        assert_eq!(app.tui.feed.posts[0].likes_count, 3);
    }

    #[test]
    fn stale_epoch_feed_failure_still_invalidates_session() {
        let mut app = logged_in_app();
        app.tui.router.go_my_posts(true);
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));

        // Failure from the epoch before the remount.
        let stale_epoch = app.tui.router.feed_epoch - 1;
        let effects = update(
            &mut app,
            UiEvent::Data(DataUiEvent::FeedFailed {
                epoch: stale_epoch,
                fault: Fault {
                    message: "401".into(),
                    unauthorized: true,
                },
            }),
        );
        assert!(matches!(effects.as_slice(), [UiEffect::InvalidateSession]));
        assert!(app.tui.notices.current().is_none());
    }

    #[test]
    fn superseded_task_auth_failure_still_invalidates_session() {
        use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};

        let mut app = logged_in_app();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::FeedLoad,
                started: TaskStarted { id: TaskId(1) },
            },
        );
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::FeedLoad,
                started: TaskStarted { id: TaskId(2) },
            },
        );

        let current_epoch = app.tui.router.feed_epoch;
        let effects = update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::FeedLoad,
                completed: TaskCompleted {
                    id: TaskId(1),
                    result: Box::new(UiEvent::Data(DataUiEvent::FeedFailed {
                        epoch: current_epoch,
                        fault: Fault {
                            message: "401".into(),
                            unauthorized: true,
                        },
                    })),
                },
            },
        );
        assert!(matches!(effects.as_slice(), [UiEffect::InvalidateSession]));
        // The newer task keeps running; its slot was not touched.
        assert!(app.tui.tasks.feed_load.is_running());
    }

    #[test]
    fn acknowledged_comment_reaches_every_copy() {
        let mut app = logged_in_app();
        app.tui.feed.posts = vec![post(1, false, 0)];
        app.tui.detail.post = Some(post(1, false, 0));
        app.tui.router.open_post(1, true);

        update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::CommentSettled {
                post_id: 1,
                result: Ok(quill_core::Comment {
                    id: 9,
                    author: "alice".into(),
                    content: "nice post".into(),
                    created_at: Utc::now(),
                }),
            }),
        );
        assert_eq!(app.tui.detail.post.as_ref().unwrap().comments.len(), 1);
        assert_eq!(app.tui.feed.posts[0].comments.len(), 1);
    }

    #[test]
    fn logout_resets_view_and_remounts_feed() {
        let mut app = logged_in_app();
        app.tui.router.go_my_posts(true);
        let epoch = app.tui.router.feed_epoch;

        let effects = update(&mut app, UiEvent::Session(SessionUiEvent::LoggedOut));
        assert!(effects.is_empty());
        assert_eq!(app.tui.router.view, View::Feed);
        assert_eq!(app.tui.router.feed_epoch, epoch + 1);
        assert!(app.tui.my_posts.posts.is_empty());
        assert!(app.tui.feed.posts.is_empty());
    }

    #[test]
    fn feed_reselect_remounts_but_navigation_reuses_cache() {
        let mut app = logged_in_app();
        app.tui.feed.posts = vec![post(1, false, 0)];
        app.tui.feed.loaded_epoch = Some(0);
        app.tui.feed.selected = 0;

        // Already on the feed: re-select remounts with a new epoch.
        let effects = press(&mut app, KeyCode::Char('f'));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadFeed { epoch: 1, .. }]
        ));

        // A response for the old epoch is dropped.
        update(
            &mut app,
            UiEvent::Data(DataUiEvent::FeedLoaded {
                epoch: 0,
                posts: vec![post(2, false, 0)],
            }),
        );
        assert_eq!(app.tui.feed.posts[0].id, 1);

        update(
            &mut app,
            UiEvent::Data(DataUiEvent::FeedLoaded {
                epoch: 1,
                posts: vec![post(3, false, 0)],
            }),
        );
        assert_eq!(app.tui.feed.posts[0].id, 3);

        // Navigate away and back: cached list, no fetch.
        press(&mut app, KeyCode::Char('m'));
        let effects = press(&mut app, KeyCode::Char('f'));
        assert!(effects.is_empty());
        assert_eq!(app.tui.feed.posts[0].id, 3);
    }

    #[test]
    fn gated_navigation_opens_login_instead() {
        let mut app = AppState::new();
        let effects = press(&mut app, KeyCode::Char('m'));
        assert!(effects.is_empty());
        assert!(matches!(app.modal, Some(Modal::Login(_))));
        assert_eq!(app.tui.router.view, View::Feed);
    }

    #[test]
    fn stale_task_completion_is_dropped() {
        use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};

        let mut app = logged_in_app();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::FeedLoad,
                started: TaskStarted { id: TaskId(1) },
            },
        );
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::FeedLoad,
                started: TaskStarted { id: TaskId(2) },
            },
        );

        // Completion of the superseded task carries a payload that must
        // not be applied.
        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::FeedLoad,
                completed: TaskCompleted {
                    id: TaskId(1),
                    result: Box::new(UiEvent::Data(DataUiEvent::FeedLoaded {
                        epoch: 0,
                        posts: vec![post(7, false, 0)],
                    })),
                },
            },
        );
        assert!(app.tui.feed.posts.is_empty());
        assert!(app.tui.tasks.feed_load.is_running());
    }

    #[test]
    fn follow_success_refetches_profile() {
        let mut app = logged_in_app();
        app.tui.router.go_profile("bob", true);
        app.tui.profile.username = Some("bob".into());

        let effects = press(&mut app, KeyCode::Char('w'));
        let generation = match effects.as_slice() {
            [UiEffect::ToggleFollow { generation, .. }] => *generation,
            other => panic!("expected ToggleFollow, got {other:?}"),
        };

        let effects = update(
            &mut app,
            UiEvent::Interaction(InteractionUiEvent::FollowSettled {
                username: "bob".into(),
                generation,
                result: Ok(quill_core::FollowStatus {
                    status: "followed".into(),
                }),
            }),
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadProfile { username, .. }] if username == "bob"
        ));
    }

    #[test]
    fn own_profile_cannot_be_followed() {
        let mut app = logged_in_app();
        app.tui.router.go_profile("alice", true);
        app.tui.profile.username = Some("alice".into());
        assert!(press(&mut app, KeyCode::Char('w')).is_empty());
    }
}

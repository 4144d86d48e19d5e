//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return a `UiEvent`. The runtime
//! spawns them and forwards the result to the inbox, so this module does
//! the I/O while the reducer stays synchronous.

use quill_core::{PostDraft, ProfileUpdate, RefreshOutcome, RegisterRequest, SessionManager};

use crate::events::{DataUiEvent, Fault, InteractionUiEvent, SessionUiEvent, UiEvent};

/// Access token for an authenticated call, or the fault that routes the
/// caller into the implicit-logout cascade.
async fn bearer(session: &SessionManager) -> Result<String, Fault> {
    session.access_token().await.ok_or(Fault {
        message: "Not signed in.".to_string(),
        unauthorized: true,
    })
}

// ============================================================================
// Session
// ============================================================================

pub async fn login(session: SessionManager, username: String, password: String) -> UiEvent {
    match session.login(&username, &password).await {
        Ok(()) => UiEvent::Session(SessionUiEvent::LoggedIn),
        Err(e) => UiEvent::Session(SessionUiEvent::LoginFailed {
            error: e.to_string(),
        }),
    }
}

/// Registers an account, then signs the new user straight in. If the
/// follow-up login fails the account still exists, so fall back to the
/// prefilled sign-in form instead of reporting an error.
pub async fn register(session: SessionManager, request: RegisterRequest) -> UiEvent {
    if let Err(e) = session.api().register(&request).await {
        return UiEvent::Session(SessionUiEvent::RegisterFailed {
            error: e.to_string(),
        });
    }
    match session.login(&request.username, &request.password).await {
        Ok(()) => UiEvent::Session(SessionUiEvent::LoggedIn),
        Err(_) => UiEvent::Session(SessionUiEvent::Registered {
            username: request.username,
        }),
    }
}

pub async fn logout(session: SessionManager) -> UiEvent {
    session.logout().await;
    UiEvent::Session(SessionUiEvent::LoggedOut)
}

/// Runs the implicit logout after an authenticated call was rejected.
pub async fn invalidate_session(session: SessionManager) -> UiEvent {
    session.handle_auth_failure().await;
    UiEvent::Session(SessionUiEvent::SessionExpired)
}

pub async fn refresh_identity(session: SessionManager) -> UiEvent {
    match session.refresh_identity().await {
        Ok(RefreshOutcome::Updated(profile)) => {
            UiEvent::Session(SessionUiEvent::IdentityRefreshed { profile })
        }
        Ok(RefreshOutcome::Anonymous) => UiEvent::Session(SessionUiEvent::IdentityAnonymous),
        Ok(RefreshOutcome::Expired) => UiEvent::Session(SessionUiEvent::SessionExpired),
        Err(e) => UiEvent::Session(SessionUiEvent::RefreshFailed {
            error: e.to_string(),
        }),
    }
}

pub async fn save_profile(session: SessionManager, update: ProfileUpdate) -> UiEvent {
    let access = match bearer(&session).await {
        Ok(access) => access,
        Err(fault) => return UiEvent::Session(SessionUiEvent::ProfileSaveFailed { fault }),
    };
    match session.api().update_profile(&access, &update).await {
        Ok(profile) => UiEvent::Session(SessionUiEvent::ProfileSaved { profile }),
        Err(e) => UiEvent::Session(SessionUiEvent::ProfileSaveFailed { fault: e.into() }),
    }
}

// ============================================================================
// View data
// ============================================================================

pub async fn load_feed(session: SessionManager, epoch: u64) -> UiEvent {
    let access = match bearer(&session).await {
        Ok(access) => access,
        Err(fault) => return UiEvent::Data(DataUiEvent::FeedFailed { epoch, fault }),
    };
    match session.api().feed(&access).await {
        Ok(posts) => UiEvent::Data(DataUiEvent::FeedLoaded { epoch, posts }),
        Err(e) => UiEvent::Data(DataUiEvent::FeedFailed {
            epoch,
            fault: e.into(),
        }),
    }
}

pub async fn load_my_posts(session: SessionManager) -> UiEvent {
    let access = match bearer(&session).await {
        Ok(access) => access,
        Err(fault) => return UiEvent::Data(DataUiEvent::MyPostsFailed { fault }),
    };
    match session.api().my_posts(&access).await {
        Ok(posts) => UiEvent::Data(DataUiEvent::MyPostsLoaded { posts }),
        Err(e) => UiEvent::Data(DataUiEvent::MyPostsFailed { fault: e.into() }),
    }
}

pub async fn load_profile(session: SessionManager, username: String) -> UiEvent {
    let access = match bearer(&session).await {
        Ok(access) => access,
        Err(fault) => return UiEvent::Data(DataUiEvent::ProfileFailed { username, fault }),
    };
    match session.api().profile(&access, &username).await {
        Ok(bundle) => UiEvent::Data(DataUiEvent::ProfileLoaded { username, bundle }),
        Err(e) => UiEvent::Data(DataUiEvent::ProfileFailed {
            username,
            fault: e.into(),
        }),
    }
}

/// Category list for the compose form. Failure here only costs the picker
/// its suggestions, so it degrades to an empty list.
pub async fn load_categories(session: SessionManager) -> UiEvent {
    let categories = match session.api().categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!("failed to load categories: {e}");
            Vec::new()
        }
    };
    UiEvent::Data(DataUiEvent::CategoriesLoaded { categories })
}

// ============================================================================
// Authoring
// ============================================================================

pub async fn save_post(
    session: SessionManager,
    editing: Option<u64>,
    draft: PostDraft,
) -> UiEvent {
    let access = match bearer(&session).await {
        Ok(access) => access,
        Err(fault) => return UiEvent::Data(DataUiEvent::PostSaveFailed { fault }),
    };
    let result = match editing {
        Some(id) => session.api().update_post(&access, id, &draft).await,
        None => session.api().create_post(&access, &draft).await,
    };
    match result {
        Ok(post) => UiEvent::Data(DataUiEvent::PostSaved {
            post,
            created: editing.is_none(),
        }),
        Err(e) => UiEvent::Data(DataUiEvent::PostSaveFailed { fault: e.into() }),
    }
}

pub async fn delete_post(session: SessionManager, post_id: u64) -> UiEvent {
    let access = match bearer(&session).await {
        Ok(access) => access,
        Err(fault) => return UiEvent::Data(DataUiEvent::PostDeleteFailed { fault }),
    };
    match session.api().delete_post(&access, post_id).await {
        Ok(()) => UiEvent::Data(DataUiEvent::PostDeleted { post_id }),
        Err(e) => UiEvent::Data(DataUiEvent::PostDeleteFailed { fault: e.into() }),
    }
}

// ============================================================================
// Interactions
// ============================================================================

pub async fn toggle_like(session: SessionManager, post_id: u64, generation: u64) -> UiEvent {
    let result = match bearer(&session).await {
        Ok(access) => session
            .api()
            .toggle_like(&access, post_id)
            .await
            .map_err(Fault::from),
        Err(fault) => Err(fault),
    };
    UiEvent::Interaction(InteractionUiEvent::LikeSettled {
        post_id,
        generation,
        result,
    })
}

pub async fn add_comment(session: SessionManager, post_id: u64, content: String) -> UiEvent {
    let result = match bearer(&session).await {
        Ok(access) => session
            .api()
            .add_comment(&access, post_id, &content)
            .await
            .map_err(Fault::from),
        Err(fault) => Err(fault),
    };
    UiEvent::Interaction(InteractionUiEvent::CommentSettled { post_id, result })
}

pub async fn toggle_follow(session: SessionManager, username: String, generation: u64) -> UiEvent {
    let result = match bearer(&session).await {
        Ok(access) => session
            .api()
            .toggle_follow(&access, &username)
            .await
            .map_err(Fault::from),
        Err(fault) => Err(fault),
    };
    UiEvent::Interaction(InteractionUiEvent::FollowSettled {
        username,
        generation,
        result,
    })
}

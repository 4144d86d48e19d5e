//! Authenticated-identity lifecycle.
//!
//! `SessionManager` owns the credential pair and the identity derived from
//! it. It is the only writer of the persisted credential slot; every other
//! component reads session state through it.
//!
//! The invariant protected here: credential and identity are cleared
//! together, under the same lock, through one path (`invalidate_locally`).
//! Any authenticated call that comes back with an auth-failure status must
//! be routed through [`SessionManager::handle_auth_failure`] so the whole
//! client falls back to the logged-out state consistently.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::api::types::Profile;
use crate::api::{ApiClient, ApiResult};
use crate::credentials::{Credential, CredentialStore};

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No credential; logged-out landing state.
    Anonymous,
    /// Login request in flight.
    Authenticating,
    /// Credential held; identity present or being refreshed.
    Authenticated,
    /// Logout in progress (revoke call may still be in flight).
    Invalidating,
}

/// Result of an identity refresh.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Identity fetched (or taken from a coalesced in-flight refresh).
    Updated(Profile),
    /// No credential held; nothing to refresh.
    Anonymous,
    /// The credential was rejected and the implicit logout ran.
    Expired,
}

/// Read-only view of the session for display and gating.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Option<Profile>,
}

impl SessionSnapshot {
    /// True when authenticated views are reachable.
    pub fn logged_in(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}

#[derive(Debug)]
struct Inner {
    phase: SessionPhase,
    credential: Option<Credential>,
    identity: Option<Profile>,
    /// Rendezvous for the in-flight identity refresh, if any.
    refresh: Option<watch::Receiver<()>>,
}

/// Owns login, logout, identity refresh, and the implicit-logout cascade.
///
/// Cheap to clone; all clones share one state.
#[derive(Debug, Clone)]
pub struct SessionManager {
    api: ApiClient,
    store: CredentialStore,
    inner: Arc<Mutex<Inner>>,
}

impl SessionManager {
    /// Creates a manager, adopting any credential persisted from a previous
    /// run. Identity stays empty until the first refresh validates it.
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        let credential = store.load();
        let phase = if credential.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        Self {
            api,
            store,
            inner: Arc::new(Mutex::new(Inner {
                phase,
                credential,
                identity: None,
                refresh: None,
            })),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Current phase + identity, for gating and display.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            phase: inner.phase,
            identity: inner.identity.clone(),
        }
    }

    /// The bearer token for authenticated calls, if logged in.
    pub async fn access_token(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        inner.credential.as_ref().map(|c| c.access.clone())
    }

    /// Exchanges credentials for a token pair and persists it.
    ///
    /// On failure the session stays Anonymous and the error is surfaced;
    /// callers follow a successful login with `refresh_identity`.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        {
            let mut inner = self.inner.lock().await;
            inner.phase = SessionPhase::Authenticating;
        }

        match self.api.login(username, password).await {
            Ok(pair) => {
                let credential = Credential {
                    access: pair.access,
                    refresh: pair.refresh,
                };
                if let Err(e) = self.store.save(&credential) {
                    // The session still works for this process lifetime.
                    tracing::warn!(error = %e, "failed to persist credential");
                }
                let mut inner = self.inner.lock().await;
                inner.credential = Some(credential);
                inner.phase = SessionPhase::Authenticated;
                tracing::info!(username, "logged in");
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.lock().await;
                inner.phase = SessionPhase::Anonymous;
                Err(e)
            }
        }
    }

    /// Revokes the refresh token (best-effort) and clears local state.
    ///
    /// The revoke call failing is the one intentionally absorbed error in
    /// the client: the local side of logout must always complete.
    pub async fn logout(&self) {
        let credential = {
            let mut inner = self.inner.lock().await;
            inner.phase = SessionPhase::Invalidating;
            inner.credential.clone()
        };

        if let Some(credential) = credential
            && let Err(e) = self.api.logout(&credential.access, &credential.refresh).await
        {
            tracing::warn!(error = %e, "token revoke failed; clearing local session anyway");
        }

        self.invalidate_locally().await;
        tracing::info!("logged out");
    }

    /// Fetches the profile behind the stored credential.
    ///
    /// At most one refresh is in flight: a second call while one is pending
    /// waits for that result instead of issuing a duplicate request. An
    /// auth-failure response runs the implicit logout and reports
    /// [`RefreshOutcome::Expired`] rather than an error; only transport and
    /// server faults propagate as `Err`.
    pub async fn refresh_identity(&self) -> ApiResult<RefreshOutcome> {
        // Join the pending refresh or become the owner of a new one.
        let owner = {
            let mut inner = self.inner.lock().await;
            let Some(credential) = inner.credential.clone() else {
                return Ok(RefreshOutcome::Anonymous);
            };
            match &inner.refresh {
                Some(rx) => Err(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(());
                    inner.refresh = Some(rx);
                    Ok((tx, credential.access))
                }
            }
        };

        let (done, access) = match owner {
            Ok(owned) => owned,
            Err(mut rx) => {
                // Coalesced: wait for the in-flight refresh to settle, then
                // report whatever state it produced.
                let _ = rx.changed().await;
                let inner = self.inner.lock().await;
                return Ok(match &inner.identity {
                    Some(identity) => RefreshOutcome::Updated(identity.clone()),
                    None => RefreshOutcome::Anonymous,
                });
            }
        };

        let result = self.api.me(&access).await;

        let outcome = match result {
            Ok(profile) => {
                let mut inner = self.inner.lock().await;
                inner.refresh = None;
                // Logout may have raced the fetch; never resurrect identity
                // without a credential.
                if inner.credential.is_some() {
                    inner.identity = Some(profile.clone());
                    Ok(RefreshOutcome::Updated(profile))
                } else {
                    Ok(RefreshOutcome::Anonymous)
                }
            }
            Err(e) if e.is_auth_failure() => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.refresh = None;
                }
                tracing::info!("credential rejected; running implicit logout");
                self.invalidate_locally().await;
                Ok(RefreshOutcome::Expired)
            }
            Err(e) => {
                let mut inner = self.inner.lock().await;
                inner.refresh = None;
                Err(e)
            }
        };

        let _ = done.send(());
        outcome
    }

    /// The shared implicit-logout entry point for authenticated
    /// collaborators that hit an auth-failure response.
    pub async fn handle_auth_failure(&self) {
        tracing::info!("authenticated call rejected; running implicit logout");
        self.invalidate_locally().await;
    }

    async fn invalidate_locally(&self) {
        let mut inner = self.inner.lock().await;
        inner.credential = None;
        inner.identity = None;
        inner.phase = SessionPhase::Anonymous;
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::at(dir.path().join("credentials.json"))
    }

    fn manager_for(server: &MockServer, store: CredentialStore) -> SessionManager {
        SessionManager::new(ApiClient::new(&server.uri(), 5), store)
    }

    fn profile_body(username: &str) -> serde_json::Value {
        serde_json::json!({
            "username": username,
            "first_name": "",
            "last_name": "",
            "email": "",
            "followers_count": 0,
            "following_count": 0,
            "is_following": false
        })
    }

    fn mount_login(server: &MockServer) -> impl std::future::Future<Output = ()> + '_ {
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access": "acc-1", "refresh": "ref-1"}),
            ))
            .mount(server)
    }

    #[tokio::test]
    async fn credential_and_identity_move_together() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/profile/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body("alice")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/logout/"))
            .respond_with(ResponseTemplate::new(205))
            .mount(&server)
            .await;

        let store = store_in(&dir);
        let session = manager_for(&server, store.clone());

        // Anonymous: neither credential nor identity.
        assert!(session.access_token().await.is_none());
        assert!(session.snapshot().await.identity.is_none());

        session.login("alice", "pw").await.unwrap();
        let outcome = session.refresh_identity().await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Updated(p) if p.username == "alice"));
        assert!(session.access_token().await.is_some());
        assert!(store.load().is_some());

        session.logout().await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(snapshot.identity.is_none());
        assert!(session.access_token().await.is_none());
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn rejected_credential_runs_implicit_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&Credential {
                access: "stale".into(),
                refresh: "stale".into(),
            })
            .unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({"detail": "Token is invalid or expired"}),
            ))
            .mount(&server)
            .await;

        let session = manager_for(&server, store.clone());
        assert_eq!(session.snapshot().await.phase, SessionPhase::Authenticated);

        let outcome = session.refresh_identity().await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Expired));

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(snapshot.identity.is_none());
        assert!(store.load().is_none(), "persisted credential must be cleared");
    }

    #[tokio::test]
    async fn failed_revoke_still_clears_local_state() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/logout/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_in(&dir);
        let session = manager_for(&server, store.clone());
        session.login("alice", "pw").await.unwrap();

        session.logout().await;
        assert_eq!(session.snapshot().await.phase, SessionPhase::Anonymous);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn failed_login_stays_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = manager_for(&server, store_in(&dir));
        assert!(session.login("alice", "wrong").await.is_err());
        assert_eq!(session.snapshot().await.phase, SessionPhase::Anonymous);
        assert!(session.access_token().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_refreshes_coalesce_to_one_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&Credential {
                access: "acc".into(),
                refresh: "ref".into(),
            })
            .unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile/"))
            .and(header("authorization", "Bearer acc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(profile_body("alice"))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = manager_for(&server, store);
        let first = tokio::spawn({
            let session = session.clone();
            async move { session.refresh_identity().await }
        });
        // Give the first call time to take ownership of the refresh slot.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = session.refresh_identity().await.unwrap();

        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, RefreshOutcome::Updated(_)));
        assert!(matches!(second, RefreshOutcome::Updated(_)));
        // wiremock verifies expect(1) on drop.
    }
}

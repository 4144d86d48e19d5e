//! HTTP client for the blogging service API.
//!
//! One thin method per endpoint; no retry logic and no session state. The
//! bearer token is passed in per call so the client itself stays cheap to
//! clone into spawned tasks (reqwest's client is reference-counted).

mod error;
pub mod types;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use error::{ApiError, ApiErrorKind, ApiResult};
use types::{
    Category, Comment, FollowStatus, LikeResponse, Post, PostDraft, Profile, ProfileBundle,
    ProfileUpdate, RegisterRequest, TokenPair,
};

/// Standard User-Agent header for quill API requests.
pub const USER_AGENT: &str = concat!("quill/", env!("CARGO_PKG_VERSION"));

/// API client over the blogging service endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given base URL with the given timeout.
    /// A zero timeout disables the request deadline.
    pub fn new(base_url: &str, timeout_secs: u32) -> Self {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(u64::from(timeout_secs)));
        }
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            // Building only fails on malformed TLS backends; fall back to defaults.
            http: builder.build().unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Exchanges username and password for a token pair.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        #[derive(Serialize)]
        struct Body<'a> {
            username: &'a str,
            password: &'a str,
        }
        self.post_json("/api/token/", None, &Body { username, password })
            .await
    }

    /// Revokes the refresh token. Best-effort by policy; the caller decides
    /// whether a failure here matters.
    pub async fn logout(&self, access: &str, refresh: &str) -> ApiResult<()> {
        #[derive(Serialize)]
        struct Body<'a> {
            refresh_token: &'a str,
        }
        let response = self
            .http
            .post(self.url("/api/logout/"))
            .bearer_auth(access)
            .json(&Body {
                refresh_token: refresh,
            })
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }

    /// Creates a new account.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        let _: serde_json::Value = self.post_json("/api/register/", None, request).await?;
        Ok(())
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Fetches the profile behind the bearer credential (the identity).
    pub async fn me(&self, access: &str) -> ApiResult<Profile> {
        self.get_json("/api/profile/", access).await
    }

    /// Fetches `{profile, posts}` for any user.
    pub async fn profile(&self, access: &str, username: &str) -> ApiResult<ProfileBundle> {
        self.get_json(&format!("/api/profile/{username}/"), access)
            .await
    }

    /// Updates fields on the caller's own profile.
    pub async fn update_profile(
        &self,
        access: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<Profile> {
        self.put_json("/api/profile/update/", access, update).await
    }

    /// Toggles the follow edge towards `username`. The response carries no
    /// counts; callers re-fetch the profile for authoritative numbers.
    pub async fn toggle_follow(&self, access: &str, username: &str) -> ApiResult<FollowStatus> {
        self.post_json(
            &format!("/api/profile/{username}/follow/"),
            Some(access),
            &serde_json::json!({}),
        )
        .await
    }

    // ========================================================================
    // Posts
    // ========================================================================

    /// Feed listing: active, visible posts, newest first.
    pub async fn feed(&self, access: &str) -> ApiResult<Vec<Post>> {
        self.get_json("/api/posts/", access).await
    }

    /// Own posts regardless of visibility.
    pub async fn my_posts(&self, access: &str) -> ApiResult<Vec<Post>> {
        self.get_json("/api/my-posts/", access).await
    }

    pub async fn create_post(&self, access: &str, draft: &PostDraft) -> ApiResult<Post> {
        self.post_json("/api/posts/create/", Some(access), draft)
            .await
    }

    pub async fn update_post(&self, access: &str, id: u64, draft: &PostDraft) -> ApiResult<Post> {
        self.put_json(&format!("/api/posts/update/{id}/"), access, draft)
            .await
    }

    pub async fn delete_post(&self, access: &str, id: u64) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/posts/delete/{id}/")))
            .bearer_auth(access)
            .send()
            .await
            .map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }

    /// Toggles the like edge; returns the authoritative `{status, likes_count}`.
    pub async fn toggle_like(&self, access: &str, post_id: u64) -> ApiResult<LikeResponse> {
        self.post_json(
            &format!("/api/posts/{post_id}/like/"),
            Some(access),
            &serde_json::json!({}),
        )
        .await
    }

    /// Appends a comment; returns the created Comment with server-assigned
    /// id and timestamp.
    pub async fn add_comment(
        &self,
        access: &str,
        post_id: u64,
        content: &str,
    ) -> ApiResult<Comment> {
        #[derive(Serialize)]
        struct Body<'a> {
            content: &'a str,
        }
        self.post_json(
            &format!("/api/posts/{post_id}/comment/"),
            Some(access),
            &Body { content },
        )
        .await
    }

    /// Category list for post authoring (unauthenticated).
    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        let response = self
            .http
            .get(self.url("/api/categories/"))
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::decode(response).await
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, access: &str) -> ApiResult<T> {
        tracing::debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(access)
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        access: Option<&str>,
        body: &B,
    ) -> ApiResult<T> {
        tracing::debug!(path, "POST");
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(access) = access {
            request = request.bearer_auth(access);
        }
        let response = request.send().await.map_err(ApiError::from)?;
        Self::decode(response).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        access: &str,
        body: &B,
    ) -> ApiResult<T> {
        tracing::debug!(path, "PUT");
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(access)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ApiError::parse(format!("Failed to decode response: {e}")))
    }
}

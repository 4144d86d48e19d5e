//! View navigation state machine.
//!
//! One view is active at a time. Post detail remembers where it was opened
//! from so closing it restores the exact origin, including which profile
//! was being viewed.
//!
//! The feed carries an epoch counter. Asking for the feed while already on
//! it does not navigate; it bumps the epoch, which callers treat as a
//! remount: re-fetch and reset scroll. Navigating back to the feed from
//! another view keeps the epoch and therefore the cached list.

/// Where to land when a post detail is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnTarget {
    Feed,
    MyPosts,
    Profile(String),
}

impl ReturnTarget {
    fn into_view(self) -> View {
        match self {
            ReturnTarget::Feed => View::Feed,
            ReturnTarget::MyPosts => View::MyPosts,
            ReturnTarget::Profile(username) => View::Profile(username),
        }
    }
}

/// The active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Feed,
    MyPosts,
    Profile(String),
    PostDetail {
        post_id: u64,
        return_to: ReturnTarget,
    },
}

impl View {
    /// The target a detail opened from this view should return to.
    pub fn as_return_target(&self) -> ReturnTarget {
        match self {
            View::Feed => ReturnTarget::Feed,
            View::MyPosts => ReturnTarget::MyPosts,
            View::Profile(username) => ReturnTarget::Profile(username.clone()),
            // Opening a post from within a detail (e.g. via an author's
            // profile shortcut) keeps the original origin.
            View::PostDetail { return_to, .. } => return_to.clone(),
        }
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The active view changed; callers load the new view's data.
    Changed,
    /// Already on the feed; the epoch was bumped and the feed should be
    /// re-fetched with scroll reset.
    Remounted,
    /// The target is gated behind login; open the auth modal instead.
    RequiresAuth,
    /// Nothing to do.
    NoOp,
}

#[derive(Debug)]
pub struct Router {
    pub view: View,
    pub feed_epoch: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            view: View::Feed,
            feed_epoch: 0,
        }
    }
}

impl Router {
    pub fn go_feed(&mut self) -> NavOutcome {
        if self.view == View::Feed {
            self.feed_epoch = self.feed_epoch.wrapping_add(1);
            NavOutcome::Remounted
        } else {
            self.view = View::Feed;
            NavOutcome::Changed
        }
    }

    pub fn go_my_posts(&mut self, logged_in: bool) -> NavOutcome {
        if !logged_in {
            return NavOutcome::RequiresAuth;
        }
        if self.view == View::MyPosts {
            return NavOutcome::NoOp;
        }
        self.view = View::MyPosts;
        NavOutcome::Changed
    }

    pub fn go_profile(&mut self, username: &str, logged_in: bool) -> NavOutcome {
        if !logged_in {
            return NavOutcome::RequiresAuth;
        }
        if self.view == View::Profile(username.to_string()) {
            return NavOutcome::NoOp;
        }
        self.view = View::Profile(username.to_string());
        NavOutcome::Changed
    }

    pub fn open_post(&mut self, post_id: u64, logged_in: bool) -> NavOutcome {
        if !logged_in {
            return NavOutcome::RequiresAuth;
        }
        let return_to = self.view.as_return_target();
        if matches!(&self.view, View::PostDetail { post_id: current, .. } if *current == post_id) {
            return NavOutcome::NoOp;
        }
        self.view = View::PostDetail { post_id, return_to };
        NavOutcome::Changed
    }

    /// Closes the detail view, restoring its origin. No-op elsewhere.
    pub fn back(&mut self) -> NavOutcome {
        match std::mem::replace(&mut self.view, View::Feed) {
            View::PostDetail { return_to, .. } => {
                self.view = return_to.into_view();
                NavOutcome::Changed
            }
            other => {
                self.view = other;
                NavOutcome::NoOp
            }
        }
    }

    /// Logout (explicit or implicit) lands on a fresh feed. The epoch bump
    /// forces a re-fetch so nothing personalized lingers.
    pub fn reset_for_logout(&mut self) {
        self.view = View::Feed;
        self.feed_epoch = self.feed_epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_reselect_remounts_instead_of_navigating() {
        let mut router = Router::default();
        assert_eq!(router.feed_epoch, 0);

        assert_eq!(router.go_feed(), NavOutcome::Remounted);
        assert_eq!(router.feed_epoch, 1);

        router.go_my_posts(true);
        assert_eq!(router.go_feed(), NavOutcome::Changed);
        assert_eq!(router.feed_epoch, 1, "navigate back must not remount");
    }

    #[test]
    fn detail_returns_to_its_origin() {
        let mut router = Router::default();
        router.go_profile("alice", true);
        router.open_post(7, true);
        assert_eq!(
            router.view,
            View::PostDetail {
                post_id: 7,
                return_to: ReturnTarget::Profile("alice".into())
            }
        );

        assert_eq!(router.back(), NavOutcome::Changed);
        assert_eq!(router.view, View::Profile("alice".into()));
    }

    #[test]
    fn back_outside_detail_is_a_noop() {
        let mut router = Router::default();
        router.go_my_posts(true);
        assert_eq!(router.back(), NavOutcome::NoOp);
        assert_eq!(router.view, View::MyPosts);
    }

    #[test]
    fn gated_views_require_login() {
        let mut router = Router::default();
        assert_eq!(router.go_my_posts(false), NavOutcome::RequiresAuth);
        assert_eq!(router.go_profile("alice", false), NavOutcome::RequiresAuth);
        assert_eq!(router.open_post(1, false), NavOutcome::RequiresAuth);
        assert_eq!(router.view, View::Feed, "gated attempts must not navigate");

        assert_eq!(router.go_my_posts(true), NavOutcome::Changed);
        assert_eq!(router.view, View::MyPosts);
    }

    #[test]
    fn logout_resets_to_feed_and_bumps_epoch() {
        let mut router = Router::default();
        router.go_profile("alice", true);
        router.open_post(3, true);
        let epoch = router.feed_epoch;

        router.reset_for_logout();
        assert_eq!(router.view, View::Feed);
        assert_eq!(router.feed_epoch, epoch + 1);
    }

    #[test]
    fn reopening_the_same_post_is_a_noop() {
        let mut router = Router::default();
        router.open_post(3, true);
        assert_eq!(router.open_post(3, true), NavOutcome::NoOp);
    }
}

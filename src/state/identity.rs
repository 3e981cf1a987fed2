//! Signed-in user context shared by every handler

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// The identity currently driving the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub user_id: String,
    pub display_name: String,
}

/// Process-wide authentication context.
///
/// Identity changes are published on a watch channel; tasks that care about
/// sign-in or sign-out hold a receiver from [`AuthContext::subscribe`] and
/// drop it to unsubscribe.
#[derive(Debug)]
pub struct AuthContext {
    current_tx: watch::Sender<Option<SignedInUser>>,
}

impl AuthContext {
    /// Create a context with nobody signed in
    pub fn new() -> Self {
        let (current_tx, _) = watch::channel(None);
        Self { current_tx }
    }

    pub fn current(&self) -> Option<SignedInUser> {
        self.current_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SignedInUser>> {
        self.current_tx.subscribe()
    }

    pub fn sign_in(&self, user: SignedInUser) {
        info!("Signed in as {}", user.user_id);
        self.current_tx.send_replace(Some(user));
    }

    /// Keep the signed-in identity in step with an edited profile
    pub fn rename(&self, display_name: &str) {
        self.current_tx.send_if_modified(|current| match current {
            Some(user) if user.display_name != display_name => {
                user.display_name = display_name.to_string();
                true
            }
            _ => false,
        });
    }

    /// Clear the identity and return who was signed in
    pub fn sign_out(&self) -> Option<SignedInUser> {
        let previous = self.current_tx.send_replace(None);
        if let Some(user) = &previous {
            info!("Signed out {}", user.user_id);
        }
        previous
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> SignedInUser {
        SignedInUser {
            user_id: id.to_string(),
            display_name: id.to_string(),
        }
    }

    #[test]
    fn sign_in_and_out_update_current() {
        let auth = AuthContext::new();
        assert_eq!(auth.current(), None);
        auth.sign_in(user("rukia"));
        assert_eq!(auth.current(), Some(user("rukia")));
        assert_eq!(auth.sign_out(), Some(user("rukia")));
        assert_eq!(auth.current(), None);
        assert_eq!(auth.sign_out(), None);
    }

    #[tokio::test]
    async fn subscribers_see_identity_changes() {
        let auth = AuthContext::new();
        let mut rx = auth.subscribe();
        auth.sign_in(user("renji"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(user("renji")));
    }

    #[test]
    fn rename_keeps_the_user_and_skips_no_ops() {
        let auth = AuthContext::new();
        let mut rx = auth.subscribe();
        auth.rename("nobody");
        assert!(!rx.has_changed().unwrap());

        auth.sign_in(user("renji"));
        rx.borrow_and_update();
        auth.rename("renji");
        assert!(!rx.has_changed().unwrap());

        auth.rename("Abarai");
        assert!(rx.has_changed().unwrap());
        let current = auth.current().unwrap();
        assert_eq!(current.user_id, "renji");
        assert_eq!(current.display_name, "Abarai");
    }
}

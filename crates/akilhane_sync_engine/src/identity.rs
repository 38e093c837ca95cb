//! Access to the signed-in user.

use async_trait::async_trait;
use parking_lot::RwLock;

/// Source of the current user id. Sync passes require a signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user's id, or `None` when signed out.
    async fn current_user_id(&self) -> Option<String>;
}

/// An identity that is set explicitly.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user_id: RwLock<Option<String>>,
}

impl StaticIdentity {
    /// Creates an identity signed in as `user_id`.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    /// Creates a signed-out identity.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Signs in as `user_id`, or out with `None`.
    pub fn set_user(&self, user_id: Option<String>) {
        *self.user_id.write() = user_id;
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }
}

//! Session data types
//!
//! Everything the client remembers about the signed-in nutritionist. The
//! shapes mirror the API payloads, but they are validated here at the storage
//! boundary instead of trusting whatever was persisted.

pub mod subscription;
pub mod user;

use serde::{Deserialize, Serialize};

pub use subscription::{Subscription, SubscriptionStatus};
pub use user::UserProfile;

/// Opaque bearer credential handed out by the API on login or registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// The credential must not leak into logs or error reports.
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// In-memory record of the current authentication state.
///
/// `user` and `token` always travel together - there is no such thing as a
/// half-authenticated session. The subscription snapshot may be missing even
/// for a signed-in user; the store's queries fall back to fail-closed
/// defaults in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserProfile,
    pub token: AuthToken,
    pub subscription: Option<Subscription>,
}

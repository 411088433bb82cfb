//! Session store
//!
//! Single source of truth for "who is signed in and what can they do". Every
//! mutation writes through to the credential store, so a restart only needs
//! [`SessionStore::hydrate`] to pick the session back up. The store performs
//! no network calls itself; the login and registration commands hand it the
//! values the API returned.

use color_eyre::Result;
use tracing::warn;

use crate::config::Limits;
use crate::model::{AuthToken, Session, Subscription, UserProfile};
use crate::store::{CredentialStore, Slot};

pub struct SessionStore {
    store: CredentialStore,
    limits: Limits,
    session: Option<Session>,
    hydrated: bool,
}

impl SessionStore {
    /// Creates an empty, not-yet-hydrated store over the given storage
    pub fn new(store: CredentialStore, limits: Limits) -> Self {
        Self {
            store,
            limits,
            session: None,
            hydrated: false,
        }
    }

    /// Rebuilds the session from durable storage.
    ///
    /// Never fails the caller: a partial pair of slots, malformed stored
    /// records or a storage error all degrade to an empty session. Always
    /// leaves the store hydrated.
    pub async fn hydrate(&mut self) {
        self.session = match self.read_stored().await {
            Ok(session) => session,
            Err(err) => {
                warn!(?err, "Failed to read stored credentials, starting empty");
                None
            }
        };
        self.hydrated = true;
    }

    async fn read_stored(&self) -> Result<Option<Session>> {
        let token = self.store.get(Slot::Token).await?;
        let user = self.store.get(Slot::User).await?;

        // One slot without the other is not an authenticated session.
        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };

        let user: UserProfile = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(err) => {
                warn!(%err, "Stored user record is malformed, discarding session");
                return Ok(None);
            }
        };

        let subscription = match self.store.get(Slot::Subscription).await? {
            Some(raw) => match serde_json::from_str::<Subscription>(&raw) {
                Ok(subscription) => Some(subscription),
                Err(err) => {
                    warn!(%err, "Stored subscription snapshot is malformed, treating as absent");
                    None
                }
            },
            None => None,
        };

        Ok(Some(Session {
            user,
            token: AuthToken::new(token),
            subscription,
        }))
    }

    /// Replaces the entire session and writes all three slots through.
    /// Nothing of the previous session survives.
    pub async fn login(
        &mut self,
        user: UserProfile,
        token: AuthToken,
        subscription: Option<Subscription>,
    ) -> Result<()> {
        self.store.put(Slot::Token, token.as_str()).await?;
        self.store
            .put(Slot::User, &serde_json::to_string(&user)?)
            .await?;
        match &subscription {
            Some(subscription) => {
                self.store
                    .put(Slot::Subscription, &serde_json::to_string(subscription)?)
                    .await?;
            }
            None => self.store.remove(Slot::Subscription).await?,
        }

        self.session = Some(Session {
            user,
            token,
            subscription,
        });
        Ok(())
    }

    /// Clears the session from memory and storage. Idempotent.
    pub async fn logout(&mut self) -> Result<()> {
        self.store.clear().await?;
        self.session = None;
        Ok(())
    }

    /// Replaces only the user record; token and subscription stay untouched.
    /// Without an authenticated session there is nothing to update.
    pub async fn update_user(&mut self, user: UserProfile) -> Result<()> {
        if self.session.is_none() {
            warn!("Ignoring user update without an authenticated session");
            return Ok(());
        }

        self.store
            .put(Slot::User, &serde_json::to_string(&user)?)
            .await?;
        if let Some(session) = &mut self.session {
            session.user = user;
        }
        Ok(())
    }

    /// Replaces only the subscription snapshot; user and token stay
    /// untouched.
    pub async fn update_subscription(&mut self, subscription: Subscription) -> Result<()> {
        if self.session.is_none() {
            warn!("Ignoring subscription update without an authenticated session");
            return Ok(());
        }

        self.store
            .put(Slot::Subscription, &serde_json::to_string(&subscription)?)
            .await?;
        if let Some(session) = &mut self.session {
            session.subscription = Some(subscription);
        }
        Ok(())
    }

    /// Whether [`Self::hydrate`] has completed
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// The sole authentication predicate: a session exists, meaning both
    /// token and user are present
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// True iff a subscription snapshot is stored and marked active. An
    /// absent snapshot is inactive, not an error.
    pub fn is_subscription_active(&self) -> bool {
        self.subscription().is_some_and(|sub| sub.is_active)
    }

    /// Days left on the trial clock, `0` when no snapshot is stored
    pub fn days_remaining(&self) -> i64 {
        self.subscription().map_or(0, |sub| sub.days_remaining)
    }

    /// Patient ceiling from the snapshot, falling back to the configured
    /// default
    pub fn patient_limit(&self) -> u32 {
        self.subscription()
            .and_then(|sub| sub.patient_limit)
            .unwrap_or(self.limits.default_patient_limit)
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.session.as_ref().map(|session| &session.token)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|session| &session.user)
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.session
            .as_ref()
            .and_then(|session| session.subscription.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PATIENT_LIMIT;
    use crate::model::SubscriptionStatus;
    use crate::model::user::Role;

    fn wendy() -> UserProfile {
        UserProfile {
            id: 1,
            email: "wendy@example.com".to_owned(),
            first_name: "Wendy".to_owned(),
            last_name: "Diaz".to_owned(),
            phone: None,
            role: Role::Nutricionista,
            professional_license: None,
            specialization: Some("clinical".to_owned()),
            clinic_name: None,
            clinic_address: None,
            bio: None,
            is_verified: true,
        }
    }

    fn trial(days_remaining: i64, is_active: bool) -> Subscription {
        Subscription {
            status: SubscriptionStatus::Trial,
            is_active,
            days_remaining,
            patient_limit: Some(3),
            current_plan: None,
            message: None,
        }
    }

    async fn hydrated_store() -> SessionStore {
        let store = CredentialStore::test().await.unwrap();
        let mut session = SessionStore::new(store, Limits::default());
        session.hydrate().await;
        session
    }

    #[tokio::test]
    async fn starts_unhydrated_and_empty() {
        let store = CredentialStore::test().await.unwrap();
        let session = SessionStore::new(store, Limits::default());

        assert!(!session.is_hydrated());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn hydrating_empty_storage_yields_empty_session() {
        let session = hydrated_store().await;

        assert!(session.is_hydrated());
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn token_without_user_is_not_authenticated() {
        let store = CredentialStore::test().await.unwrap();
        store.put(Slot::Token, "tok-123").await.unwrap();

        let mut session = SessionStore::new(store, Limits::default());
        session.hydrate().await;

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn user_without_token_is_not_authenticated() {
        let store = CredentialStore::test().await.unwrap();
        store
            .put(Slot::User, &serde_json::to_string(&wendy()).unwrap())
            .await
            .unwrap();

        let mut session = SessionStore::new(store, Limits::default());
        session.hydrate().await;

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn malformed_user_record_discards_the_session() {
        let store = CredentialStore::test().await.unwrap();
        store.put(Slot::Token, "tok-123").await.unwrap();
        store.put(Slot::User, "not json at all").await.unwrap();

        let mut session = SessionStore::new(store, Limits::default());
        session.hydrate().await;

        assert!(session.is_hydrated());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn malformed_subscription_is_treated_as_absent() {
        let store = CredentialStore::test().await.unwrap();
        store.put(Slot::Token, "tok-123").await.unwrap();
        store
            .put(Slot::User, &serde_json::to_string(&wendy()).unwrap())
            .await
            .unwrap();
        store.put(Slot::Subscription, "{broken").await.unwrap();

        let mut session = SessionStore::new(store, Limits::default());
        session.hydrate().await;

        assert!(session.is_authenticated());
        assert_eq!(session.subscription(), None);
        assert_eq!(session.days_remaining(), 0);
        assert_eq!(session.patient_limit(), DEFAULT_PATIENT_LIMIT);
    }

    #[tokio::test]
    async fn login_then_rehydrate_reproduces_the_session() {
        let store = CredentialStore::test().await.unwrap();
        let mut session = SessionStore::new(store.clone(), Limits::default());
        session.hydrate().await;

        let token = AuthToken::new("tok-123");
        session
            .login(wendy(), token.clone(), Some(trial(12, true)))
            .await
            .unwrap();

        // Simulated reload: a fresh store over the same storage.
        let mut reloaded = SessionStore::new(store, Limits::default());
        reloaded.hydrate().await;

        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user(), Some(&wendy()));
        assert_eq!(reloaded.token(), Some(&token));
        assert_eq!(reloaded.subscription(), Some(&trial(12, true)));
    }

    #[tokio::test]
    async fn login_without_subscription_clears_the_slot() {
        let store = CredentialStore::test().await.unwrap();
        let mut session = SessionStore::new(store.clone(), Limits::default());
        session.hydrate().await;

        session
            .login(wendy(), AuthToken::new("t1"), Some(trial(5, false)))
            .await
            .unwrap();
        session
            .login(wendy(), AuthToken::new("t2"), None)
            .await
            .unwrap();

        // No stale snapshot from the previous login, in memory or on disk.
        assert_eq!(session.subscription(), None);
        assert_eq!(store.get(Slot::Subscription).await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_then_rehydrate_is_empty() {
        let store = CredentialStore::test().await.unwrap();
        let mut session = SessionStore::new(store.clone(), Limits::default());
        session.hydrate().await;

        session
            .login(wendy(), AuthToken::new("tok"), Some(trial(12, true)))
            .await
            .unwrap();
        session.logout().await.unwrap();

        assert!(!session.is_authenticated());

        let mut reloaded = SessionStore::new(store, Limits::default());
        reloaded.hydrate().await;

        assert!(!reloaded.is_authenticated());
        assert_eq!(reloaded.subscription(), None);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let mut session = hydrated_store().await;

        session.logout().await.unwrap();
        session.logout().await.unwrap();

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn update_user_leaves_token_and_subscription_alone() {
        let mut session = hydrated_store().await;

        let token = AuthToken::new("tok");
        session
            .login(wendy(), token.clone(), Some(trial(12, true)))
            .await
            .unwrap();

        let mut renamed = wendy();
        renamed.first_name = "Wendolyn".to_owned();
        session.update_user(renamed.clone()).await.unwrap();

        assert_eq!(session.user(), Some(&renamed));
        assert_eq!(session.token(), Some(&token));
        assert_eq!(session.subscription(), Some(&trial(12, true)));
    }

    #[tokio::test]
    async fn update_subscription_leaves_user_and_token_alone() {
        let mut session = hydrated_store().await;

        let token = AuthToken::new("tok");
        session
            .login(wendy(), token.clone(), Some(trial(12, true)))
            .await
            .unwrap();

        session.update_subscription(trial(3, false)).await.unwrap();

        assert_eq!(session.subscription(), Some(&trial(3, false)));
        assert_eq!(session.user(), Some(&wendy()));
        assert_eq!(session.token(), Some(&token));
    }

    #[tokio::test]
    async fn updates_without_a_session_are_no_ops() {
        let store = CredentialStore::test().await.unwrap();
        let mut session = SessionStore::new(store.clone(), Limits::default());
        session.hydrate().await;

        session.update_user(wendy()).await.unwrap();
        session.update_subscription(trial(1, false)).await.unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(store.get(Slot::User).await.unwrap(), None);
        assert_eq!(store.get(Slot::Subscription).await.unwrap(), None);
    }

    #[tokio::test]
    async fn queries_default_when_subscription_is_absent() {
        let mut session = hydrated_store().await;
        session
            .login(wendy(), AuthToken::new("tok"), None)
            .await
            .unwrap();

        assert!(!session.is_subscription_active());
        assert_eq!(session.days_remaining(), 0);
        assert_eq!(session.patient_limit(), DEFAULT_PATIENT_LIMIT);
    }

    #[tokio::test]
    async fn active_flag_wins_regardless_of_day_count() {
        let mut session = hydrated_store().await;

        session
            .login(wendy(), AuthToken::new("tok"), Some(trial(0, true)))
            .await
            .unwrap();
        assert!(session.is_subscription_active());

        session.update_subscription(trial(-7, true)).await.unwrap();
        assert!(session.is_subscription_active());
    }

    #[tokio::test]
    async fn configured_default_limit_is_honored() {
        let store = CredentialStore::test().await.unwrap();
        let limits = Limits {
            default_patient_limit: 10,
        };
        let mut session = SessionStore::new(store, limits);
        session.hydrate().await;

        session
            .login(wendy(), AuthToken::new("tok"), None)
            .await
            .unwrap();

        assert_eq!(session.patient_limit(), 10);
    }
}

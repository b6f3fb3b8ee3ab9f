use super::*;
use agora_core::ID;
use agora_core::Unique;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;

/// Lifetimes governing sessions and the tokens that reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub session_ttl: Duration,
    pub renewal_window: Duration,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            session_ttl: agora_core::SESSION_TTL,
            renewal_window: agora_core::RENEWAL_WINDOW,
            access_ttl: agora_core::ACCESS_TOKEN_TTL,
            refresh_ttl: agora_core::REFRESH_TOKEN_TTL,
        }
    }
}

/// Access and refresh token minted for one session, with the instants their cookies lapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub access_expires: SystemTime,
    pub refresh_expires: SystemTime,
}

/// Issues, verifies, rotates, and revokes session tokens.
///
/// Every token is a signed reference to a [`Session`] row. The row's expiry is
/// the only one consulted; the token's own `exp` claim only sizes the cookie.
/// Verification never fails loudly: a bad signature, a missing or expired row,
/// or a store outage all come back as `None`.
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn CredentialStore>,
    crypto: Crypto,
    policy: Policy,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn CredentialStore>,
        crypto: Crypto,
        policy: Policy,
    ) -> Self {
        Self {
            sessions,
            users,
            crypto,
            policy,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub async fn issue(&self, user: ID<Member>) -> Result<TokenPair, AuthError> {
        self.issue_at(user, SystemTime::now()).await
    }
    /// Opens one session row for `user` and signs both tokens against it.
    pub async fn issue_at(&self, user: ID<Member>, now: SystemTime) -> Result<TokenPair, AuthError> {
        let session = Session::open(user, now, self.policy.session_ttl);
        self.sessions
            .insert(&session)
            .await
            .inspect_err(|e| log::error!("issue session for {}: {}", user, e))?;
        log::debug!("opened session {} for {}", session.id(), user);
        self.sign(&session, now)
    }

    pub async fn verify(&self, token: &str) -> Option<Member> {
        self.verify_at(token, SystemTime::now()).await
    }
    /// Member behind a valid access token, sliding the session forward when due.
    pub async fn verify_at(&self, token: &str, now: SystemTime) -> Option<Member> {
        self.authenticate(token, now).await.unwrap_or_else(|e| {
            log::error!("verify session: {}", e);
            None
        })
    }

    pub async fn refresh(&self, token: &str) -> Option<TokenPair> {
        self.refresh_at(token, SystemTime::now()).await
    }
    /// Trades a valid refresh token for a pair bound to a brand new session.
    /// The old session is consumed, so replaying its refresh token yields `None`.
    pub async fn refresh_at(&self, token: &str, now: SystemTime) -> Option<TokenPair> {
        self.rotate(token, now).await.unwrap_or_else(|e| {
            log::error!("refresh session: {}", e);
            None
        })
    }

    /// Session id carried by any validly signed token, regardless of its kind or row state.
    pub fn session(&self, token: &str) -> Option<ID<Session>> {
        self.crypto.decode(token).ok().map(|claims| claims.session())
    }

    pub async fn revoke(&self, session: ID<Session>) -> Result<(), StoreError> {
        self.sessions
            .delete(session)
            .await
            .inspect_err(|e| log::error!("revoke session {}: {}", session, e))
            .map(|_| log::debug!("revoked session {}", session))
    }

    pub async fn revoke_all(&self, user: ID<Member>) -> Result<usize, StoreError> {
        self.sessions
            .delete_all(user)
            .await
            .inspect_err(|e| log::error!("revoke sessions of {}: {}", user, e))
            .inspect(|n| log::info!("revoked {} sessions of {}", n, user))
    }

    pub async fn sweep(&self) -> Result<usize, StoreError> {
        self.sweep_at(SystemTime::now()).await
    }
    pub async fn sweep_at(&self, now: SystemTime) -> Result<usize, StoreError> {
        self.sessions
            .sweep(now)
            .await
            .inspect(|n| log::debug!("swept {} expired sessions", n))
    }

    async fn authenticate(&self, token: &str, now: SystemTime) -> Result<Option<Member>, StoreError> {
        let Some(session) = self.resolve(token, Kind::Access, now).await? else {
            return Ok(None);
        };
        if session.renewable(now, self.policy.renewal_window) {
            let renewed = session.clone().renewed(now, self.policy.session_ttl);
            self.sessions.extend(renewed.id(), renewed.expires_at()).await?;
            log::debug!("renewed session {}", renewed.id());
        }
        self.users.find(session.user()).await
    }

    async fn rotate(&self, token: &str, now: SystemTime) -> Result<Option<TokenPair>, AuthError> {
        let Some(session) = self.resolve(token, Kind::Refresh, now).await? else {
            return Ok(None);
        };
        // losing a concurrent rotation race means someone else already consumed it
        if !self.sessions.delete(session.id()).await? {
            return Ok(None);
        }
        self.issue_at(session.user(), now).await.map(Some)
    }

    /// Live session named by a signed token of the expected kind.
    /// An expired row found on the way is deleted.
    async fn resolve(
        &self,
        token: &str,
        kind: Kind,
        now: SystemTime,
    ) -> Result<Option<Session>, StoreError> {
        let Some(claims) = self.crypto.decode(token).ok().filter(|c| c.kind() == kind) else {
            return Ok(None);
        };
        let Some(session) = self.sessions.fetch(claims.session()).await? else {
            return Ok(None);
        };
        if session.user() != claims.user() {
            return Ok(None);
        }
        if session.expired(now) {
            self.sessions.delete(session.id()).await?;
            log::debug!("purged expired session {}", session.id());
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn sign(&self, session: &Session, now: SystemTime) -> Result<TokenPair, AuthError> {
        let access = Claims::new(session, Kind::Access, now, self.policy.access_ttl);
        let refresh = Claims::new(session, Kind::Refresh, now, self.policy.refresh_ttl);
        let encode = |claims: &Claims| {
            self.crypto
                .encode(claims)
                .map_err(|e| AuthError::Internal(e.to_string()))
        };
        Ok(TokenPair {
            access: encode(&access)?,
            refresh: encode(&refresh)?,
            access_expires: now + self.policy.access_ttl,
            refresh_expires: now + self.policy.refresh_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: Duration = Duration::from_secs(1);

    async fn fixture(policy: Policy) -> (Arc<Memory>, SessionManager, Member) {
        let memory = Arc::new(Memory::default());
        let alice = Member::new(ID::default(), "Alice".into(), "alice".into(), Role::Member);
        memory.create(&alice, "unused").await.unwrap();
        let manager = SessionManager::new(
            memory.clone(),
            memory.clone(),
            Crypto::new(b"test-secret"),
            policy,
        );
        (memory, manager, alice)
    }

    #[tokio::test]
    async fn issued_access_token_verifies_to_owner() {
        let (memory, manager, alice) = fixture(Policy::default()).await;
        let tokens = manager.issue(alice.id()).await.unwrap();
        assert_eq!(manager.verify(&tokens.access).await, Some(alice.clone()));
        assert_eq!(memory.sessions_of(alice.id()).await.len(), 1);
    }

    #[tokio::test]
    async fn both_tokens_share_one_session() {
        let (_, manager, alice) = fixture(Policy::default()).await;
        let tokens = manager.issue(alice.id()).await.unwrap();
        assert!(manager.session(&tokens.access).is_some());
        assert_eq!(manager.session(&tokens.access), manager.session(&tokens.refresh));
    }

    #[tokio::test]
    async fn token_kinds_are_not_interchangeable() {
        let (_, manager, alice) = fixture(Policy::default()).await;
        let tokens = manager.issue(alice.id()).await.unwrap();
        assert_eq!(manager.verify(&tokens.refresh).await, None);
        assert_eq!(manager.refresh(&tokens.access).await, None);
    }

    #[tokio::test]
    async fn foreign_signature_is_anonymous() {
        let (memory, manager, alice) = fixture(Policy::default()).await;
        let forger = SessionManager::new(
            memory.clone(),
            memory.clone(),
            Crypto::new(b"other-secret"),
            Policy::default(),
        );
        let forged = forger.issue(alice.id()).await.unwrap();
        assert_eq!(manager.verify(&forged.access).await, None);
        assert_eq!(manager.session(&forged.access), None);
    }

    #[tokio::test]
    async fn persisted_expiry_overrides_token_claim() {
        let policy = Policy {
            session_ttl: Duration::from_secs(60),
            renewal_window: Duration::from_secs(30),
            access_ttl: Duration::from_secs(24 * 3600),
            refresh_ttl: Duration::from_secs(24 * 3600),
        };
        let (memory, manager, alice) = fixture(policy).await;
        let now = SystemTime::now();
        let tokens = manager.issue_at(alice.id(), now).await.unwrap();
        let later = now + Duration::from_secs(60);
        assert_eq!(manager.verify_at(&tokens.access, later).await, None);
        assert!(memory.sessions_of(alice.id()).await.is_empty());
    }

    #[tokio::test]
    async fn renews_inside_window_only() {
        let policy = Policy::default();
        let (memory, manager, alice) = fixture(policy).await;
        let now = SystemTime::now();
        let tokens = manager.issue_at(alice.id(), now).await.unwrap();
        let expiry = now + policy.session_ttl;

        let outside = expiry - policy.renewal_window - EPSILON;
        assert!(manager.verify_at(&tokens.access, outside).await.is_some());
        assert_eq!(memory.sessions_of(alice.id()).await[0].expires_at(), expiry);

        let inside = expiry - EPSILON;
        assert!(manager.verify_at(&tokens.access, inside).await.is_some());
        assert_eq!(
            memory.sessions_of(alice.id()).await[0].expires_at(),
            inside + policy.session_ttl
        );
    }

    #[tokio::test]
    async fn refresh_rotates_and_stale_token_fails_closed() {
        let (memory, manager, alice) = fixture(Policy::default()).await;
        let first = manager.issue(alice.id()).await.unwrap();
        let second = manager.refresh(&first.refresh).await.unwrap();
        assert_ne!(manager.session(&first.refresh), manager.session(&second.refresh));
        assert_eq!(manager.verify(&second.access).await, Some(alice.clone()));
        assert_eq!(manager.refresh(&first.refresh).await, None);
        assert_eq!(manager.verify(&first.access).await, None);
        assert_eq!(memory.sessions_of(alice.id()).await.len(), 1);
    }

    #[tokio::test]
    async fn expired_refresh_token_is_purged() {
        let (memory, manager, alice) = fixture(Policy::default()).await;
        let now = SystemTime::now();
        let tokens = manager.issue_at(alice.id(), now).await.unwrap();
        let later = now + agora_core::SESSION_TTL;
        assert_eq!(manager.refresh_at(&tokens.refresh, later).await, None);
        assert!(memory.sessions_of(alice.id()).await.is_empty());
    }

    #[tokio::test]
    async fn revoke_ends_one_device() {
        let (_, manager, alice) = fixture(Policy::default()).await;
        let phone = manager.issue(alice.id()).await.unwrap();
        let laptop = manager.issue(alice.id()).await.unwrap();
        manager.revoke(manager.session(&phone.access).unwrap()).await.unwrap();
        assert_eq!(manager.verify(&phone.access).await, None);
        assert!(manager.verify(&laptop.access).await.is_some());
    }

    #[tokio::test]
    async fn revoke_all_ends_every_device() {
        let (_, manager, alice) = fixture(Policy::default()).await;
        let phone = manager.issue(alice.id()).await.unwrap();
        let laptop = manager.issue(alice.id()).await.unwrap();
        assert_eq!(manager.revoke_all(alice.id()).await.unwrap(), 2);
        assert_eq!(manager.verify(&phone.access).await, None);
        assert_eq!(manager.verify(&laptop.access).await, None);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_rows() {
        let (memory, manager, alice) = fixture(Policy::default()).await;
        let now = SystemTime::now();
        manager.issue_at(alice.id(), now - agora_core::SESSION_TTL).await.unwrap();
        manager.issue_at(alice.id(), now).await.unwrap();
        assert_eq!(manager.sweep_at(now).await.unwrap(), 1);
        assert_eq!(memory.sessions_of(alice.id()).await.len(), 1);
    }
}

use super::*;
use agora_core::ID;
use agora_core::Unique;
use std::time::Duration;
use std::time::SystemTime;

/// Persisted session for token management.
/// The expiry stored here is the only one that decides whether a token authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: ID<Self>,
    user: ID<Member>,
    expires: SystemTime,
}

impl Unique for Session {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Session {
    pub fn new(id: ID<Self>, user: ID<Member>, expires: SystemTime) -> Self {
        Self { id, user, expires }
    }
    /// Fresh session for `user` lasting `ttl` from `now`.
    pub fn open(user: ID<Member>, now: SystemTime, ttl: Duration) -> Self {
        Self::new(ID::default(), user, now + ttl)
    }
    pub fn user(&self) -> ID<Member> {
        self.user
    }
    pub fn expires_at(&self) -> SystemTime {
        self.expires
    }
    pub fn expired(&self, now: SystemTime) -> bool {
        now >= self.expires
    }
    /// True once `now` has entered the final `window` before expiry.
    pub fn renewable(&self, now: SystemTime, window: Duration) -> bool {
        !self.expired(now) && now + window >= self.expires
    }
    pub fn renewed(self, now: SystemTime, ttl: Duration) -> Self {
        Self {
            expires: now + ttl,
            ..self
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Session {
        fn name() -> &'static str {
            SESSIONS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                SESSIONS,
                " (
                    id          UUID PRIMARY KEY,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    expires_at  TIMESTAMPTZ NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_sessions_user ON ",
                SESSIONS,
                " (user_id);
                 CREATE INDEX IF NOT EXISTS idx_sessions_expires ON ",
                SESSIONS,
                " (expires_at);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(1000);
    const WINDOW: Duration = Duration::from_secs(500);
    const EPSILON: Duration = Duration::from_secs(1);

    fn session(now: SystemTime) -> Session {
        Session::open(ID::default(), now, TTL)
    }

    #[test]
    fn expires_exactly_at_deadline() {
        let now = SystemTime::now();
        let s = session(now);
        assert!(!s.expired(now + TTL - EPSILON));
        assert!(s.expired(now + TTL));
    }

    #[test]
    fn renewable_only_inside_window() {
        let now = SystemTime::now();
        let s = session(now);
        assert!(!s.renewable(now + TTL - WINDOW - EPSILON, WINDOW));
        assert!(s.renewable(now + TTL - WINDOW, WINDOW));
        assert!(s.renewable(now + TTL - EPSILON, WINDOW));
    }

    #[test]
    fn expired_session_is_never_renewable() {
        let now = SystemTime::now();
        let s = session(now);
        assert!(!s.renewable(now + TTL, WINDOW));
        assert!(!s.renewable(now + TTL + WINDOW, WINDOW));
    }

    #[test]
    fn renewal_keeps_identity() {
        let now = SystemTime::now();
        let s = session(now);
        let later = now + TTL - EPSILON;
        let r = s.clone().renewed(later, TTL);
        assert_eq!(r.id(), s.id());
        assert_eq!(r.user(), s.user());
        assert_eq!(r.expires_at(), later + TTL);
    }
}

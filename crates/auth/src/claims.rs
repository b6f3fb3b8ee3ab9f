use super::*;
use agora_core::ID;
use agora_core::Unique;
use std::time::Duration;
use std::time::SystemTime;

/// Which cookie a token was minted for. A refresh token never authenticates a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Access,
    Refresh,
}

/// JWT payload. Only `sid` is trusted, and only after the signature verifies.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sid: uuid::Uuid,
    pub sub: uuid::Uuid,
    pub knd: Kind,
    pub iat: i64,
    pub exp: i64,
    pub jti: uuid::Uuid,
}

impl Claims {
    pub fn new(session: &Session, kind: Kind, now: SystemTime, ttl: Duration) -> Self {
        Self {
            sid: session.id().inner(),
            sub: session.user().inner(),
            knd: kind,
            iat: agora_core::unix(now),
            exp: agora_core::unix(now + ttl),
            jti: uuid::Uuid::now_v7(),
        }
    }
    pub fn session(&self) -> ID<Session> {
        ID::from(self.sid)
    }
    pub fn user(&self) -> ID<Member> {
        ID::from(self.sub)
    }
    pub fn kind(&self) -> Kind {
        self.knd
    }
}

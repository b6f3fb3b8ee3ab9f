use super::*;
use agora_core::ID;
use std::time::SystemTime;

/// Persisted user records.
///
/// Implementations must enforce username uniqueness themselves and report
/// a clash as [`StoreError::Conflict`]; [`exists`](CredentialStore::exists)
/// is only a fast path.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn exists(&self, username: &str) -> Result<bool, StoreError>;
    async fn create(&self, member: &Member, hashword: &str) -> Result<(), StoreError>;
    /// Exact, case-sensitive match. Returns the member and its password hash.
    async fn lookup(&self, username: &str) -> Result<Option<(Member, String)>, StoreError>;
    async fn find(&self, id: ID<Member>) -> Result<Option<Member>, StoreError>;
    /// Overwrites name, username, bio and image of the member with the same id.
    async fn edit(&self, member: &Member) -> Result<(), StoreError>;
    async fn rehash(&self, id: ID<Member>, hashword: &str) -> Result<(), StoreError>;
    /// Case-insensitive substring search on usernames, never returning `except`.
    async fn search(
        &self,
        fragment: &str,
        except: ID<Member>,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError>;
}

/// Persisted session records.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<(), StoreError>;
    async fn fetch(&self, id: ID<Session>) -> Result<Option<Session>, StoreError>;
    async fn extend(&self, id: ID<Session>, expires: SystemTime) -> Result<(), StoreError>;
    /// True when a row was actually removed.
    async fn delete(&self, id: ID<Session>) -> Result<bool, StoreError>;
    async fn delete_all(&self, user: ID<Member>) -> Result<usize, StoreError>;
    /// Removes every session expired at `now`.
    async fn sweep(&self, now: SystemTime) -> Result<usize, StoreError>;
}

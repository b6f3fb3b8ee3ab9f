use super::*;
use agora_core::ID;
use agora_core::Unique;
use std::collections::HashMap;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// In-process credential and session store.
/// Each map sits behind its own lock so one write is atomic like a single-row statement.
#[derive(Default)]
pub struct Memory {
    users: RwLock<HashMap<ID<Member>, (Member, String)>>,
    sessions: RwLock<HashMap<ID<Session>, Session>>,
}

impl Memory {
    pub async fn sessions_of(&self, user: ID<Member>) -> Vec<Session> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.user() == user)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl CredentialStore for Memory {
    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|(m, _)| m.username() == username))
    }

    async fn create(&self, member: &Member, hashword: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|(m, _)| m.username() == member.username() || m.id() == member.id())
        {
            return Err(StoreError::Conflict);
        }
        users.insert(member.id(), (member.clone(), hashword.to_string()));
        Ok(())
    }

    async fn lookup(&self, username: &str) -> Result<Option<(Member, String)>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|(m, _)| m.username() == username)
            .cloned())
    }

    async fn find(&self, id: ID<Member>) -> Result<Option<Member>, StoreError> {
        Ok(self.users.read().await.get(&id).map(|(m, _)| m.clone()))
    }

    async fn edit(&self, member: &Member) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|(m, _)| m.username() == member.username() && m.id() != member.id())
        {
            return Err(StoreError::Conflict);
        }
        users
            .get_mut(&member.id())
            .map(|(m, _)| *m = member.clone().with_role(m.role()))
            .ok_or_else(|| StoreError::Backend(format!("no user {}", member.id())))
    }

    async fn rehash(&self, id: ID<Member>, hashword: &str) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .get_mut(&id)
            .map(|(_, h)| *h = hashword.to_string())
            .ok_or_else(|| StoreError::Backend(format!("no user {}", id)))
    }

    async fn search(
        &self,
        fragment: &str,
        except: ID<Member>,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError> {
        let ref needle = fragment.to_lowercase();
        let mut found = self
            .users
            .read()
            .await
            .values()
            .map(|(m, _)| m)
            .filter(|m| m.id() != except)
            .filter(|m| m.username().to_lowercase().contains(needle))
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by(|a, b| a.username().cmp(b.username()));
        found.truncate(limit);
        Ok(found)
    }
}

#[async_trait::async_trait]
impl SessionStore for Memory {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.contains_key(&session.id()) {
            true => Err(StoreError::Conflict),
            false => {
                sessions.insert(session.id(), session.clone());
                Ok(())
            }
        }
    }

    async fn fetch(&self, id: ID<Session>) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn extend(&self, id: ID<Session>, expires: SystemTime) -> Result<(), StoreError> {
        if let Some(s) = self.sessions.write().await.get_mut(&id) {
            *s = Session::new(s.id(), s.user(), expires);
        }
        Ok(())
    }

    async fn delete(&self, id: ID<Session>) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn delete_all(&self, user: ID<Member>) -> Result<usize, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user() != user);
        Ok(before - sessions.len())
    }

    async fn sweep(&self, now: SystemTime) -> Result<usize, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.expired(now));
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn member(username: &str) -> Member {
        Member::new(ID::default(), "Someone".into(), username.into(), Role::Member)
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = Memory::default();
        store.create(&member("alice"), "h").await.unwrap();
        assert_eq!(store.create(&member("alice"), "h").await, Err(StoreError::Conflict));
        assert!(store.exists("alice").await.unwrap());
        assert!(!store.exists("Alice").await.unwrap());
    }

    #[tokio::test]
    async fn edit_refuses_taken_username() {
        let store = Memory::default();
        let alice = member("alice");
        store.create(&alice, "h").await.unwrap();
        store.create(&member("carol"), "h").await.unwrap();
        let renamed = Member::new(alice.id(), "Alice".into(), "carol".into(), Role::Member);
        assert_eq!(store.edit(&renamed).await, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn search_excludes_caller_and_limits() {
        let store = Memory::default();
        let me = member("alice");
        store.create(&me, "h").await.unwrap();
        for name in ["alicia", "malice", "bobby", "ALICEX"] {
            store.create(&member(name), "h").await.unwrap();
        }
        let found = store.search("ali", me.id(), 2).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.id() != me.id()));
        let all = store.search("ALI", me.id(), 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn sweep_and_delete_all() {
        let store = Memory::default();
        let now = SystemTime::now();
        let user = ID::default();
        let live = Session::open(user, now, Duration::from_secs(60));
        let dead = Session::new(ID::default(), user, now - Duration::from_secs(1));
        let other = Session::open(ID::default(), now, Duration::from_secs(60));
        for s in [&live, &dead, &other] {
            store.insert(s).await.unwrap();
        }
        assert_eq!(store.sweep(now).await.unwrap(), 1);
        assert_eq!(store.delete_all(user).await.unwrap(), 1);
        assert_eq!(store.fetch(other.id()).await.unwrap(), Some(other));
        assert!(!store.delete(live.id()).await.unwrap());
    }
}

use super::*;
use agora_core::ID;
use agora_core::Unique;
use agora_database::*;
use std::time::SystemTime;
use tokio_postgres::Client;
use tokio_postgres::Row;

#[rustfmt::skip]
const MEMBER: &str = const_format::concatcp!(
    "SELECT u.id, u.name, u.username, u.image, u.bio, r.name, u.hashword FROM ", USERS, " u ",
    "LEFT JOIN ", ROLES, " r ON r.id = u.role_id "
);

/// Columns 0..=5 of [`MEMBER`] as a domain member. An unknown role reads as member.
fn member(row: &Row) -> Member {
    let role = row
        .get::<_, Option<String>>(5)
        .and_then(|name| Role::try_from(name.as_str()).ok())
        .unwrap_or_default();
    Member::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
        role,
    )
    .with_profile(row.get::<_, Option<String>>(4), row.get::<_, Option<String>>(3))
}

#[async_trait::async_trait]
impl CredentialStore for Client {
    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!("SELECT 1 FROM ", USERS, " WHERE username = $1"),
                &[&username],
            )
            .await?
            .is_some())
    }

    async fn create(&self, member: &Member, hashword: &str) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (id, username, hashword, name, image, bio, role_id) VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ),
            &[
                &member.id().inner(),
                &member.username(),
                &hashword,
                &member.name(),
                &member.image(),
                &member.bio(),
                &member.role().key(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn lookup(&self, username: &str) -> Result<Option<(Member, String)>, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(MEMBER, "WHERE u.username = $1"),
                &[&username],
            )
            .await?
            .map(|row| (member(&row), row.get::<_, String>(6))))
    }

    async fn find(&self, id: ID<Member>) -> Result<Option<Member>, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(MEMBER, "WHERE u.id = $1"),
                &[&id.inner()],
            )
            .await?
            .map(|row| member(&row)))
    }

    async fn edit(&self, member: &Member) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                USERS,
                " SET name = $2, username = $3, bio = $4, image = $5 WHERE id = $1"
            ),
            &[
                &member.id().inner(),
                &member.name(),
                &member.username(),
                &member.bio(),
                &member.image(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn rehash(&self, id: ID<Member>, hashword: &str) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!("UPDATE ", USERS, " SET hashword = $2 WHERE id = $1"),
            &[&id.inner(), &hashword],
        )
        .await?;
        Ok(())
    }

    async fn search(
        &self,
        fragment: &str,
        except: ID<Member>,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    MEMBER,
                    "WHERE u.id <> $1 AND u.username ILIKE $2 ORDER BY u.username LIMIT $3"
                ),
                &[&except.inner(), &contains(fragment), &(limit as i64)],
            )
            .await?
            .iter()
            .map(member)
            .collect())
    }
}

#[async_trait::async_trait]
impl SessionStore for Client {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                SESSIONS,
                " (id, user_id, expires_at) VALUES ($1, $2, $3)"
            ),
            &[
                &session.id().inner(),
                &session.user().inner(),
                &session.expires_at(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn fetch(&self, id: ID<Session>) -> Result<Option<Session>, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, user_id, expires_at FROM ",
                    SESSIONS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?
            .map(|row| {
                Session::new(
                    ID::from(row.get::<_, uuid::Uuid>(0)),
                    ID::from(row.get::<_, uuid::Uuid>(1)),
                    row.get::<_, SystemTime>(2),
                )
            }))
    }

    async fn extend(&self, id: ID<Session>, expires: SystemTime) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!("UPDATE ", SESSIONS, " SET expires_at = $2 WHERE id = $1"),
            &[&id.inner(), &expires],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: ID<Session>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", SESSIONS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            > 0)
    }

    async fn delete_all(&self, user: ID<Member>) -> Result<usize, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", SESSIONS, " WHERE user_id = $1"),
                &[&user.inner()],
            )
            .await? as usize)
    }

    async fn sweep(&self, now: SystemTime) -> Result<usize, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", SESSIONS, " WHERE expires_at <= $1"),
                &[&now],
            )
            .await? as usize)
    }
}

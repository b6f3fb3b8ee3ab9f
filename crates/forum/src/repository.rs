use super::*;
use agora_auth::Member;
use agora_auth::StoreError;
use agora_core::ID;
use agora_core::Unique;
use agora_database::*;
use std::time::SystemTime;
use tokio_postgres::Client;
use tokio_postgres::Row;

#[rustfmt::skip]
const POST: &str = const_format::concatcp!(
    "SELECT p.id, p.user_id, p.anonymous, p.content, p.group_id, p.created_at, ",
    "COALESCE(array_agg(t.name ORDER BY t.id) FILTER (WHERE t.id IS NOT NULL), '{}') ",
    "FROM ", POSTS, " p ",
    "LEFT JOIN ", TAG_POSTS, " tp ON tp.post_id = p.id ",
    "LEFT JOIN ", TAGS, " t ON t.id = tp.tag_id "
);

#[rustfmt::skip]
const COMMENT: &str = const_format::concatcp!(
    "SELECT id, post_id, parent_id, user_id, text, created_at FROM ", COMMENTS, " "
);

#[rustfmt::skip]
const GROUP: &str = const_format::concatcp!(
    "SELECT g.id, g.name, g.description, g.leader_id FROM ", GROUPS, " g "
);

#[rustfmt::skip]
const NOTIFICATION: &str = const_format::concatcp!(
    "SELECT id, type, is_read, to_user, user_id, post_id, created_at FROM ", NOTIFICATIONS, " "
);

fn post(row: &Row) -> Post {
    Post::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        row.get::<_, bool>(2),
        row.get::<_, String>(3),
        row.get::<_, SystemTime>(5),
    )
    .with_group(row.get::<_, Option<uuid::Uuid>>(4).map(ID::from))
    .with_tags(row.get::<_, Vec<String>>(6))
}

fn comment(row: &Row) -> Comment {
    Comment::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        row.get::<_, Option<uuid::Uuid>>(2).map(ID::from),
        ID::from(row.get::<_, uuid::Uuid>(3)),
        row.get::<_, String>(4),
        row.get::<_, SystemTime>(5),
    )
}

fn group(row: &Row) -> Group {
    Group::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
        ID::from(row.get::<_, uuid::Uuid>(3)),
    )
}

/// Rows with an unrecognized type are skipped.
fn notification(row: &Row) -> Option<Notification> {
    let cause = row.get::<_, String>(1);
    Cause::try_from(cause.as_str())
        .inspect_err(|e| log::warn!("{}", e))
        .ok()
        .map(|cause| {
            Notification::new(
                ID::from(row.get::<_, uuid::Uuid>(0)),
                cause,
                row.get::<_, bool>(2),
                ID::from(row.get::<_, uuid::Uuid>(3)),
                ID::from(row.get::<_, uuid::Uuid>(4)),
                ID::from(row.get::<_, uuid::Uuid>(5)),
                row.get::<_, SystemTime>(6),
            )
        })
}

#[async_trait::async_trait]
impl Board for Client {
    async fn publish(&self, post: &Post) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "WITH p AS (INSERT INTO ",
                POSTS,
                " (id, user_id, anonymous, content, group_id, created_at) VALUES ($1, $2, $3, $4, $5, $6)), ",
                "t AS (INSERT INTO ",
                TAGS,
                " (name) SELECT unnest($7::text[]) ",
                "ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id) ",
                "INSERT INTO ",
                TAG_POSTS,
                " (tag_id, post_id) SELECT id, $1 FROM t"
            ),
            &[
                &post.id().inner(),
                &post.author().inner(),
                &post.anonymous(),
                &post.content(),
                &post.group().map(|g| g.inner()),
                &post.created(),
                &post.tags(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn revise(&self, post: &Post) -> Result<bool, StoreError> {
        Ok(self
            .query_one(
                const_format::concatcp!(
                    "WITH p AS (UPDATE ",
                    POSTS,
                    " SET anonymous = $2, content = $3 WHERE id = $1 RETURNING id), ",
                    "d AS (DELETE FROM ",
                    TAG_POSTS,
                    " tp USING ",
                    TAGS,
                    " x WHERE tp.post_id = $1 AND x.id = tp.tag_id AND NOT (x.name = ANY($4::text[])) ",
                    "AND EXISTS (SELECT 1 FROM p)), ",
                    "t AS (INSERT INTO ",
                    TAGS,
                    " (name) SELECT unnest($4::text[]) WHERE EXISTS (SELECT 1 FROM p) ",
                    "ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id), ",
                    "l AS (INSERT INTO ",
                    TAG_POSTS,
                    " (tag_id, post_id) SELECT id, $1 FROM t ON CONFLICT DO NOTHING) ",
                    "SELECT COUNT(*) FROM p"
                ),
                &[
                    &post.id().inner(),
                    &post.anonymous(),
                    &post.content(),
                    &post.tags(),
                ],
            )
            .await?
            .get::<_, i64>(0)
            > 0)
    }

    async fn post(&self, id: ID<Post>) -> Result<Option<Post>, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(POST, "WHERE p.id = $1 GROUP BY p.id"),
                &[&id.inner()],
            )
            .await?
            .map(|row| post(&row)))
    }

    async fn public(&self, tags: &[i32]) -> Result<Vec<Post>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    POST,
                    "WHERE p.group_id IS NULL AND (cardinality($1::int4[]) = 0 OR EXISTS ",
                    "(SELECT 1 FROM ",
                    TAG_POSTS,
                    " x WHERE x.post_id = p.id AND x.tag_id = ANY($1))) ",
                    "GROUP BY p.id ORDER BY p.created_at DESC, p.id DESC"
                ),
                &[&tags],
            )
            .await?
            .iter()
            .map(post)
            .collect())
    }

    async fn grouped(&self, group: ID<Group>, tags: &[i32]) -> Result<Vec<Post>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    POST,
                    "WHERE p.group_id = $1 AND (cardinality($2::int4[]) = 0 OR EXISTS ",
                    "(SELECT 1 FROM ",
                    TAG_POSTS,
                    " x WHERE x.post_id = p.id AND x.tag_id = ANY($2))) ",
                    "GROUP BY p.id ORDER BY p.created_at DESC, p.id DESC"
                ),
                &[&group.inner(), &tags],
            )
            .await?
            .iter()
            .map(post)
            .collect())
    }

    async fn remove(&self, id: ID<Post>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", POSTS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            > 0)
    }

    async fn report(&self, report: &Report) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                REPORTS,
                " (id, post_id, reason) VALUES ($1, $2, $3)"
            ),
            &[&report.id().inner(), &report.post().inner(), &report.reason()],
        )
        .await?;
        Ok(())
    }

    async fn reports(&self, post: ID<Post>) -> Result<Vec<Report>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    "SELECT id, post_id, reason FROM ",
                    REPORTS,
                    " WHERE post_id = $1 ORDER BY id"
                ),
                &[&post.inner()],
            )
            .await?
            .iter()
            .map(|row| {
                Report::new(
                    ID::from(row.get::<_, uuid::Uuid>(0)),
                    ID::from(row.get::<_, uuid::Uuid>(1)),
                    row.get::<_, String>(2),
                )
            })
            .collect())
    }

    async fn dismiss(&self, post: ID<Post>) -> Result<usize, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", REPORTS, " WHERE post_id = $1"),
                &[&post.inner()],
            )
            .await? as usize)
    }

    async fn notify(&self, notification: &Notification) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                NOTIFICATIONS,
                " (id, type, is_read, to_user, user_id, post_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ),
            &[
                &notification.id().inner(),
                &notification.cause().as_str(),
                &notification.read(),
                &notification.recipient().inner(),
                &notification.sender().inner(),
                &notification.post().inner(),
                &notification.created(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn unread(&self, user: ID<Member>) -> Result<usize, StoreError> {
        Ok(self
            .query_one(
                const_format::concatcp!(
                    "SELECT COUNT(*) FROM ",
                    NOTIFICATIONS,
                    " WHERE to_user = $1 AND NOT is_read"
                ),
                &[&user.inner()],
            )
            .await?
            .get::<_, i64>(0) as usize)
    }

    async fn inbox(&self, user: ID<Member>) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    NOTIFICATION,
                    "WHERE to_user = $1 ORDER BY is_read ASC, created_at DESC"
                ),
                &[&user.inner()],
            )
            .await?
            .iter()
            .filter_map(notification)
            .collect())
    }

    async fn mark(
        &self,
        user: ID<Member>,
        which: Option<ID<Notification>>,
    ) -> Result<usize, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!(
                    "UPDATE ",
                    NOTIFICATIONS,
                    " SET is_read = TRUE WHERE to_user = $1 AND NOT is_read ",
                    "AND ($2::uuid IS NULL OR id = $2)"
                ),
                &[&user.inner(), &which.map(|id| id.inner())],
            )
            .await? as usize)
    }

    async fn tags(
        &self,
        group: Option<ID<Group>>,
        name: Option<&str>,
        cursor: Option<i32>,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    "WITH ranked AS (SELECT t.id, t.name, COUNT(p.id) AS posts FROM ",
                    TAGS,
                    " t JOIN ",
                    TAG_POSTS,
                    " tp ON tp.tag_id = t.id JOIN ",
                    POSTS,
                    " p ON p.id = tp.post_id AND p.group_id IS NOT DISTINCT FROM $1::uuid ",
                    "WHERE ($2::text IS NULL OR t.name LIKE $2) ",
                    "GROUP BY t.id, t.name) ",
                    "SELECT r.id, r.name, r.posts FROM ranked r ",
                    "WHERE $3::int4 IS NULL OR EXISTS (SELECT 1 FROM ranked c WHERE c.id = $3 ",
                    "AND (r.posts < c.posts OR (r.posts = c.posts AND r.id > c.id))) ",
                    "ORDER BY r.posts DESC, r.id ASC LIMIT $4"
                ),
                &[
                    &group.map(|g| g.inner()),
                    &name.map(contains),
                    &cursor,
                    &(limit as i64),
                ],
            )
            .await?
            .iter()
            .map(|row| Tag {
                id: row.get::<_, i32>(0),
                name: row.get::<_, String>(1),
                posts: row.get::<_, i64>(2),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl Threads for Client {
    async fn add_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                COMMENTS,
                " (id, post_id, parent_id, user_id, text, created_at) VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &comment.id().inner(),
                &comment.post().inner(),
                &comment.parent().map(|p| p.inner()),
                &comment.author().inner(),
                &comment.text(),
                &comment.created(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn comment(&self, id: ID<Comment>) -> Result<Option<Comment>, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(COMMENT, "WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            .map(|row| comment(&row)))
    }

    async fn edit_comment(&self, comment: &Comment) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("UPDATE ", COMMENTS, " SET text = $2 WHERE id = $1"),
                &[&comment.id().inner(), &comment.text()],
            )
            .await?
            > 0)
    }

    async fn erase_comment(&self, id: ID<Comment>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", COMMENTS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            > 0)
    }

    async fn comments(
        &self,
        post: ID<Post>,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    COMMENT,
                    "WHERE post_id = $1 AND parent_id IS NULL AND ($2::uuid IS NULL OR id < $2) ",
                    "ORDER BY id DESC LIMIT $3"
                ),
                &[&post.inner(), &before.map(|b| b.inner()), &(limit as i64)],
            )
            .await?
            .iter()
            .map(comment)
            .collect())
    }

    async fn replies(
        &self,
        parent: ID<Comment>,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    COMMENT,
                    "WHERE parent_id = $1 AND ($2::uuid IS NULL OR id < $2) ",
                    "ORDER BY id DESC LIMIT $3"
                ),
                &[&parent.inner(), &before.map(|b| b.inner()), &(limit as i64)],
            )
            .await?
            .iter()
            .map(comment)
            .collect())
    }

    async fn reply_count(&self, parent: ID<Comment>) -> Result<usize, StoreError> {
        Ok(self
            .query_one(
                const_format::concatcp!("SELECT COUNT(*) FROM ", COMMENTS, " WHERE parent_id = $1"),
                &[&parent.inner()],
            )
            .await?
            .get::<_, i64>(0) as usize)
    }
}

#[async_trait::async_trait]
impl Groups for Client {
    async fn found(&self, group: &Group) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "WITH g AS (INSERT INTO ",
                GROUPS,
                " (id, name, description, leader_id) VALUES ($1, $2, $3, $4)) ",
                "INSERT INTO ",
                MEMBERS,
                " (group_id, user_id) VALUES ($1, $4)"
            ),
            &[
                &group.id().inner(),
                &group.name(),
                &group.description(),
                &group.leader().inner(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn group(&self, id: ID<Group>) -> Result<Option<Group>, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(GROUP, "WHERE g.id = $1"),
                &[&id.inner()],
            )
            .await?
            .map(|row| group(&row)))
    }

    async fn rename(&self, group: &Group) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!(
                    "UPDATE ",
                    GROUPS,
                    " SET name = $2, description = $3 WHERE id = $1"
                ),
                &[&group.id().inner(), &group.name(), &group.description()],
            )
            .await?
            > 0)
    }

    async fn disband(&self, id: ID<Group>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!("DELETE FROM ", GROUPS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            > 0)
    }

    async fn groups(
        &self,
        member: Option<ID<Member>>,
        search: Option<&str>,
        before: Option<ID<Group>>,
        limit: usize,
    ) -> Result<Vec<Group>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    GROUP,
                    "WHERE ($1::uuid IS NULL OR EXISTS (SELECT 1 FROM ",
                    MEMBERS,
                    " m WHERE m.group_id = g.id AND m.user_id = $1)) ",
                    "AND ($2::text IS NULL OR g.name ILIKE $2) ",
                    "AND ($3::uuid IS NULL OR g.id < $3) ",
                    "ORDER BY g.id DESC LIMIT $4"
                ),
                &[
                    &member.map(|m| m.inner()),
                    &search.map(contains),
                    &before.map(|b| b.inner()),
                    &(limit as i64),
                ],
            )
            .await?
            .iter()
            .map(group)
            .collect())
    }

    async fn members(&self, group: ID<Group>) -> Result<Vec<ID<Member>>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    "SELECT user_id FROM ",
                    MEMBERS,
                    " WHERE group_id = $1 ORDER BY joined_at, user_id"
                ),
                &[&group.inner()],
            )
            .await?
            .iter()
            .map(|row| ID::from(row.get::<_, uuid::Uuid>(0)))
            .collect())
    }

    async fn is_member(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        Ok(self
            .query_opt(
                const_format::concatcp!(
                    "SELECT 1 FROM ",
                    MEMBERS,
                    " WHERE group_id = $1 AND user_id = $2"
                ),
                &[&group.inner(), &user.inner()],
            )
            .await?
            .is_some())
    }

    async fn join(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    MEMBERS,
                    " (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
                ),
                &[&group.inner(), &user.inner()],
            )
            .await?
            > 0)
    }

    async fn invite(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    INVITATIONS,
                    " (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
                ),
                &[&group.inner(), &user.inner()],
            )
            .await?
            > 0)
    }

    async fn uninvite(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError> {
        Ok(self
            .execute(
                const_format::concatcp!(
                    "DELETE FROM ",
                    INVITATIONS,
                    " WHERE group_id = $1 AND user_id = $2"
                ),
                &[&group.inner(), &user.inner()],
            )
            .await?
            > 0)
    }

    async fn invitations(&self, user: ID<Member>) -> Result<Vec<Group>, StoreError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    GROUP,
                    "JOIN ",
                    INVITATIONS,
                    " i ON i.group_id = g.id WHERE i.user_id = $1 ORDER BY g.id DESC"
                ),
                &[&user.inner()],
            )
            .await?
            .iter()
            .map(group)
            .collect())
    }
}

use super::*;
use agora_auth::Member;
use agora_auth::StoreError;
use agora_core::ID;

/// Persisted forum content.
#[async_trait::async_trait]
pub trait Board: Threads + Groups + Send + Sync {
    /// Stores the post and links its tags, creating unknown tag names.
    async fn publish(&self, post: &Post) -> Result<(), StoreError>;
    /// Replaces content, anonymity and tag links of an existing post.
    async fn revise(&self, post: &Post) -> Result<bool, StoreError>;
    async fn post(&self, id: ID<Post>) -> Result<Option<Post>, StoreError>;
    /// Public posts, newest first. A non-empty `tags` keeps posts carrying any of those tag ids.
    async fn public(&self, tags: &[i32]) -> Result<Vec<Post>, StoreError>;
    /// Posts of one group, filtered and ordered like [`Board::public`].
    async fn grouped(&self, group: ID<Group>, tags: &[i32]) -> Result<Vec<Post>, StoreError>;
    /// Removes the post along with its comments, reports, tag links and notifications.
    async fn remove(&self, id: ID<Post>) -> Result<bool, StoreError>;

    async fn report(&self, report: &Report) -> Result<(), StoreError>;
    async fn reports(&self, post: ID<Post>) -> Result<Vec<Report>, StoreError>;
    async fn dismiss(&self, post: ID<Post>) -> Result<usize, StoreError>;

    async fn notify(&self, notification: &Notification) -> Result<(), StoreError>;
    async fn unread(&self, user: ID<Member>) -> Result<usize, StoreError>;
    /// Unread first, then newest first.
    async fn inbox(&self, user: ID<Member>) -> Result<Vec<Notification>, StoreError>;
    /// Marks one or, with `None`, every unread notification of `user` as read.
    async fn mark(
        &self,
        user: ID<Member>,
        which: Option<ID<Notification>>,
    ) -> Result<usize, StoreError>;

    /// Tags on the posts of `group` (public posts for `None`) in ranked order,
    /// strictly after `cursor`, at most `limit`. A cursor outside that
    /// ranking yields nothing.
    async fn tags(
        &self,
        group: Option<ID<Group>>,
        name: Option<&str>,
        cursor: Option<i32>,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError>;
}

/// Comments and their replies.
#[async_trait::async_trait]
pub trait Threads: Send + Sync {
    async fn add_comment(&self, comment: &Comment) -> Result<(), StoreError>;
    async fn comment(&self, id: ID<Comment>) -> Result<Option<Comment>, StoreError>;
    async fn edit_comment(&self, comment: &Comment) -> Result<bool, StoreError>;
    /// Removes the comment and, for a top-level one, all its replies.
    async fn erase_comment(&self, id: ID<Comment>) -> Result<bool, StoreError>;
    /// Top-level comments of a post, newest first, older than `before`.
    async fn comments(
        &self,
        post: ID<Post>,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError>;
    /// Replies to a comment, newest first, older than `before`.
    async fn replies(
        &self,
        parent: ID<Comment>,
        before: Option<ID<Comment>>,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError>;
    async fn reply_count(&self, parent: ID<Comment>) -> Result<usize, StoreError>;
}

/// Groups, memberships and pending invitations.
#[async_trait::async_trait]
pub trait Groups: Send + Sync {
    /// Stores the group with its leader as first member.
    async fn found(&self, group: &Group) -> Result<(), StoreError>;
    async fn group(&self, id: ID<Group>) -> Result<Option<Group>, StoreError>;
    async fn rename(&self, group: &Group) -> Result<bool, StoreError>;
    /// Removes the group with its posts, memberships and invitations.
    async fn disband(&self, id: ID<Group>) -> Result<bool, StoreError>;
    /// Newest first, older than `before`. `member` keeps the groups that user
    /// belongs to; `search` matches names case-insensitively.
    async fn groups(
        &self,
        member: Option<ID<Member>>,
        search: Option<&str>,
        before: Option<ID<Group>>,
        limit: usize,
    ) -> Result<Vec<Group>, StoreError>;

    /// Members in joining order.
    async fn members(&self, group: ID<Group>) -> Result<Vec<ID<Member>>, StoreError>;
    async fn is_member(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError>;
    /// False when `user` already belongs to the group.
    async fn join(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError>;

    /// False when the invitation already exists.
    async fn invite(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError>;
    /// False when there was no such invitation.
    async fn uninvite(&self, group: ID<Group>, user: ID<Member>) -> Result<bool, StoreError>;
    async fn invitations(&self, user: ID<Member>) -> Result<Vec<Group>, StoreError>;
}

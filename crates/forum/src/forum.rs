use super::*;
use agora_auth::CredentialStore;
use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

/// Display name attached to a post or notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Byline {
    pub name: String,
    pub username: String,
    pub image: Option<String>,
}

impl Byline {
    pub fn anonymous() -> Self {
        Self {
            name: "Anonymous".to_string(),
            username: "@0x0".to_string(),
            image: None,
        }
    }
}

impl From<&Member> for Byline {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name().to_string(),
            username: member.username().to_string(),
            image: member.image().map(String::from),
        }
    }
}

/// A post as shown to readers. Exactly one of `user` and `anonymous` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: uuid::Uuid,
    pub content: String,
    pub created_at: i64,
    pub user: Option<Byline>,
    pub anonymous: Option<Byline>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub id: uuid::Uuid,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: uuid::Uuid,
    #[serde(rename = "type")]
    pub cause: Cause,
    pub post_id: uuid::Uuid,
    pub is_read: bool,
    pub user: Byline,
    pub created_at: i64,
}

/// Forum operations over a [`Board`], resolving bylines through the credential store.
pub struct Forum {
    pub(crate) board: Arc<dyn Board>,
    pub(crate) users: Arc<dyn CredentialStore>,
}

impl Forum {
    pub fn new(board: Arc<dyn Board>, users: Arc<dyn CredentialStore>) -> Self {
        Self { board, users }
    }

    pub async fn discussions(&self, tags: &[i32]) -> Result<Vec<PostView>, ForumError> {
        self.views(self.board.public(tags).await?).await
    }

    /// Anyone may read a public post. Group posts are for members only.
    pub async fn detail(
        &self,
        viewer: Option<&Member>,
        id: ID<Post>,
    ) -> Result<PostView, ForumError> {
        let post = self.board.post(id).await?.ok_or(ForumError::NotFound)?;
        self.admit(viewer, &post).await?;
        self.view(post).await?.ok_or(ForumError::NotFound)
    }

    /// Publishes a public post and notifies every member it mentions, except the author.
    pub async fn create(&self, author: &Member, draft: Draft) -> Result<PostView, ForumError> {
        self.publish(author, draft, None).await
    }

    /// Author-only rewrite of content, tags and anonymity.
    /// Members first mentioned by the new content are notified.
    pub async fn edit(
        &self,
        caller: &Member,
        id: ID<Post>,
        draft: Draft,
    ) -> Result<PostView, ForumError> {
        content(&draft.content)?;
        let post = self.board.post(id).await?.ok_or(ForumError::NotFound)?;
        if post.author() != caller.id() {
            return Err(ForumError::NotOwner);
        }
        let before = post
            .mentions()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let revised = post.revised(draft.is_anonymous, draft.content, draft.tags);
        if !self.board.revise(&revised).await? {
            return Err(ForumError::NotFound);
        }
        let fresh = revised
            .mentions()
            .into_iter()
            .filter(|name| !before.iter().any(|b| b.as_str() == *name))
            .collect::<Vec<_>>();
        self.mention(caller, &revised, fresh, &[]).await?;
        log::info!("member {} edited post {}", caller.id(), id);
        self.view(revised).await?.ok_or(ForumError::NotFound)
    }

    pub async fn delete(&self, caller: &Member, id: ID<Post>) -> Result<(), ForumError> {
        let post = self.board.post(id).await?.ok_or(ForumError::NotFound)?;
        if post.author() != caller.id() {
            return Err(ForumError::NotOwner);
        }
        self.board.remove(id).await?;
        log::info!("member {} deleted post {}", caller.id(), id);
        Ok(())
    }

    /// Files a report and tells the author, without naming the reporter.
    pub async fn report(
        &self,
        reporter: &Member,
        id: ID<Post>,
        reason: Option<String>,
    ) -> Result<(), ForumError> {
        let post = self.board.post(id).await?.ok_or(ForumError::NotFound)?;
        self.board.report(&Report::file(id, reason)).await?;
        if post.author() != reporter.id() {
            let notice = Notification::unread(Cause::Report, post.author(), reporter.id(), id);
            self.board.notify(&notice).await?;
        }
        log::info!("post {} reported", id);
        Ok(())
    }

    pub async fn reports(&self, id: ID<Post>) -> Result<Vec<ReportView>, ForumError> {
        Ok(self
            .board
            .reports(id)
            .await?
            .into_iter()
            .map(|r| ReportView {
                id: r.id().inner(),
                message: r.reason().to_string(),
            })
            .collect())
    }

    /// Clears every report on a post, keeping the post.
    pub async fn safe(&self, moderator: &Member, id: ID<Post>) -> Result<usize, ForumError> {
        let cleared = self.board.dismiss(id).await?;
        log::info!("moderator {} cleared {} reports on {}", moderator.id(), cleared, id);
        Ok(cleared)
    }

    pub async fn take_down(&self, moderator: &Member, id: ID<Post>) -> Result<(), ForumError> {
        match self.board.remove(id).await? {
            true => {
                log::info!("moderator {} took down post {}", moderator.id(), id);
                Ok(())
            }
            false => Err(ForumError::NotFound),
        }
    }

    pub async fn unread(&self, user: &Member) -> Result<usize, ForumError> {
        Ok(self.board.unread(user.id()).await?)
    }

    /// Every stored notification of `user`, so the list agrees with [`Forum::unread`].
    /// Senders that are hidden or no longer resolve appear as [`Byline::anonymous`].
    pub async fn inbox(&self, user: &Member) -> Result<Vec<NotificationView>, ForumError> {
        let mut views = Vec::new();
        for notice in self.board.inbox(user.id()).await? {
            let hidden = match notice.cause() {
                Cause::Report => true,
                _ => self
                    .board
                    .post(notice.post())
                    .await?
                    .is_some_and(|p| p.anonymous() && p.author() == notice.sender()),
            };
            let byline = match hidden {
                true => Byline::anonymous(),
                false => self.byline(notice.sender()).await?,
            };
            views.push(NotificationView {
                id: notice.id().inner(),
                cause: notice.cause(),
                post_id: notice.post().inner(),
                is_read: notice.read(),
                user: byline,
                created_at: agora_core::unix(notice.created()),
            });
        }
        Ok(views)
    }

    pub async fn mark(
        &self,
        user: &Member,
        which: Option<ID<Notification>>,
    ) -> Result<usize, ForumError> {
        Ok(self.board.mark(user.id(), which).await?)
    }

    pub async fn tags(
        &self,
        name: Option<&str>,
        cursor: Option<i32>,
    ) -> Result<TagPage, ForumError> {
        self.tag_page(None, name, cursor).await
    }

    pub(crate) async fn tag_page(
        &self,
        group: Option<ID<Group>>,
        name: Option<&str>,
        cursor: Option<i32>,
    ) -> Result<TagPage, ForumError> {
        let size = agora_core::TAG_PAGE;
        let rows = self.board.tags(group, name, cursor, size + 1).await?;
        Ok(TagPage::cut(rows, size))
    }

    pub(crate) async fn publish(
        &self,
        author: &Member,
        draft: Draft,
        group: Option<ID<Group>>,
    ) -> Result<PostView, ForumError> {
        content(&draft.content)?;
        let post = Post::new(
            ID::default(),
            author.id(),
            draft.is_anonymous,
            draft.content,
            SystemTime::now(),
        )
        .with_group(group)
        .with_tags(draft.tags);
        self.board.publish(&post).await?;
        self.mention(author, &post, post.mentions(), &[]).await?;
        log::info!("member {} published post {}", author.id(), post.id());
        self.view(post).await?.ok_or(ForumError::NotFound)
    }

    /// Sends a mention notice about `post` to each named member other than
    /// `sender` and those in `skip`. In a group only members are notified.
    pub(crate) async fn mention(
        &self,
        sender: &Member,
        post: &Post,
        names: Vec<&str>,
        skip: &[ID<Member>],
    ) -> Result<usize, ForumError> {
        let mut sent = 0;
        for username in names {
            let Some((member, _)) = self.users.lookup(username).await? else {
                continue;
            };
            if member.id() == sender.id() || skip.contains(&member.id()) {
                continue;
            }
            if let Some(group) = post.group() {
                if !self.board.is_member(group, member.id()).await? {
                    continue;
                }
            }
            let notice = Notification::unread(Cause::Mention, member.id(), sender.id(), post.id());
            self.board.notify(&notice).await?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Public posts are open to all. A group post needs a signed-in member:
    /// anonymous viewers get `NotFound`, outsiders `NotMember`.
    pub(crate) async fn admit(
        &self,
        viewer: Option<&Member>,
        post: &Post,
    ) -> Result<(), ForumError> {
        let Some(group) = post.group() else {
            return Ok(());
        };
        let viewer = viewer.ok_or(ForumError::NotFound)?;
        match self.board.is_member(group, viewer.id()).await? {
            true => Ok(()),
            false => Err(ForumError::NotMember),
        }
    }

    pub(crate) async fn byline(&self, user: ID<Member>) -> Result<Byline, ForumError> {
        Ok(self
            .users
            .find(user)
            .await?
            .as_ref()
            .map(Byline::from)
            .unwrap_or_else(Byline::anonymous))
    }

    pub(crate) async fn views(&self, posts: Vec<Post>) -> Result<Vec<PostView>, ForumError> {
        let mut views = Vec::new();
        for post in posts {
            views.extend(self.view(post).await?);
        }
        Ok(views)
    }

    /// `None` when the author no longer exists.
    async fn view(&self, post: Post) -> Result<Option<PostView>, ForumError> {
        let Some(author) = self.users.find(post.author()).await? else {
            return Ok(None);
        };
        let (user, anonymous) = match post.anonymous() {
            true => (None, Some(Byline::anonymous())),
            false => (Some(Byline::from(&author)), None),
        };
        Ok(Some(PostView {
            id: post.id().inner(),
            content: post.content().to_string(),
            created_at: agora_core::unix(post.created()),
            user,
            anonymous,
            tags: post.tags().to_vec(),
        }))
    }
}

/// Length check shared by posts, comments and replies.
pub(crate) fn text(field: &'static str, value: &str) -> Result<(), ForumError> {
    match agora_auth::validation::bounded(
        field,
        value,
        agora_core::CONTENT_MIN,
        agora_core::CONTENT_MAX,
    ) {
        Some(error) => Err(ForumError::Invalid(vec![error])),
        None => Ok(()),
    }
}

fn content(value: &str) -> Result<(), ForumError> {
    text("content", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_auth::Role;

    struct Fixture {
        forum: Forum,
        board: Arc<Memory>,
        alice: Member,
        bob: Member,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(agora_auth::Memory::default());
        let board = Arc::new(Memory::default());
        let alice = Member::new(ID::default(), "Alice".into(), "alice".into(), Role::Member);
        let bob = Member::new(ID::default(), "Bobby".into(), "bobby".into(), Role::Member);
        users.create(&alice, "h").await.unwrap();
        users.create(&bob, "h").await.unwrap();
        let forum = Forum::new(board.clone(), users);
        Fixture {
            forum,
            board,
            alice,
            bob,
        }
    }

    fn draft(content: &str, anonymous: bool) -> Draft {
        Draft {
            content: content.into(),
            tags: vec!["rust".into()],
            is_anonymous: anonymous,
        }
    }

    #[tokio::test]
    async fn content_length_is_enforced() {
        let f = fixture().await;
        let empty = f.forum.create(&f.alice, draft("", false)).await;
        assert!(matches!(empty, Err(ForumError::Invalid(_))));
        let long = f.forum.create(&f.alice, draft(&"x".repeat(256), false)).await;
        assert!(matches!(long, Err(ForumError::Invalid(_))));
    }

    #[tokio::test]
    async fn anonymous_posts_hide_the_author() {
        let f = fixture().await;
        let view = f.forum.create(&f.alice, draft("secret", true)).await.unwrap();
        assert_eq!(view.user, None);
        assert_eq!(view.anonymous, Some(Byline::anonymous()));
        let listed = f.forum.discussions(&[]).await.unwrap();
        assert_eq!(listed, vec![view]);
    }

    #[tokio::test]
    async fn mentions_notify_others_but_not_self() {
        let f = fixture().await;
        f.forum
            .create(&f.alice, draft("hi @bobby and @alice and @nobody", false))
            .await
            .unwrap();
        assert_eq!(f.forum.unread(&f.bob).await.unwrap(), 1);
        assert_eq!(f.forum.unread(&f.alice).await.unwrap(), 0);
        let inbox = f.forum.inbox(&f.bob).await.unwrap();
        assert_eq!(inbox[0].cause, Cause::Mention);
        assert_eq!(inbox[0].user.username, "alice");
    }

    #[tokio::test]
    async fn anonymous_mentions_stay_anonymous() {
        let f = fixture().await;
        f.forum.create(&f.alice, draft("psst @bobby", true)).await.unwrap();
        let inbox = f.forum.inbox(&f.bob).await.unwrap();
        assert_eq!(inbox[0].user, Byline::anonymous());
    }

    #[tokio::test]
    async fn only_the_author_deletes() {
        let f = fixture().await;
        let view = f.forum.create(&f.alice, draft("mine", false)).await.unwrap();
        let id = ID::from(view.id);
        assert_eq!(f.forum.delete(&f.bob, id).await, Err(ForumError::NotOwner));
        assert_eq!(f.forum.delete(&f.alice, id).await, Ok(()));
        assert_eq!(f.forum.detail(None, id).await, Err(ForumError::NotFound));
    }

    #[tokio::test]
    async fn moderation_flow() {
        let f = fixture().await;
        let view = f.forum.create(&f.alice, draft("spam", false)).await.unwrap();
        let id = ID::from(view.id);
        f.forum.report(&f.bob, id, None).await.unwrap();
        f.forum.report(&f.bob, id, Some("rude".into())).await.unwrap();
        let reasons = f.forum.reports(id).await.unwrap();
        assert_eq!(
            reasons.iter().map(|r| r.message.as_str()).collect::<Vec<_>>(),
            ["-", "rude"]
        );
        let inbox = f.forum.inbox(&f.alice).await.unwrap();
        assert!(inbox.iter().all(|n| n.user == Byline::anonymous()));
        assert_eq!(f.forum.safe(&f.bob, id).await.unwrap(), 2);
        assert!(f.forum.reports(id).await.unwrap().is_empty());
        f.forum.take_down(&f.bob, id).await.unwrap();
        assert_eq!(f.forum.take_down(&f.bob, id).await, Err(ForumError::NotFound));
    }

    #[tokio::test]
    async fn reporting_missing_post_is_not_found() {
        let f = fixture().await;
        assert_eq!(
            f.forum.report(&f.bob, ID::default(), None).await,
            Err(ForumError::NotFound)
        );
    }

    #[tokio::test]
    async fn tag_pages_continue_from_cursor() {
        let f = fixture().await;
        for i in 0..12 {
            let d = Draft {
                content: format!("post {}", i),
                tags: vec![format!("tag{}", i)],
                is_anonymous: false,
            };
            f.forum.create(&f.alice, d).await.unwrap();
        }
        let first = f.forum.tags(None, None).await.unwrap();
        assert_eq!(first.tags.len(), 10);
        assert!(first.has_next_page);
        let second = f.forum.tags(None, first.next_cursor).await.unwrap();
        assert_eq!(second.tags.len(), 2);
        assert!(!second.has_next_page);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn only_the_author_edits() {
        let f = fixture().await;
        let view = f.forum.create(&f.alice, draft("first", false)).await.unwrap();
        let id = ID::from(view.id);
        let change = Draft {
            content: "second @bobby".into(),
            tags: vec!["web".into()],
            is_anonymous: true,
        };
        assert_eq!(f.forum.edit(&f.bob, id, change.clone()).await, Err(ForumError::NotOwner));
        let edited = f.forum.edit(&f.alice, id, change.clone()).await.unwrap();
        assert_eq!(edited.id, view.id);
        assert_eq!(edited.content, "second @bobby");
        assert_eq!(edited.tags, ["web"]);
        assert_eq!(edited.anonymous, Some(Byline::anonymous()));
        assert_eq!(f.forum.detail(None, id).await, Ok(edited));
        assert_eq!(f.forum.unread(&f.bob).await.unwrap(), 1);
        f.forum.edit(&f.alice, id, change).await.unwrap();
        assert_eq!(f.forum.unread(&f.bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn edits_are_validated_and_need_a_post() {
        let f = fixture().await;
        let view = f.forum.create(&f.alice, draft("first", false)).await.unwrap();
        let empty = f.forum.edit(&f.alice, ID::from(view.id), draft("", false)).await;
        assert!(matches!(empty, Err(ForumError::Invalid(_))));
        let missing = f.forum.edit(&f.alice, ID::default(), draft("x", false)).await;
        assert_eq!(missing, Err(ForumError::NotFound));
    }

    #[tokio::test]
    async fn unresolved_senders_are_listed_anonymously() {
        let f = fixture().await;
        let view = f.forum.create(&f.alice, draft("hello", false)).await.unwrap();
        let stranger = Notification::unread(Cause::Comment, f.alice.id(), ID::default(), ID::from(view.id));
        f.board.notify(&stranger).await.unwrap();
        let inbox = f.forum.inbox(&f.alice).await.unwrap();
        assert_eq!(inbox.len(), f.forum.unread(&f.alice).await.unwrap());
        assert_eq!(inbox[0].user, Byline::anonymous());
    }
}

use super::*;
use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: uuid::Uuid,
    pub text: String,
    pub post_id: uuid::Uuid,
    pub user: Byline,
    pub created_at: i64,
    pub replies: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: uuid::Uuid,
    pub text: String,
    pub comment_id: uuid::Uuid,
    pub user: Byline,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub next_cursor: Option<uuid::Uuid>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPage {
    pub replies: Vec<ReplyView>,
    pub next_cursor: Option<uuid::Uuid>,
    pub has_next_page: bool,
}

/// Splits `size + 1` rows into a page and its continuation cursor.
fn cut(mut rows: Vec<Comment>, size: usize) -> (Vec<Comment>, Option<uuid::Uuid>) {
    let more = rows.len() > size;
    rows.truncate(size);
    let next = more.then(|| rows.last().map(|c| c.id().inner())).flatten();
    (rows, next)
}

impl Forum {
    pub async fn comments(
        &self,
        viewer: &Member,
        post: ID<Post>,
        cursor: Option<ID<Comment>>,
    ) -> Result<CommentPage, ForumError> {
        let target = self.board.post(post).await?.ok_or(ForumError::NotFound)?;
        self.admit(Some(viewer), &target).await?;
        let size = agora_core::COMMENT_PAGE;
        let (rows, next_cursor) = cut(self.board.comments(post, cursor, size + 1).await?, size);
        let mut comments = Vec::with_capacity(rows.len());
        for comment in rows {
            comments.push(self.comment_view(comment).await?);
        }
        Ok(CommentPage {
            has_next_page: next_cursor.is_some(),
            next_cursor,
            comments,
        })
    }

    pub async fn replies(
        &self,
        viewer: &Member,
        parent: ID<Comment>,
        cursor: Option<ID<Comment>>,
    ) -> Result<ReplyPage, ForumError> {
        let parent = self.root(parent).await?;
        self.thread_post(Some(viewer), &parent).await?;
        let size = agora_core::COMMENT_PAGE;
        let rows = self.board.replies(parent.id(), cursor, size + 1).await?;
        let (rows, next_cursor) = cut(rows, size);
        let mut replies = Vec::with_capacity(rows.len());
        for reply in rows {
            replies.push(self.reply_view(reply).await?);
        }
        Ok(ReplyPage {
            has_next_page: next_cursor.is_some(),
            next_cursor,
            replies,
        })
    }

    /// Comments on a post, telling its author and any mentioned members.
    pub async fn comment(
        &self,
        author: &Member,
        post: ID<Post>,
        body: String,
    ) -> Result<CommentView, ForumError> {
        text("text", &body)?;
        let target = self.board.post(post).await?.ok_or(ForumError::NotFound)?;
        self.admit(Some(author), &target).await?;
        let comment = Comment::on(post, author.id(), body);
        self.board.add_comment(&comment).await?;
        if target.author() != author.id() {
            let notice = Notification::unread(Cause::Comment, target.author(), author.id(), post);
            self.board.notify(&notice).await?;
        }
        self.mention(author, &target, comment.mentions(), &[target.author()])
            .await?;
        log::info!("member {} commented on post {}", author.id(), post);
        self.comment_view(comment).await
    }

    /// Replies to a comment, telling its author and any mentioned members.
    pub async fn reply(
        &self,
        author: &Member,
        parent: ID<Comment>,
        body: String,
    ) -> Result<ReplyView, ForumError> {
        text("text", &body)?;
        let parent = self.root(parent).await?;
        let target = self.thread_post(Some(author), &parent).await?;
        let reply = Comment::reply(&parent, author.id(), body);
        self.board.add_comment(&reply).await?;
        if parent.author() != author.id() {
            let notice =
                Notification::unread(Cause::Reply, parent.author(), author.id(), target.id());
            self.board.notify(&notice).await?;
        }
        self.mention(author, &target, reply.mentions(), &[parent.author()])
            .await?;
        log::info!("member {} replied to comment {}", author.id(), parent.id());
        self.reply_view(reply).await
    }

    pub async fn edit_comment(
        &self,
        caller: &Member,
        id: ID<Comment>,
        body: String,
    ) -> Result<CommentView, ForumError> {
        let comment = self.amend(caller, id, body, false).await?;
        self.comment_view(comment).await
    }

    pub async fn edit_reply(
        &self,
        caller: &Member,
        id: ID<Comment>,
        body: String,
    ) -> Result<ReplyView, ForumError> {
        let reply = self.amend(caller, id, body, true).await?;
        self.reply_view(reply).await
    }

    /// Also removes every reply to the comment.
    pub async fn delete_comment(&self, caller: &Member, id: ID<Comment>) -> Result<(), ForumError> {
        self.erase(caller, id, false).await
    }

    pub async fn delete_reply(&self, caller: &Member, id: ID<Comment>) -> Result<(), ForumError> {
        self.erase(caller, id, true).await
    }

    /// Author-only text change. Members first mentioned by the new text are notified.
    async fn amend(
        &self,
        caller: &Member,
        id: ID<Comment>,
        body: String,
        reply: bool,
    ) -> Result<Comment, ForumError> {
        text("text", &body)?;
        let comment = self.owned(caller, id, reply).await?;
        let target = self.thread_post(Some(caller), &comment).await?;
        let before = comment
            .mentions()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let revised = comment.revised(body);
        if !self.board.edit_comment(&revised).await? {
            return Err(ForumError::NotFound);
        }
        let fresh = revised
            .mentions()
            .into_iter()
            .filter(|name| !before.iter().any(|b| b.as_str() == *name))
            .collect::<Vec<_>>();
        self.mention(caller, &target, fresh, &[]).await?;
        Ok(revised)
    }

    async fn erase(&self, caller: &Member, id: ID<Comment>, reply: bool) -> Result<(), ForumError> {
        self.owned(caller, id, reply).await?;
        match self.board.erase_comment(id).await? {
            true => {
                log::info!("member {} deleted comment {}", caller.id(), id);
                Ok(())
            }
            false => Err(ForumError::NotFound),
        }
    }

    /// The comment if it is of the requested kind and `caller` wrote it.
    async fn owned(
        &self,
        caller: &Member,
        id: ID<Comment>,
        reply: bool,
    ) -> Result<Comment, ForumError> {
        let comment = self
            .board
            .comment(id)
            .await?
            .filter(|c| c.is_reply() == reply)
            .ok_or(ForumError::NotFound)?;
        match comment.author() == caller.id() {
            true => Ok(comment),
            false => Err(ForumError::NotOwner),
        }
    }

    /// A top-level comment; replies are not valid parents of a listing.
    async fn root(&self, id: ID<Comment>) -> Result<Comment, ForumError> {
        self.board
            .comment(id)
            .await?
            .filter(|c| !c.is_reply())
            .ok_or(ForumError::NotFound)
    }

    async fn thread_post(
        &self,
        viewer: Option<&Member>,
        comment: &Comment,
    ) -> Result<Post, ForumError> {
        let post = self
            .board
            .post(comment.post())
            .await?
            .ok_or(ForumError::NotFound)?;
        self.admit(viewer, &post).await?;
        Ok(post)
    }

    async fn comment_view(&self, comment: Comment) -> Result<CommentView, ForumError> {
        Ok(CommentView {
            id: comment.id().inner(),
            post_id: comment.post().inner(),
            user: self.byline(comment.author()).await?,
            created_at: agora_core::unix(comment.created()),
            replies: self.board.reply_count(comment.id()).await?,
            text: comment.text().to_string(),
        })
    }

    async fn reply_view(&self, reply: Comment) -> Result<ReplyView, ForumError> {
        Ok(ReplyView {
            id: reply.id().inner(),
            comment_id: reply.parent().map(|p| p.inner()).unwrap_or_default(),
            user: self.byline(reply.author()).await?,
            created_at: agora_core::unix(reply.created()),
            text: reply.text().to_string(),
        })
    }
}

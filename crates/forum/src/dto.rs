use super::*;
use serde::Deserialize;

/// `tagIds=1,2,3`. Pieces that are not integers are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionQuery {
    #[serde(default)]
    pub tag_ids: Option<String>,
}

impl DiscussionQuery {
    pub fn ids(&self) -> Vec<i32> {
        self.tag_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostQuery {
    pub id: uuid::Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTarget {
    pub post_id: uuid::Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub id: uuid::Uuid,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    #[serde(default)]
    pub notification_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagQuery {
    #[serde(default)]
    pub cursor: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Whole-post rewrite; `tags` replaces the previous set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub post_id: uuid::Uuid,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl EditRequest {
    pub fn split(self) -> (uuid::Uuid, Draft) {
        let draft = Draft {
            content: self.content,
            tags: self.tags,
            is_anonymous: self.is_anonymous,
        };
        (self.post_id, draft)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
    pub post_id: uuid::Uuid,
    #[serde(default)]
    pub cursor: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesQuery {
    pub comment_id: uuid::Uuid,
    #[serde(default)]
    pub cursor: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub post_id: uuid::Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub comment_id: uuid::Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCommentRequest {
    pub comment_id: uuid::Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReplyRequest {
    pub reply_comment_id: uuid::Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentTarget {
    pub comment_id: uuid::Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTarget {
    pub reply_comment_id: uuid::Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupCursor {
    #[serde(default)]
    pub cursor: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupSearch {
    #[serde(default)]
    pub cursor: Option<uuid::Uuid>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTarget {
    pub group_id: uuid::Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditGroupRequest {
    pub group_id: uuid::Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub group_id: uuid::Uuid,
    #[serde(default)]
    pub invited_username: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPostsQuery {
    pub group_id: uuid::Uuid,
    #[serde(default)]
    pub tag_ids: Option<String>,
}

impl GroupPostsQuery {
    pub fn ids(&self) -> Vec<i32> {
        DiscussionQuery {
            tag_ids: self.tag_ids.clone(),
        }
        .ids()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTagQuery {
    pub group_id: uuid::Uuid,
    #[serde(default)]
    pub cursor: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub group_id: uuid::Uuid,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl GroupDraft {
    pub fn split(self) -> (uuid::Uuid, Draft) {
        let draft = Draft {
            content: self.content,
            tags: self.tags,
            is_anonymous: self.is_anonymous,
        };
        (self.group_id, draft)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReportRequest {
    pub group_id: uuid::Uuid,
    pub id: uuid::Uuid,
    #[serde(default)]
    pub reason: Option<String>,
}

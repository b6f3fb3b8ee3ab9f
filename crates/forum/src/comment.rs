use super::*;
use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;
use std::time::SystemTime;

/// A comment on a post, or with a `parent` a reply to one.
/// Replies are one level deep: a reply's parent is always a top-level comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: ID<Self>,
    post: ID<Post>,
    parent: Option<ID<Comment>>,
    author: ID<Member>,
    text: String,
    created: SystemTime,
}

impl Unique for Comment {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Comment {
    pub fn new(
        id: ID<Self>,
        post: ID<Post>,
        parent: Option<ID<Comment>>,
        author: ID<Member>,
        text: String,
        created: SystemTime,
    ) -> Self {
        Self {
            id,
            post,
            parent,
            author,
            text,
            created,
        }
    }
    pub fn on(post: ID<Post>, author: ID<Member>, text: String) -> Self {
        Self::new(ID::default(), post, None, author, text, SystemTime::now())
    }
    pub fn reply(parent: &Comment, author: ID<Member>, text: String) -> Self {
        let root = parent.parent.unwrap_or(parent.id);
        Self::new(ID::default(), parent.post, Some(root), author, text, SystemTime::now())
    }
    pub fn post(&self) -> ID<Post> {
        self.post
    }
    pub fn parent(&self) -> Option<ID<Comment>> {
        self.parent
    }
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }
    pub fn author(&self) -> ID<Member> {
        self.author
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn created(&self) -> SystemTime {
        self.created
    }
    pub fn mentions(&self) -> Vec<&str> {
        mentions(&self.text)
    }
    pub fn revised(self, text: String) -> Self {
        Self { text, ..self }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Comment {
        fn name() -> &'static str {
            COMMENTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                COMMENTS,
                " (
                    id          UUID PRIMARY KEY,
                    post_id     UUID NOT NULL REFERENCES ",
                POSTS,
                "(id) ON DELETE CASCADE,
                    parent_id   UUID REFERENCES ",
                COMMENTS,
                "(id) ON DELETE CASCADE,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    text        TEXT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_comments_post ON ",
                COMMENTS,
                " (post_id, id) WHERE parent_id IS NULL;
                 CREATE INDEX IF NOT EXISTS idx_comments_parent ON ",
                COMMENTS,
                " (parent_id, id);"
            )
        }
    }
}

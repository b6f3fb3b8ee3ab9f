use super::*;
use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;
use std::time::SystemTime;

/// A discussion post. Public posts have no group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: ID<Self>,
    author: ID<Member>,
    anonymous: bool,
    content: String,
    group: Option<ID<Group>>,
    tags: Vec<String>,
    created: SystemTime,
}

impl Unique for Post {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Post {
    pub fn new(
        id: ID<Self>,
        author: ID<Member>,
        anonymous: bool,
        content: String,
        created: SystemTime,
    ) -> Self {
        Self {
            id,
            author,
            anonymous,
            content,
            group: None,
            tags: Vec::new(),
            created,
        }
    }
    /// Tags are trimmed, emptied ones dropped, and duplicates removed keeping first order.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Vec::new();
        for tag in tags.into_iter().map(|t| t.trim().to_string()) {
            if !tag.is_empty() && !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }
    pub fn with_group(mut self, group: Option<ID<Group>>) -> Self {
        self.group = group;
        self
    }
    pub fn author(&self) -> ID<Member> {
        self.author
    }
    pub fn anonymous(&self) -> bool {
        self.anonymous
    }
    pub fn content(&self) -> &str {
        &self.content
    }
    pub fn group(&self) -> Option<ID<Group>> {
        self.group
    }
    pub fn public(&self) -> bool {
        self.group.is_none()
    }
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
    pub fn created(&self) -> SystemTime {
        self.created
    }
    pub fn mentions(&self) -> Vec<&str> {
        mentions(&self.content)
    }
    /// Same post with new content, tags and anonymity.
    pub fn revised(self, anonymous: bool, content: String, tags: Vec<String>) -> Self {
        Self {
            anonymous,
            content,
            ..self
        }
        .with_tags(tags)
    }
}

/// Usernames addressed as `@name` in `text`, in order of first appearance.
pub fn mentions(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    for word in text.split_whitespace() {
        let name = word
            .strip_prefix('@')
            .map(|w| w.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_'))
            .unwrap_or_default();
        if !name.is_empty() && !found.contains(&name) {
            found.push(name);
        }
    }
    found
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Post {
        fn name() -> &'static str {
            POSTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                POSTS,
                " (
                    id          UUID PRIMARY KEY,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    anonymous   BOOLEAN NOT NULL DEFAULT FALSE,
                    content     VARCHAR(255) NOT NULL,
                    group_id    UUID REFERENCES ",
                GROUPS,
                "(id) ON DELETE CASCADE,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_posts_user ON ",
                POSTS,
                " (user_id);
                 CREATE INDEX IF NOT EXISTS idx_posts_group ON ",
                POSTS,
                " (group_id);"
            )
        }
    }
}

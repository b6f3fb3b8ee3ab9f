use super::*;
use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;
use std::time::SystemTime;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cause {
    Report,
    Comment,
    Mention,
    Reply,
}

impl Cause {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Comment => "comment",
            Self::Mention => "mention",
            Self::Reply => "reply",
        }
    }
}

impl TryFrom<&str> for Cause {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "report" => Ok(Self::Report),
            "comment" => Ok(Self::Comment),
            "mention" => Ok(Self::Mention),
            "reply" => Ok(Self::Reply),
            _ => Err(format!("unknown notification type: {}", s)),
        }
    }
}

/// Notice delivered to `to` about something `from` did on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    id: ID<Self>,
    cause: Cause,
    read: bool,
    to: ID<Member>,
    from: ID<Member>,
    post: ID<Post>,
    created: SystemTime,
}

impl Unique for Notification {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Notification {
    pub fn new(
        id: ID<Self>,
        cause: Cause,
        read: bool,
        to: ID<Member>,
        from: ID<Member>,
        post: ID<Post>,
        created: SystemTime,
    ) -> Self {
        Self {
            id,
            cause,
            read,
            to,
            from,
            post,
            created,
        }
    }
    pub fn unread(cause: Cause, to: ID<Member>, from: ID<Member>, post: ID<Post>) -> Self {
        Self::new(ID::default(), cause, false, to, from, post, SystemTime::now())
    }
    pub fn cause(&self) -> Cause {
        self.cause
    }
    pub fn read(&self) -> bool {
        self.read
    }
    pub fn recipient(&self) -> ID<Member> {
        self.to
    }
    pub fn sender(&self) -> ID<Member> {
        self.from
    }
    pub fn post(&self) -> ID<Post> {
        self.post
    }
    pub fn created(&self) -> SystemTime {
        self.created
    }
    pub fn marked(self) -> Self {
        Self { read: true, ..self }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Notification {
        fn name() -> &'static str {
            NOTIFICATIONS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                NOTIFICATIONS,
                " (
                    id          UUID PRIMARY KEY,
                    type        VARCHAR(16) NOT NULL,
                    is_read     BOOLEAN NOT NULL DEFAULT FALSE,
                    to_user     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    post_id     UUID NOT NULL REFERENCES ",
                POSTS,
                "(id) ON DELETE CASCADE,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_notifications_to ON ",
                NOTIFICATIONS,
                " (to_user, is_read);"
            )
        }
    }
}

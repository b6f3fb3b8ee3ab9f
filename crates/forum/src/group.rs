use agora_auth::Member;
use agora_core::ID;
use agora_core::Unique;

/// A private discussion group led by its creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: ID<Self>,
    name: String,
    description: String,
    leader: ID<Member>,
}

impl Unique for Group {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Group {
    pub fn new(id: ID<Self>, name: String, description: String, leader: ID<Member>) -> Self {
        Self {
            id,
            name,
            description,
            leader,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn leader(&self) -> ID<Member> {
        self.leader
    }
    pub fn renamed(self, name: String, description: String) -> Self {
        Self {
            name,
            description,
            ..self
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Group {
        fn name() -> &'static str {
            GROUPS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                GROUPS,
                " (
                    id          UUID PRIMARY KEY,
                    name        VARCHAR(100) NOT NULL,
                    description TEXT NOT NULL,
                    leader_id   UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE
                );
                 CREATE TABLE IF NOT EXISTS ",
                MEMBERS,
                " (
                    group_id    UUID NOT NULL REFERENCES ",
                GROUPS,
                "(id) ON DELETE CASCADE,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    joined_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (group_id, user_id)
                );
                 CREATE TABLE IF NOT EXISTS ",
                INVITATIONS,
                " (
                    group_id    UUID NOT NULL REFERENCES ",
                GROUPS,
                "(id) ON DELETE CASCADE,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    PRIMARY KEY (group_id, user_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_group_members_user ON ",
                MEMBERS,
                " (user_id);
                 CREATE INDEX IF NOT EXISTS idx_group_invitations_user ON ",
                INVITATIONS,
                " (user_id);"
            )
        }
    }
}

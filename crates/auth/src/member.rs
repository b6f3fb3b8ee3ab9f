use super::*;
use agora_core::ID;
use agora_core::Unique;

/// Registered user with verified identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    id: ID<Self>,
    name: String,
    username: String,
    image: Option<String>,
    bio: Option<String>,
    role: Role,
}

impl Member {
    pub fn new(id: ID<Self>, name: String, username: String, role: Role) -> Self {
        Self {
            id,
            name,
            username,
            image: None,
            bio: None,
            role,
        }
    }
    pub fn with_profile(mut self, bio: Option<String>, image: Option<String>) -> Self {
        self.bio = bio;
        self.image = image;
        self
    }
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    /// Note: hashword is a database-only field, not part of Member domain type.
    impl Schema for Member {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    username    VARCHAR(20) UNIQUE NOT NULL,
                    hashword    TEXT NOT NULL,
                    name        VARCHAR(20) NOT NULL,
                    image       TEXT,
                    bio         VARCHAR(100),
                    role_id     INTEGER NOT NULL REFERENCES ",
                ROLES,
                "(id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_username ON ",
                USERS,
                " (username);"
            )
        }
    }
}

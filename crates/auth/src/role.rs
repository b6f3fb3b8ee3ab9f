/// Role attached to every registered user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Developer,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Developer => "developer",
        }
    }
    /// Row id in the roles table.
    pub const fn key(&self) -> i32 {
        match self {
            Self::Developer => 1,
            Self::Member => 2,
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "member" => Ok(Self::Member),
            "developer" => Ok(Self::Developer),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Role {
        fn name() -> &'static str {
            ROLES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                ROLES,
                " (
                    id          INTEGER PRIMARY KEY,
                    name        VARCHAR(32) UNIQUE NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
        fn seeds() -> &'static str {
            const_format::concatcp!(
                "INSERT INTO ",
                ROLES,
                " (id, name) VALUES (1, 'developer'), (2, 'member') ON CONFLICT DO NOTHING;"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for role in [Role::Member, Role::Developer] {
            assert_eq!(Role::try_from(role.as_str()), Ok(role));
        }
        assert!(Role::try_from("admin").is_err());
    }

    #[test]
    fn registration_default_is_member() {
        assert_eq!(Role::default(), Role::Member);
        assert_eq!(Role::Member.key(), 2);
    }
}

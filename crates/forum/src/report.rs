use super::*;
use agora_core::ID;
use agora_core::Unique;

/// Default reason when a reporter gives none.
pub const UNSPECIFIED: &str = "-";

/// Abuse report filed against a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    id: ID<Self>,
    post: ID<Post>,
    reason: String,
}

impl Unique for Report {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Report {
    pub fn new(id: ID<Self>, post: ID<Post>, reason: String) -> Self {
        Self { id, post, reason }
    }
    /// Fresh report; a blank reason becomes [`UNSPECIFIED`].
    pub fn file(post: ID<Post>, reason: Option<String>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| UNSPECIFIED.to_string());
        Self::new(ID::default(), post, reason)
    }
    pub fn post(&self) -> ID<Post> {
        self.post
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Report {
        fn name() -> &'static str {
            REPORTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                REPORTS,
                " (
                    id          UUID PRIMARY KEY,
                    post_id     UUID NOT NULL REFERENCES ",
                POSTS,
                "(id) ON DELETE CASCADE,
                    reason      TEXT NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_reports_post ON ",
                REPORTS,
                " (post_id);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reason_defaults() {
        assert_eq!(Report::file(ID::default(), None).reason(), UNSPECIFIED);
        assert_eq!(Report::file(ID::default(), Some("  ".into())).reason(), UNSPECIFIED);
        assert_eq!(Report::file(ID::default(), Some("spam".into())).reason(), "spam");
    }
}

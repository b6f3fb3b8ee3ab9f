/// A tag together with how many public posts carry it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub posts: i64,
}

/// Keyset order for tag pages: most used first, ties by ascending id.
pub fn ranked(a: &Tag, b: &Tag) -> std::cmp::Ordering {
    b.posts.cmp(&a.posts).then(a.id.cmp(&b.id))
}

/// One page of tags and where the next one starts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPage {
    pub tags: Vec<Tag>,
    pub next_cursor: Option<i32>,
    pub has_next_page: bool,
}

impl TagPage {
    /// Builds a page from up to `size + 1` ranked rows.
    pub fn cut(mut rows: Vec<Tag>, size: usize) -> Self {
        let has_next_page = rows.len() > size;
        rows.truncate(size);
        Self {
            next_cursor: has_next_page.then(|| rows.last().map(|t| t.id)).flatten(),
            has_next_page,
            tags: rows,
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use agora_database::*;

    impl Schema for Tag {
        fn name() -> &'static str {
            TAGS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                TAGS,
                " (
                    id          SERIAL PRIMARY KEY,
                    name        VARCHAR(100) UNIQUE NOT NULL
                );
                 CREATE TABLE IF NOT EXISTS ",
                TAG_POSTS,
                " (
                    tag_id      INTEGER NOT NULL REFERENCES ",
                TAGS,
                "(id) ON DELETE CASCADE,
                    post_id     UUID NOT NULL REFERENCES ",
                POSTS,
                "(id) ON DELETE CASCADE,
                    PRIMARY KEY (tag_id, post_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_tag_posts_post ON ",
                TAG_POSTS,
                " (post_id);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: i32, posts: i64) -> Tag {
        Tag {
            id,
            name: format!("t{}", id),
            posts,
        }
    }

    #[test]
    fn ranking_prefers_usage_then_id() {
        let mut tags = vec![tag(3, 1), tag(1, 5), tag(2, 5)];
        tags.sort_by(ranked);
        assert_eq!(tags.iter().map(|t| t.id).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn page_cut_reports_continuation() {
        let page = TagPage::cut((1..=11).map(|i| tag(i, 20 - i as i64)).collect(), 10);
        assert!(page.has_next_page);
        assert_eq!(page.tags.len(), 10);
        assert_eq!(page.next_cursor, Some(10));
        let last = TagPage::cut(vec![tag(1, 1)], 10);
        assert!(!last.has_next_page);
        assert_eq!(last.next_cursor, None);
    }
}

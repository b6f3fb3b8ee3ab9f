//! PostgreSQL integration for agora.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from a connection URL
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
//! - [`migrate()`] — Applies a [`Schema`] idempotently
//! - [`contains()`] — Escaped `LIKE` pattern for substring search
//!
//! ## Table Names
//!
//! Constants for all persistent entities: users and roles, sessions,
//! posts and their comments, reports, notifications, tags, and groups.
mod traits;

pub use traits::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
/// The connection future is driven on a spawned tokio task.
pub async fn db(url: &str) -> Result<Arc<Client>, PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// `LIKE`/`ILIKE` pattern matching `fragment` literally anywhere.
/// Backslash is the default escape character in PostgreSQL.
pub fn contains(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Table for registered user accounts.
#[rustfmt::skip]
pub const USERS:         &str = "users";
/// Table for role names referenced by users.
#[rustfmt::skip]
pub const ROLES:         &str = "roles";
/// Table for user authentication sessions.
#[rustfmt::skip]
pub const SESSIONS:      &str = "sessions";
/// Table for discussion posts.
#[rustfmt::skip]
pub const POSTS:         &str = "posts";
/// Table for abuse reports against posts.
#[rustfmt::skip]
pub const REPORTS:       &str = "reports";
/// Table for per-user notifications.
#[rustfmt::skip]
pub const NOTIFICATIONS: &str = "notifications";
/// Table for tag names.
#[rustfmt::skip]
pub const TAGS:          &str = "tags";
/// Join table between tags and posts.
#[rustfmt::skip]
pub const TAG_POSTS:     &str = "tag_posts";
/// Table for comments on posts and their replies.
#[rustfmt::skip]
pub const COMMENTS:      &str = "comments";
/// Table for private discussion groups.
#[rustfmt::skip]
pub const GROUPS:        &str = "groups";
/// Join table between groups and their members.
#[rustfmt::skip]
pub const MEMBERS:       &str = "group_members";
/// Table for pending group invitations.
#[rustfmt::skip]
pub const INVITATIONS:   &str = "group_invitations";

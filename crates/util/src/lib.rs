//! Core identity types, constants, and runtime utilities for agora.
//!
//! This crate provides the foundational types and policy parameters
//! used throughout the agora workspace.

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}
impl<T> TryFrom<&str> for ID<T> {
    type Error = uuid::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        uuid::Uuid::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// SESSION POLICY
// A session row lives SESSION_TTL past its last renewal. Activity inside the
// final RENEWAL_WINDOW pushes the expiry out again.
// ============================================================================
const DAY: u64 = 24 * 60 * 60;
const HOUR: u64 = 60 * 60;
/// Lifetime of a persisted session record.
pub const SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(10 * DAY);
/// Sliding renewal threshold, measured back from the persisted expiry.
pub const RENEWAL_WINDOW: std::time::Duration = std::time::Duration::from_secs(5 * DAY);
/// Advisory lifetime of the access token and its cookie.
pub const ACCESS_TOKEN_TTL: std::time::Duration = std::time::Duration::from_secs(2 * HOUR);
/// Advisory lifetime of the refresh token and its cookie.
pub const REFRESH_TOKEN_TTL: std::time::Duration = std::time::Duration::from_secs(24 * HOUR);
/// Period between purges of expired session rows.
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(HOUR);

// ============================================================================
// COOKIES & HEADERS
// ============================================================================
/// Cookie carrying the access token.
#[rustfmt::skip]
pub const ACCESS_COOKIE:  &str = "TOKEN";
/// Cookie carrying the refresh token.
#[rustfmt::skip]
pub const REFRESH_COOKIE: &str = "REFRESH_TOKEN";
/// Explicit locale override header.
#[rustfmt::skip]
pub const LOCALE_HEADER:  &str = "X-Locale";

// ============================================================================
// LOCALES
// ============================================================================
/// Locale used when neither header names a supported one.
pub const DEFAULT_LOCALE: &str = "en";
/// Locales the forum ships messages for.
pub const LOCALES: &[&str] = &["en", "id"];

// ============================================================================
// INPUT BOUNDS
// ============================================================================
#[rustfmt::skip]
pub const NAME_MIN:     usize = 5;
#[rustfmt::skip]
pub const NAME_MAX:     usize = 20;
#[rustfmt::skip]
pub const USERNAME_MIN: usize = 5;
#[rustfmt::skip]
pub const USERNAME_MAX: usize = 20;
#[rustfmt::skip]
pub const PASSWORD_MIN: usize = 8;
#[rustfmt::skip]
pub const PASSWORD_MAX: usize = 255;
#[rustfmt::skip]
pub const BIO_MAX:      usize = 100;
#[rustfmt::skip]
pub const CONTENT_MIN:  usize = 1;
#[rustfmt::skip]
pub const CONTENT_MAX:  usize = 255;
#[rustfmt::skip]
pub const GROUP_MIN:    usize = 3;
#[rustfmt::skip]
pub const GROUP_MAX:    usize = 100;

// ============================================================================
// LISTING LIMITS
// ============================================================================
/// Users suggested while typing an @mention.
pub const MENTION_LIMIT: usize = 5;
/// Users suggested for a group invitation.
pub const INVITE_LIMIT: usize = 10;
/// Tags per page in tag listings.
pub const TAG_PAGE: usize = 10;
/// Comments or replies per page.
pub const COMMENT_PAGE: usize = 10;
/// Groups per page in group listings.
pub const GROUP_PAGE: usize = 10;

// ============================================================================
// TIME
// ============================================================================
/// Seconds since the unix epoch, saturating at zero for earlier instants.
pub fn unix(time: std::time::SystemTime) -> i64 {
    time.duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = unix(std::time::SystemTime::now());
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

//! Forum content reached through the authorization guards.
//!
//! ## Content
//!
//! - [`Post`] — Public or group discussion, optionally anonymous
//! - [`Comment`] — Comment on a post, or a one-level reply to one
//! - [`Group`] — Members-only space with a leader and invitations
//! - [`Report`] — Abuse report awaiting moderation
//! - [`Notification`] — Per-member notice with a [`Cause`]
//! - [`Tag`] / [`TagPage`] — Usage-ranked tags with keyset paging
//!
//! ## Storage
//!
//! - [`Board`] — Persistence seam for posts, reports, notifications and tags
//! - [`Threads`] / [`Groups`] — Comment and group storage, required by every [`Board`]
//! - [`Memory`] — In-process implementation
//!
//! ## Service
//!
//! - [`Forum`] — Ownership checks, bylines, and mention/report notifications
//! - comment threads and group membership are further `impl Forum` blocks
mod board;
mod comment;
mod dto;
mod error;
mod forum;
mod group;
mod membership;
mod memory;
mod notification;
mod post;
mod report;
mod tag;
mod threads;

pub use board::*;
pub use comment::*;
pub use dto::*;
pub use error::*;
pub use forum::*;
pub use group::*;
pub use membership::*;
pub use memory::*;
pub use notification::*;
pub use post::*;
pub use report::*;
pub use tag::*;
pub use threads::*;

#[cfg(feature = "database")]
mod repository;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use handlers::*;

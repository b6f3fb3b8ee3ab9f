//! Sessions, credentials, request context, and authorization guards.
//!
//! Every signed token is a reference to a persisted [`Session`]; the row, not
//! the token, decides whether a request is authenticated.
//!
//! ## Identity
//!
//! - [`Member`] — Registered user with role and profile
//! - [`Role`] — `member` or `developer`
//! - [`Session`] — Persisted grant with absolute expiry
//!
//! ## Stores
//!
//! - [`CredentialStore`] / [`SessionStore`] — Persistence seams
//! - [`Memory`] — In-process implementation of both
//!
//! ## Flow
//!
//! - [`SessionManager`] — Issue, verify, rotate, and revoke tokens
//! - [`Authenticator`] — Username and password checks
//! - [`ContextBuilder`] — Per-request identity, locale, and CSRF check
//! - [`guard`] — `authenticated` and `role_restricted` guards
mod authenticator;
mod claims;
mod context;
mod crypto;
mod dto;
mod error;
pub mod guard;
mod locale;
mod manager;
mod member;
mod memory;
pub mod password;
mod role;
mod session;
mod store;
pub mod validation;

pub use authenticator::*;
pub use claims::*;
pub use context::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use guard::*;
pub use locale::*;
pub use manager::*;
pub use member::*;
pub use memory::*;
pub use role::*;
pub use session::*;
pub use store::*;

#[cfg(feature = "database")]
mod repository;

#[cfg(feature = "server")]
mod cookies;
#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
mod reply;
#[cfg(feature = "server")]
pub use cookies::*;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
#[cfg(feature = "server")]
pub use reply::*;

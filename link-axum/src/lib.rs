//! link-axum: Axum front end for the link redirector.
//!
//! Serves stored links at their paths and exposes the admin API under
//! `/api`, gated by HTTP Basic auth.

pub mod app;
mod api;
pub mod auth;
mod error;
pub mod params;
mod serve;
pub mod state;

pub use auth::AuthConfig;
pub use error::{blob_error_to_link, LinkAxumError};
pub use serve::PROXIED_PREFIXES;
pub use state::LinkAxumState;

pub use app::{axum, LinkAxumApp};

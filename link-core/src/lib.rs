//! link-core: framework-agnostic core of the link redirector.
//!
//! Link records, the persistence interface, structured errors and
//! configuration. Transports (see `link-axum`) and the upload pipeline
//! (`link-blob`) build on top of this crate.

pub mod app;
pub mod config;
pub mod errors;
pub mod link;
pub mod store;

pub use app::LinkApp;
pub use config::{LinkConfig, LinkConfigSnapshot};
pub use errors::{ErrorKind, LinkError, LinkResult};
pub use link::{FileLocation, Link};
pub use store::{LinkStore, MemoryLinkStore};

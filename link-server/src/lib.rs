pub mod config;

use anyhow::Result;
use link_axum::LinkAxumApp;
use link_core::LinkApp;

/// Configure an in-memory app from the environment and build its router.
pub fn build() -> Result<LinkAxumApp> {
    let app = LinkApp::in_memory();
    config::config(&app)?;
    build_with(app)
}

/// Build the router over an already configured app.
pub fn build_with(app: LinkApp) -> Result<LinkAxumApp> {
    Ok(link_axum::axum(app)?)
}

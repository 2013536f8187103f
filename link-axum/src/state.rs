use std::collections::HashMap;
use std::sync::Arc;

use link_blob::{
    Catbox, Gofile, GofileDownloader, HcCdn, Litterbox, UploadClient, UploadConfig, UploadTarget,
};
use link_core::{FileLocation, LinkApp, LinkConfigSnapshot, LinkError, LinkResult, LinkStore};

use crate::auth::AuthConfig;

/// Shared per-router state. Cloning is cheap.
#[derive(Clone)]
pub struct LinkAxumState {
    pub app: LinkApp,
    inner: Arc<StateInner>,
}

#[derive(Clone)]
struct StateInner {
    auth: AuthConfig,
    redirect_url: Option<String>,
    upload: UploadConfig,
    client: UploadClient,
    targets: HashMap<FileLocation, Arc<dyn UploadTarget>>,
    gofile: GofileDownloader,
}

impl LinkAxumState {
    /// Build the state from the app's configuration, with the real hosts as
    /// upload targets.
    pub fn from_app(app: LinkApp) -> LinkResult<Self> {
        let config = app.config_snapshot();
        let auth = AuthConfig::from_config(&config)?;
        let upload = upload_config(&config);
        let client = UploadClient::new(upload.clone())
            .map_err(|e| LinkError::general_error(e.to_string()).with_source(e.into()).into_anyhow())?;

        let mut targets: HashMap<FileLocation, Arc<dyn UploadTarget>> = HashMap::new();
        targets.insert(FileLocation::Catbox, Arc::new(Catbox::new(client.clone())));
        targets.insert(FileLocation::Litterbox, Arc::new(Litterbox::new(client.clone())));
        targets.insert(FileLocation::Gofile, Arc::new(Gofile::new(client.clone())));
        targets.insert(FileLocation::HcCdn, Arc::new(HcCdn::new(client.clone())));

        Ok(Self {
            app,
            inner: Arc::new(StateInner {
                auth,
                redirect_url: config.get_string("redirect.url").filter(|url| !url.is_empty()),
                upload,
                gofile: GofileDownloader::new(client.clone()),
                client,
                targets,
            }),
        })
    }

    /// Replace the target used for `location`.
    ///
    /// Call before the router is built; clones made earlier keep the old
    /// targets.
    pub fn with_target(mut self, location: FileLocation, target: Arc<dyn UploadTarget>) -> Self {
        Arc::make_mut(&mut self.inner).targets.insert(location, target);
        self
    }

    pub fn with_gofile_downloader(mut self, downloader: GofileDownloader) -> Self {
        Arc::make_mut(&mut self.inner).gofile = downloader;
        self
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        self.app.store()
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.inner.auth
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.inner.redirect_url.as_deref()
    }

    pub fn upload_config(&self) -> &UploadConfig {
        &self.inner.upload
    }

    pub fn client(&self) -> &UploadClient {
        &self.inner.client
    }

    pub fn target(&self, location: FileLocation) -> Option<&Arc<dyn UploadTarget>> {
        self.inner.targets.get(&location)
    }

    pub fn gofile(&self) -> &GofileDownloader {
        &self.inner.gofile
    }
}

fn upload_config(config: &LinkConfigSnapshot) -> UploadConfig {
    let mut upload = UploadConfig::default();
    if let Some(agent) = config.get_string("upload.user_agent") {
        upload = upload.with_user_agent(agent);
    }
    if let Some(capacity) = config.get_usize("upload.channel_capacity") {
        upload = upload.with_channel_capacity(capacity);
    }
    if let Some(max) = config.get_u64("upload.inline_max_bytes") {
        upload = upload.with_inline_max_bytes(max);
    }
    if let Some(ttl) = config.get_string("upload.litterbox_ttl") {
        upload = upload.with_litterbox_ttl(ttl);
    }
    if let Some(token) = config.get_string("upload.hc_cdn_token") {
        upload = upload.with_hc_cdn_token(token);
    }
    upload
}

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::debug;

use crate::errors::{LinkError, LinkResult};
use crate::link::Link;

/// Persistence for link records, keyed by path.
///
/// Backends decide how records are laid out; callers only rely on these
/// four operations.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Every link, ordered by path. Inline file content is not included.
    async fn list(&self) -> LinkResult<Vec<Link>>;

    /// The link stored at `path`, with inline content.
    async fn get(&self, path: &str) -> LinkResult<Option<Link>>;

    /// Store a new link. Fails with `Conflict` if the path is taken.
    async fn insert(&self, link: Link) -> LinkResult<()>;

    /// Remove the link at `path`. Missing paths are not an error.
    async fn delete(&self, path: &str) -> LinkResult<()>;
}

/// In-process store backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    links: RwLock<BTreeMap<String, Link>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn list(&self) -> LinkResult<Vec<Link>> {
        let links = self.links.read().map_err(|_| anyhow!("link store lock poisoned"))?;
        Ok(links.values().map(Link::without_content).collect())
    }

    async fn get(&self, path: &str) -> LinkResult<Option<Link>> {
        let links = self.links.read().map_err(|_| anyhow!("link store lock poisoned"))?;
        Ok(links.get(path).cloned())
    }

    async fn insert(&self, link: Link) -> LinkResult<()> {
        let mut links = self.links.write().map_err(|_| anyhow!("link store lock poisoned"))?;
        let path = link.path().to_string();
        if links.contains_key(&path) {
            return Err(LinkError::conflict(format!("Link already exists: {path}")).into_anyhow());
        }
        debug!(path = %path, kind = link.kind(), "stored link");
        links.insert(path, link);
        Ok(())
    }

    async fn delete(&self, path: &str) -> LinkResult<()> {
        let mut links = self.links.write().map_err(|_| anyhow!("link store lock poisoned"))?;
        if links.remove(path).is_some() {
            debug!(path, "removed link");
        }
        Ok(())
    }
}

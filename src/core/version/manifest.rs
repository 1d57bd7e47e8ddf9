// ─── Version Manifest ───
// Fetches the top-level release manifest and per-release metadata documents,
// caching both for the lifetime of the resolver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::Deserialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use super::version_file::VersionJson;
use crate::core::downloader::{
    write_atomically, DownloadUnit, Downloader, UnitCategory, UnitStatus,
};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::Fetch;
use crate::core::state::{InstallLayout, LauncherConfig};

/// Top-level Mojang version manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    #[serde(default, rename = "releaseTime")]
    pub release_time: Option<String>,
}

/// Filter for [`ManifestResolver::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionCategory {
    #[default]
    All,
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl VersionCategory {
    /// The manifest `type` tag, `None` for [`VersionCategory::All`].
    pub fn type_tag(self) -> Option<&'static str> {
        match self {
            VersionCategory::All => None,
            VersionCategory::Release => Some("release"),
            VersionCategory::Snapshot => Some("snapshot"),
            VersionCategory::OldBeta => Some("old_beta"),
            VersionCategory::OldAlpha => Some("old_alpha"),
        }
    }
}

impl VersionManifest {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Version ids in manifest order, optionally narrowed to one category.
    pub fn ids(&self, category: VersionCategory) -> Vec<String> {
        self.versions
            .iter()
            .filter(|v| category.type_tag().map_or(true, |tag| v.version_type == tag))
            .map(|v| v.id.clone())
            .collect()
    }
}

type MetadataCell = Arc<OnceCell<Arc<VersionJson>>>;

/// Resolves release ids to their metadata.
///
/// The manifest is fetched on first use (or on refresh) and kept in memory.
/// Metadata documents are persisted to `versions/<id>/<id>.json` the first
/// time they are needed and read back from there afterwards. Concurrent
/// callers asking for the same key share a single fetch.
pub struct ManifestResolver {
    downloader: Downloader,
    layout: InstallLayout,
    manifest_url: String,
    manifest: Mutex<Option<Arc<VersionManifest>>>,
    metadata: StdMutex<HashMap<String, MetadataCell>>,
}

impl ManifestResolver {
    pub fn new(config: &LauncherConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            downloader: Downloader::new(fetcher),
            layout: config.layout(),
            manifest_url: config.manifest_url.clone(),
            manifest: Mutex::new(None),
            metadata: StdMutex::new(HashMap::new()),
        }
    }

    /// Seed the resolver with an already fetched manifest.
    pub fn with_manifest(self, manifest: VersionManifest) -> Self {
        Self {
            manifest: Mutex::new(Some(Arc::new(manifest))),
            ..self
        }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// The top-level manifest, fetched when absent or when `refresh` is set.
    pub async fn manifest(&self, refresh: bool) -> LauncherResult<Arc<VersionManifest>> {
        // Holding the lock across the fetch makes concurrent first calls wait
        // for one request instead of issuing their own.
        let mut cached = self.manifest.lock().await;
        if !refresh {
            if let Some(manifest) = cached.as_ref() {
                return Ok(manifest.clone());
            }
        }

        let manifest = Arc::new(self.fetch_manifest().await?);
        *cached = Some(manifest.clone());
        Ok(manifest)
    }

    async fn fetch_manifest(&self) -> LauncherResult<VersionManifest> {
        info!("Fetching version manifest...");
        let cache_path = self.layout.manifest_cache();

        match self.downloader.fetcher().fetch_text(&self.manifest_url).await {
            Ok(raw) => {
                let manifest = VersionManifest::parse(&raw)?;
                if let Err(e) = write_atomically(&cache_path, raw.as_bytes()).await {
                    warn!("Could not cache version manifest: {}", e);
                }
                info!("Loaded {} versions from manifest", manifest.versions.len());
                Ok(manifest)
            }
            Err(fetch_error) => match tokio::fs::read_to_string(&cache_path).await {
                Ok(raw) => {
                    warn!(
                        "Version manifest fetch failed ({}), using cached copy {:?}",
                        fetch_error, cache_path
                    );
                    VersionManifest::parse(&raw)
                }
                Err(_) => Err(fetch_error),
            },
        }
    }

    /// Release ids in manifest order.
    pub async fn list(&self, category: VersionCategory, refresh: bool) -> LauncherResult<Vec<String>> {
        Ok(self.manifest(refresh).await?.ids(category))
    }

    /// The manifest entry for `id`, or `VersionNotFound`.
    pub async fn entry(&self, id: &str) -> LauncherResult<VersionEntry> {
        self.manifest(false)
            .await?
            .find_version(id)
            .cloned()
            .ok_or_else(|| LauncherError::VersionNotFound(id.to_string()))
    }

    /// Metadata for `id`, downloading and persisting it if not on disk yet.
    pub async fn resolve(&self, id: &str) -> LauncherResult<Arc<VersionJson>> {
        let cell = {
            let mut cells = self.metadata.lock().unwrap_or_else(PoisonError::into_inner);
            cells.entry(id.to_string()).or_default().clone()
        };

        let metadata = cell.get_or_try_init(|| self.load_metadata(id)).await?;
        Ok(metadata.clone())
    }

    /// Metadata for an already installed release. Never touches the network
    /// for the metadata itself; fails with `MetadataMissing` when the release
    /// was never installed.
    pub async fn installed(&self, id: &str) -> LauncherResult<Arc<VersionJson>> {
        let entry = self.entry(id).await?;
        if !self.layout.version_json(&entry.id).exists() {
            info!("{} is not installed.", id);
            return Err(LauncherError::MetadataMissing(id.to_string()));
        }
        self.resolve(id).await
    }

    async fn load_metadata(&self, id: &str) -> LauncherResult<Arc<VersionJson>> {
        let entry = self.entry(id).await?;
        let path = self.layout.version_json(&entry.id);

        let unit = DownloadUnit::new(
            format!("{} metadata", entry.id),
            &entry.url,
            &path,
            UnitCategory::MetadataFile,
        );
        if self.downloader.download_unit(&unit).await? == UnitStatus::AlreadyPresent {
            debug!("{} already has metadata file.", entry.id);
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LauncherError::io(&path, e))?;
        Ok(Arc::new(VersionJson::parse(&raw)?))
    }
}

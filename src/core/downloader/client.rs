use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::Fetch;

/// What a download unit is, which decides how wide its worker pool is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitCategory {
    AssetObject,
    LibraryArtifact,
    NativeArchive,
    RuntimeFile,
    MetadataFile,
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitCategory::AssetObject => "asset",
            UnitCategory::LibraryArtifact => "library",
            UnitCategory::NativeArchive => "native",
            UnitCategory::RuntimeFile => "runtime",
            UnitCategory::MetadataFile => "metadata",
        };
        f.write_str(label)
    }
}

/// A single file to fetch. `dest` depends only on the unit's logical
/// identity, never on download order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUnit {
    /// Human readable label for log lines.
    pub name: String,
    pub url: String,
    pub dest: PathBuf,
    pub category: UnitCategory,
}

impl DownloadUnit {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        dest: impl Into<PathBuf>,
        category: UnitCategory,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            dest: dest.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    Downloaded,
    AlreadyPresent,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct UnitOutcome {
    pub unit: DownloadUnit,
    pub status: UnitStatus,
}

impl UnitOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, UnitStatus::Failed(_))
    }
}

/// Fetches download units with a bounded number of in-flight requests.
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn Fetch>,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetch> {
        &self.fetcher
    }

    // ── Single unit ─────────────────────────────────────

    /// Download one unit unless its destination already exists.
    pub async fn download_unit(&self, unit: &DownloadUnit) -> LauncherResult<UnitStatus> {
        if unit.dest.exists() {
            debug!("{} already exists.", unit.name);
            return Ok(UnitStatus::AlreadyPresent);
        }

        let bytes = self.fetcher.fetch_bytes(&unit.url).await?;
        write_atomically(&unit.dest, &bytes).await?;

        info!("{} downloaded.", unit.name);
        Ok(UnitStatus::Downloaded)
    }

    // ── Batch ───────────────────────────────────────────

    /// Run all units with at most `max_concurrency` in flight. A failing unit
    /// is logged and reported in its outcome; it never stops its siblings.
    pub async fn execute(&self, units: Vec<DownloadUnit>, max_concurrency: usize) -> Vec<UnitOutcome> {
        if units.is_empty() {
            return Vec::new();
        }

        info!(
            "Starting batch download: {} {} files, concurrency={}",
            units.len(),
            units[0].category,
            max_concurrency
        );

        stream::iter(units)
            .map(|unit| async move {
                let status = match self.download_unit(&unit).await {
                    Ok(status) => status,
                    Err(e) => {
                        warn!("{} failed: {}", unit.name, e);
                        UnitStatus::Failed(e.to_string())
                    }
                };
                UnitOutcome { unit, status }
            })
            .buffer_unordered(max_concurrency.max(1))
            .collect()
            .await
    }
}

/// Write `bytes` to `dest` through a `.part` sibling, so a crash mid-write
/// never leaves a file the existence check would trust.
pub async fn write_atomically(dest: &Path, bytes: &[u8]) -> LauncherResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let partial = dest.with_file_name(format!("{}.part", file_name));

    // Block so the handle is dropped before the rename (Windows).
    {
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|e| LauncherError::io(&partial, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| LauncherError::io(&partial, e))?;
        file.flush()
            .await
            .map_err(|e| LauncherError::io(&partial, e))?;
    }

    tokio::fs::rename(&partial, dest)
        .await
        .map_err(|e| LauncherError::io(dest, e))?;
    Ok(())
}

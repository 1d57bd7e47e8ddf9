// ─── Managed Java Runtime ───
// Stages the Mojang-distributed runtime a release asks for under
// `runtime/<component>/`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::downloader::{write_atomically, DownloadUnit, UnitCategory};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::Fetch;
use crate::core::platform::Platform;
use crate::core::state::InstallLayout;

/// `all.json`: platform key → component name → candidate manifests.
#[derive(Debug, Deserialize)]
pub struct RuntimeIndex(pub HashMap<String, HashMap<String, Vec<RuntimeCandidate>>>);

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeCandidate {
    pub manifest: ManifestRef,
    #[serde(default)]
    pub version: Option<RuntimeVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRef {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeVersion {
    pub name: String,
}

/// Files-manifest of one runtime component.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeFiles {
    pub files: BTreeMap<String, RuntimeFileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeFileEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub downloads: Option<RuntimeFileDownloads>,
    #[serde(default)]
    pub executable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeFileDownloads {
    pub raw: RawDownload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDownload {
    pub url: String,
}

/// Runtime files still missing on disk, plus the files that need the
/// executable bit once downloaded.
#[derive(Debug, Clone, Default)]
pub struct RuntimePlan {
    pub units: Vec<DownloadUnit>,
    pub executables: Vec<PathBuf>,
}

impl RuntimeIndex {
    /// Files-manifest URL of `component` for `platform`.
    pub fn manifest_url(&self, platform: &Platform, component: &str) -> LauncherResult<&str> {
        let candidate = self
            .0
            .get(platform.runtime_key)
            .and_then(|components| components.get(component))
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| {
                LauncherError::Other(format!(
                    "Runtime component {} is not published for {}",
                    component, platform.runtime_key
                ))
            })?;

        if let Some(version) = &candidate.version {
            debug!("Runtime {} resolves to {}", component, version.name);
        }
        Ok(&candidate.manifest.url)
    }
}

impl RuntimeFiles {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Fetch the files-manifest of `component` through the runtime index,
    /// caching it at `runtime/<component>.json`. Falls back to that cache
    /// when the network is unavailable.
    pub async fn load(
        fetcher: &dyn Fetch,
        index_url: &str,
        platform: &Platform,
        component: &str,
        layout: &InstallLayout,
    ) -> LauncherResult<Self> {
        let cache_path = layout.runtime_manifest_cache(component);

        match fetch_files_manifest(fetcher, index_url, platform, component).await {
            Ok(raw) => {
                let files = Self::parse(&raw)?;
                if let Err(e) = write_atomically(&cache_path, raw.as_bytes()).await {
                    warn!("Could not cache runtime manifest for {}: {}", component, e);
                }
                Ok(files)
            }
            Err(fetch_error) => match tokio::fs::read_to_string(&cache_path).await {
                Ok(raw) => {
                    warn!(
                        "Runtime manifest fetch failed ({}), using cached copy {:?}",
                        fetch_error, cache_path
                    );
                    Self::parse(&raw)
                }
                Err(_) => Err(fetch_error),
            },
        }
    }

    /// Units for every `file` entry not yet present under `runtime_dir`.
    pub fn plan(&self, runtime_dir: &Path) -> RuntimePlan {
        let mut plan = RuntimePlan::default();

        for (name, entry) in &self.files {
            if entry.kind != "file" {
                continue;
            }
            let Some(downloads) = &entry.downloads else {
                warn!("Runtime file {} has no download", name);
                continue;
            };

            let dest = runtime_dir.join(name);
            if entry.executable {
                plan.executables.push(dest.clone());
            }
            if dest.exists() {
                debug!("{} already exists in runtime folder...", name);
                continue;
            }

            plan.units.push(DownloadUnit::new(
                name.as_str(),
                &downloads.raw.url,
                dest,
                UnitCategory::RuntimeFile,
            ));
        }

        info!(
            "{} runtime files to download ({} tracked)",
            plan.units.len(),
            self.files.len()
        );
        plan
    }
}

async fn fetch_files_manifest(
    fetcher: &dyn Fetch,
    index_url: &str,
    platform: &Platform,
    component: &str,
) -> LauncherResult<String> {
    let index: RuntimeIndex = serde_json::from_str(&fetcher.fetch_text(index_url).await?)?;
    let url = index.manifest_url(platform, component)?;
    fetcher.fetch_text(url).await
}

/// Set the executable bit on staged runtime binaries. No-op off unix.
pub async fn mark_executables(paths: &[PathBuf]) -> LauncherResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        for path in paths.iter().filter(|p| p.exists()) {
            let mut perms = tokio::fs::metadata(path)
                .await
                .map_err(|e| LauncherError::io(path, e))?
                .permissions();
            if perms.mode() & 0o111 == 0o111 {
                continue;
            }
            perms.set_mode(0o755);
            tokio::fs::set_permissions(path, perms)
                .await
                .map_err(|e| LauncherError::io(path, e))?;
        }
    }
    #[cfg(not(unix))]
    let _ = paths;
    Ok(())
}

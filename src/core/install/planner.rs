// ─── Artifact Planner ───
// Walks a release's metadata and lists every file still missing from the
// install root. Planning against a complete install yields an empty plan.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::assets::AssetIndex;
use crate::core::downloader::{DownloadUnit, Downloader, UnitCategory};
use crate::core::error::LauncherResult;
use crate::core::java::RuntimeFiles;
use crate::core::natives::ExtractRules;
use crate::core::platform::Platform;
use crate::core::state::{InstallLayout, LauncherConfig};
use crate::core::version::VersionJson;

/// A classifier archive plus the filters to apply when unpacking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeUnit {
    pub download: DownloadUnit,
    pub extract: Option<ExtractRules>,
}

#[derive(Debug, Clone, Default)]
pub struct InstallPlan {
    pub client: Option<DownloadUnit>,
    pub libraries: Vec<DownloadUnit>,
    pub natives: Vec<NativeUnit>,
    pub natives_dir: PathBuf,
    pub assets: Vec<DownloadUnit>,
    pub runtime: Vec<DownloadUnit>,
    /// Runtime files that need the executable bit, downloaded or not.
    pub runtime_executables: Vec<PathBuf>,
}

impl InstallPlan {
    /// Number of units that would hit the network.
    pub fn unit_count(&self) -> usize {
        usize::from(self.client.is_some())
            + self.libraries.len()
            + self.natives.len()
            + self.assets.len()
            + self.runtime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_count() == 0
    }
}

pub struct ArtifactPlanner {
    layout: InstallLayout,
    platform: Platform,
    downloader: Downloader,
    resources_url: String,
    runtime_manifest_url: String,
}

impl ArtifactPlanner {
    pub fn new(config: &LauncherConfig, downloader: Downloader) -> Self {
        Self {
            layout: config.layout(),
            platform: config.platform,
            downloader,
            resources_url: config.resources_url.clone(),
            runtime_manifest_url: config.runtime_manifest_url.clone(),
        }
    }

    /// Build the plan for `version`. Fetches the asset index and the runtime
    /// files-manifest when they are not cached yet.
    pub async fn plan(&self, version: &VersionJson) -> LauncherResult<InstallPlan> {
        info!("Planning {}", version.id);

        let natives_dir = self.layout.natives_dir(&version.downloads.client.sha1);

        let asset_index =
            AssetIndex::load(&version.asset_index, &self.layout, &self.downloader).await?;

        let component = version.runtime_component();
        let runtime_files = RuntimeFiles::load(
            self.downloader.fetcher().as_ref(),
            &self.runtime_manifest_url,
            &self.platform,
            component,
            &self.layout,
        )
        .await?;
        let runtime = runtime_files.plan(&self.layout.runtime_dir(component));

        let plan = InstallPlan {
            client: self.client_unit(version),
            libraries: self.library_units(version)?,
            natives: self.native_units(version, &natives_dir)?,
            natives_dir,
            assets: asset_index.missing_objects(&self.layout, &self.resources_url),
            runtime: runtime.units,
            runtime_executables: runtime.executables,
        };

        info!("{} has {} units to fetch", version.id, plan.unit_count());
        Ok(plan)
    }

    fn client_unit(&self, version: &VersionJson) -> Option<DownloadUnit> {
        let dest = self.layout.client_jar(&version.id);
        if dest.exists() {
            debug!("{} already has client file.", version.id);
            return None;
        }

        Some(DownloadUnit::new(
            format!("{} client", version.id),
            &version.downloads.client.url,
            dest,
            UnitCategory::LibraryArtifact,
        ))
    }

    fn library_units(&self, version: &VersionJson) -> LauncherResult<Vec<DownloadUnit>> {
        let mut seen = HashSet::new();
        let mut units = Vec::new();

        for library in &version.libraries {
            if !library.is_allowed(&self.platform) {
                debug!("{} skipping due rules...", library.name);
                continue;
            }
            let Some(artifact) = library.primary_artifact()? else {
                continue;
            };

            let dest = self.layout.library(&artifact.relative_path);
            if dest.exists() {
                debug!("{} already exists.", library.name);
                continue;
            }
            if !seen.insert(dest.clone()) {
                continue;
            }

            units.push(DownloadUnit::new(
                library.name.as_str(),
                artifact.url,
                dest,
                UnitCategory::LibraryArtifact,
            ));
        }

        Ok(units)
    }

    fn native_units(&self, version: &VersionJson, natives_dir: &Path) -> LauncherResult<Vec<NativeUnit>> {
        if has_entries(natives_dir) {
            debug!("Natives for {} already extracted in {:?}", version.id, natives_dir);
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for library in version.allowed_libraries(&self.platform) {
            let Some(artifact) = library.native_artifact(&self.platform)? else {
                continue;
            };

            let dest = self.layout.library(&artifact.relative_path);
            if !seen.insert(dest.clone()) {
                continue;
            }

            units.push(NativeUnit {
                download: DownloadUnit::new(
                    library.name.as_str(),
                    artifact.url,
                    dest,
                    UnitCategory::NativeArchive,
                ),
                extract: library.extract.clone(),
            });
        }

        Ok(units)
    }
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::core::error::LauncherError;
    use crate::core::http::Fetch;

    struct NoNetwork;

    #[async_trait]
    impl Fetch for NoNetwork {
        async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
            Err(LauncherError::Other(format!("offline: {}", url)))
        }
    }

    fn version() -> VersionJson {
        serde_json::from_value(serde_json::json!({
            "id": "1.12.2",
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "downloads": { "client": { "sha1": "0f275bc1547d01fa5f56ba34bdc87d981ee12daf", "url": "https://example.com/client.jar" } },
            "assetIndex": { "id": "1.12", "url": "https://example.com/1.12.json" },
            "libraries": [
                {
                    "name": "com.mojang:patchy:1.1",
                    "downloads": { "artifact": { "path": "com/mojang/patchy/1.1/patchy-1.1.jar", "url": "https://example.com/patchy.jar" } }
                },
                {
                    "name": "com.mojang:patchy:1.1",
                    "downloads": { "artifact": { "path": "com/mojang/patchy/1.1/patchy-1.1.jar", "url": "https://example.com/patchy.jar" } }
                },
                {
                    "name": "ca.weblite:java-objc-bridge:1.0.0",
                    "rules": [ { "action": "allow", "os": { "name": "osx" } } ],
                    "downloads": { "artifact": { "url": "https://example.com/objc.jar" } }
                },
                {
                    "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4-nightly-20150209",
                    "natives": { "linux": "natives-linux", "windows": "natives-windows", "osx": "natives-osx" },
                    "extract": { "exclude": ["META-INF/"] },
                    "downloads": { "classifiers": {
                        "natives-windows": { "url": "https://example.com/lwjgl-win.jar" },
                        "natives-linux": { "url": "https://example.com/lwjgl-linux.jar" },
                        "natives-osx": { "url": "https://example.com/lwjgl-osx.jar" }
                    } }
                }
            ]
        }))
        .unwrap()
    }

    fn planner(root: &Path) -> ArtifactPlanner {
        let config = LauncherConfig::new(root).with_platform(Platform::WINDOWS_X64);
        ArtifactPlanner::new(&config, Downloader::new(Arc::new(NoNetwork)))
    }

    #[test]
    fn libraries_follow_rules_and_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let units = planner(dir.path()).library_units(&version()).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "com.mojang:patchy:1.1");
        assert_eq!(
            units[0].dest,
            dir.path().join("libraries").join("com/mojang/patchy/1.1/patchy-1.1.jar")
        );
    }

    #[test]
    fn natives_use_platform_classifier_and_keep_extract_rules() {
        let dir = TempDir::new().unwrap();
        let natives_dir = dir.path().join("native_temp/sha");
        let units = planner(dir.path()).native_units(&version(), &natives_dir).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].download.url, "https://example.com/lwjgl-win.jar");
        assert_eq!(units[0].download.category, UnitCategory::NativeArchive);
        assert!(units[0]
            .download
            .dest
            .ends_with("lwjgl-platform-2.9.4-nightly-20150209-natives-windows.jar"));
        assert_eq!(units[0].extract, Some(ExtractRules::excluding(&["META-INF/"])));
    }

    #[test]
    fn natives_sharing_a_classifier_path_are_planned_once() {
        let dir = TempDir::new().unwrap();
        let natives_dir = dir.path().join("native_temp/sha");
        let mut version = version();
        let lwjgl = version.libraries[3].clone();
        version.libraries.push(lwjgl);

        let units = planner(dir.path()).native_units(&version, &natives_dir).unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn non_empty_natives_dir_skips_every_archive() {
        let dir = TempDir::new().unwrap();
        let natives_dir = dir.path().join("native_temp/sha");
        std::fs::create_dir_all(&natives_dir).unwrap();
        std::fs::write(natives_dir.join("lwjgl64.dll"), b"dll").unwrap();

        let units = planner(dir.path()).native_units(&version(), &natives_dir).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn existing_client_jar_is_not_planned() {
        let dir = TempDir::new().unwrap();
        let planner = planner(dir.path());
        assert!(planner.client_unit(&version()).is_some());

        let jar = dir.path().join("versions/1.12.2/1.12.2.jar");
        std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
        std::fs::write(&jar, b"jar").unwrap();
        assert!(planner.client_unit(&version()).is_none());
    }
}

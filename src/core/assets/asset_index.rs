use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::downloader::{DownloadUnit, Downloader, UnitCategory};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::InstallLayout;
use crate::core::version::AssetIndexInfo;

/// Top-level asset index JSON structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub size: Option<u64>,
}

impl AssetIndex {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read `assets/indexes/<id>.json`, downloading it first if absent.
    pub async fn load(
        info: &AssetIndexInfo,
        layout: &InstallLayout,
        downloader: &Downloader,
    ) -> LauncherResult<Self> {
        let path = layout.asset_index(&info.id);
        let unit = DownloadUnit::new(
            format!("asset index {}", info.id),
            &info.url,
            &path,
            UnitCategory::MetadataFile,
        );
        downloader.download_unit(&unit).await?;

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LauncherError::io(&path, e))?;
        Self::parse(&raw)
    }

    /// One content-addressed unit per distinct object hash whose file is not
    /// on disk yet.
    pub fn missing_objects(&self, layout: &InstallLayout, resources_url: &str) -> Vec<DownloadUnit> {
        let base = resources_url.trim_end_matches('/');
        let mut seen = HashSet::new();
        let mut units = Vec::new();

        for (name, object) in &self.objects {
            let dest = layout.asset_object(&object.hash);
            if dest.exists() {
                debug!("{} already exists.", name);
                continue;
            }
            if !seen.insert(object.hash.as_str()) {
                continue;
            }

            let bucket = object.hash.get(..2).unwrap_or(&object.hash);
            units.push(DownloadUnit::new(
                name.as_str(),
                format!("{}/{}/{}", base, bucket, object.hash),
                dest,
                UnitCategory::AssetObject,
            ));
        }

        info!(
            "{} asset objects to download ({} already cached)",
            units.len(),
            self.objects.len() - units.len()
        );
        units
    }
}

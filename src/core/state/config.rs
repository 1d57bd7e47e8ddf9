use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::layout::InstallLayout;
use crate::core::platform::Platform;

pub const VERSION_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest_v2.json";
pub const RUNTIME_MANIFEST_URL: &str = "https://launchermeta.mojang.com/v1/products/java-runtime/2ec0cc96c44e5a76b9c8b7c39df7210883d12871/all.json";
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

pub const LAUNCHER_NAME: &str = "Launchpad";
pub const LAUNCHER_VERSION: &str = "0.1.0";

/// Per-category worker counts for the download pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
    pub assets: usize,
    pub libraries: usize,
    pub natives: usize,
    pub runtime: usize,
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self {
            assets: 256,
            libraries: 10,
            natives: 10,
            runtime: 10,
        }
    }
}

/// Argument features the launcher turns on (`has_custom_resolution`,
/// `is_demo_user`, quick play flags...). Empty by default, which makes every
/// feature-gated argument inapplicable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: HashSet<String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(mut self, feature: impl Into<String>) -> Self {
        self.enabled.insert(feature.into());
        self
    }

    pub fn is_enabled(&self, feature: &str) -> bool {
        self.enabled.contains(feature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Everything the pipeline needs to know, passed explicitly to each component.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub install_root: PathBuf,
    pub platform: Platform,
    pub manifest_url: String,
    pub runtime_manifest_url: String,
    pub resources_url: String,
    pub launcher_name: String,
    pub launcher_version: String,
    pub max_memory_mb: u32,
    pub concurrency: ConcurrencyLimits,
    pub request_timeout: Option<Duration>,
    pub features: FeatureSet,
    pub resolution: Option<Resolution>,
}

impl LauncherConfig {
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            platform: Platform::current(),
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            runtime_manifest_url: RUNTIME_MANIFEST_URL.to_string(),
            resources_url: RESOURCES_URL.to_string(),
            launcher_name: LAUNCHER_NAME.to_string(),
            launcher_version: LAUNCHER_VERSION.to_string(),
            max_memory_mb: 2048,
            concurrency: ConcurrencyLimits::default(),
            request_timeout: None,
            features: FeatureSet::default(),
            resolution: None,
        }
    }

    /// `<data dir>/Launchpad`, falling back to the working directory.
    pub fn default_install_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(LAUNCHER_NAME)
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_memory_mb(mut self, max_memory_mb: u32) -> Self {
        self.max_memory_mb = max_memory_mb;
        self
    }

    /// Fixed window size. Turns on `has_custom_resolution` so the matching
    /// game arguments render.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some(Resolution { width, height });
        self.features = std::mem::take(&mut self.features).enable("has_custom_resolution");
        self
    }

    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install_root)
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }
}

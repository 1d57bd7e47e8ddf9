// ─── Launcher Facade ───
// The operations a front-end calls: list, install, launch. Each one threads
// the same `LauncherConfig` through the pipeline.

use std::process::Child;
use std::sync::Arc;

use tracing::info;

use crate::core::downloader::Downloader;
use crate::core::error::LauncherResult;
use crate::core::http::{Fetch, HttpFetcher};
use crate::core::install::{InstallReport, Installer};
use crate::core::launch::{self, LaunchPlan, SessionIdentity};
use crate::core::state::LauncherConfig;
use crate::core::version::{ManifestResolver, VersionCategory};

pub struct Launcher {
    config: LauncherConfig,
    resolver: ManifestResolver,
    installer: Installer,
}

impl Launcher {
    /// Launcher talking to the real endpoints over HTTP.
    pub fn new(config: LauncherConfig) -> LauncherResult<Self> {
        let fetcher = HttpFetcher::new(config.request_timeout)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: LauncherConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let resolver = ManifestResolver::new(&config, fetcher.clone());
        let installer = Installer::new(&config, Downloader::new(fetcher));
        Self {
            config,
            resolver,
            installer,
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ManifestResolver {
        &self.resolver
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    pub async fn list_versions(&self, category: VersionCategory, refresh: bool) -> LauncherResult<Vec<String>> {
        self.resolver.list(category, refresh).await
    }

    /// Stage everything `id` needs under the install root.
    pub async fn install_version(&self, id: &str) -> LauncherResult<InstallReport> {
        let version = self.resolver.resolve(id).await?;
        self.installer.install(&version).await
    }

    /// Launch plan for an installed release. Fails with `MetadataMissing`
    /// when `id` was never installed.
    pub async fn prepare_launch(&self, id: &str, player_name: &str) -> LauncherResult<LaunchPlan> {
        let version = self.resolver.installed(id).await?;
        LaunchPlan::prepare(&self.config, &version, &SessionIdentity::offline(player_name))
    }

    pub async fn launch_version(&self, id: &str, player_name: &str) -> LauncherResult<Child> {
        let plan = self.prepare_launch(id, player_name).await?;
        let child = launch::launch(&plan)?;
        info!("{} started as {} (pid {})", id, player_name, child.id());
        Ok(child)
    }

    /// Install, then launch.
    pub async fn play(&self, id: &str, player_name: &str) -> LauncherResult<Child> {
        self.install_version(id).await?;
        self.launch_version(id, player_name).await
    }
}

use std::collections::HashMap;
use std::path::Path;

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use super::planner::{ArtifactPlanner, InstallPlan, NativeUnit};
use crate::core::downloader::{DownloadUnit, Downloader, UnitCategory, UnitOutcome, UnitStatus};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java;
use crate::core::natives::ArchiveExtractor;
use crate::core::state::{ConcurrencyLimits, LauncherConfig};
use crate::core::version::VersionJson;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
}

/// What an install run did. The run itself succeeds even when some units
/// failed; inspect [`InstallReport::failed`] to find out.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub version_id: String,
    pub outcomes: Vec<UnitOutcome>,
    /// Archives unpacked into the native staging directory.
    pub natives_extracted: usize,
}

impl InstallReport {
    pub fn downloaded(&self) -> usize {
        self.count(|s| *s == UnitStatus::Downloaded)
    }

    pub fn already_present(&self) -> usize {
        self.count(|s| *s == UnitStatus::AlreadyPresent)
    }

    pub fn failed(&self) -> Vec<&UnitOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(UnitOutcome::succeeded)
    }

    pub fn by_category(&self) -> HashMap<UnitCategory, CategoryCounts> {
        let mut counts: HashMap<UnitCategory, CategoryCounts> = HashMap::new();
        for outcome in &self.outcomes {
            let entry = counts.entry(outcome.unit.category).or_default();
            match outcome.status {
                UnitStatus::Downloaded => entry.downloaded += 1,
                UnitStatus::AlreadyPresent => entry.already_present += 1,
                UnitStatus::Failed(_) => entry.failed += 1,
            }
        }
        counts
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Runs a plan: downloads every unit with the per-category pool width,
/// then unpacks the native archives.
pub struct Installer {
    planner: ArtifactPlanner,
    downloader: Downloader,
    extractor: ArchiveExtractor,
    limits: ConcurrencyLimits,
}

impl Installer {
    pub fn new(config: &LauncherConfig, downloader: Downloader) -> Self {
        Self {
            planner: ArtifactPlanner::new(config, downloader.clone()),
            downloader,
            extractor: ArchiveExtractor::new(),
            limits: config.concurrency,
        }
    }

    pub fn planner(&self) -> &ArtifactPlanner {
        &self.planner
    }

    pub async fn install(&self, version: &VersionJson) -> LauncherResult<InstallReport> {
        info!("Installing {}", version.id);
        let plan = self.planner.plan(version).await?;
        self.execute_plan(&version.id, plan).await
    }

    pub async fn execute_plan(&self, version_id: &str, plan: InstallPlan) -> LauncherResult<InstallReport> {
        let mut report = InstallReport {
            version_id: version_id.to_string(),
            ..Default::default()
        };

        let InstallPlan {
            client,
            libraries,
            natives,
            natives_dir,
            assets,
            runtime,
            runtime_executables,
        } = plan;

        // 1. Client jar + libraries
        let jars: Vec<DownloadUnit> = client.into_iter().chain(libraries).collect();
        report
            .outcomes
            .extend(self.downloader.execute(jars, self.limits.libraries).await);

        // 2. Asset objects
        report
            .outcomes
            .extend(self.downloader.execute(assets, self.limits.assets).await);

        // 3. Native archives
        tokio::fs::create_dir_all(&natives_dir)
            .await
            .map_err(|e| LauncherError::io(&natives_dir, e))?;
        let (outcomes, extracted) = self.stage_natives(natives, &natives_dir).await;
        report.outcomes.extend(outcomes);
        report.natives_extracted = extracted;

        // 4. Managed runtime
        report
            .outcomes
            .extend(self.downloader.execute(runtime, self.limits.runtime).await);
        java::mark_executables(&runtime_executables).await?;

        let failed = report.failed().len();
        if failed > 0 {
            warn!("{} installed with {} failed units", version_id, failed);
            for (category, counts) in report.by_category().iter().filter(|(_, c)| c.failed > 0) {
                warn!("  {}: {} failed", category, counts.failed);
            }
        } else {
            info!(
                "{} installed ({} downloaded, {} already present)",
                version_id,
                report.downloaded(),
                report.already_present()
            );
        }
        Ok(report)
    }

    /// Download each archive into `libraries/`, then unpack it. An archive
    /// that fails either step is reported as a failed unit.
    async fn stage_natives(&self, natives: Vec<NativeUnit>, natives_dir: &Path) -> (Vec<UnitOutcome>, usize) {
        let results: Vec<(UnitOutcome, bool)> = stream::iter(natives)
            .map(|native| async move {
                let (status, extracted) = match self.stage_native(&native, natives_dir).await {
                    Ok(status) => {
                        info!("{} downloaded and extracted.", native.download.name);
                        (status, true)
                    }
                    Err(e) => {
                        warn!("{} failed: {}", native.download.name, e);
                        (UnitStatus::Failed(e.to_string()), false)
                    }
                };
                let outcome = UnitOutcome {
                    unit: native.download,
                    status,
                };
                (outcome, extracted)
            })
            .buffer_unordered(self.limits.natives.max(1))
            .collect()
            .await;

        let extracted = results.iter().filter(|(_, ok)| *ok).count();
        (results.into_iter().map(|(outcome, _)| outcome).collect(), extracted)
    }

    async fn stage_native(&self, native: &NativeUnit, natives_dir: &Path) -> LauncherResult<UnitStatus> {
        let status = self.downloader.download_unit(&native.download).await?;

        let archive_path = &native.download.dest;
        let bytes = tokio::fs::read(archive_path)
            .await
            .map_err(|e| LauncherError::io(archive_path, e))?;
        self.extractor
            .extract(bytes, natives_dir, native.extract.as_ref())
            .await?;

        Ok(status)
    }
}

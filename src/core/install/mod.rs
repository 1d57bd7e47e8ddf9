pub mod installer;
pub mod planner;

pub use installer::{CategoryCounts, InstallReport, Installer};
pub use planner::{ArtifactPlanner, InstallPlan, NativeUnit};

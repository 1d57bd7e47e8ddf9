pub mod config;
pub mod layout;

pub use config::{ConcurrencyLimits, FeatureSet, LauncherConfig, Resolution};
pub use layout::InstallLayout;

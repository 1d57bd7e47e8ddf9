pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::commands::Launcher;
pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::install::InstallReport;
pub use crate::core::launch::LaunchPlan;
pub use crate::core::platform::Platform;
pub use crate::core::state::{InstallLayout, LauncherConfig};
pub use crate::core::version::VersionCategory;

/// Install the global `tracing` subscriber. `RUST_LOG` wins when set.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,launchpad=debug"
    } else {
        "info,launchpad=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

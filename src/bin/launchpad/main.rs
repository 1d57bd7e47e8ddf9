//! Launchpad CLI - install and launch Minecraft releases

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use launchpad::{Launcher, LauncherConfig};

mod cli;

use cli::{Cli, Commands, LaunchArgs};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    launchpad::init_tracing(cli.verbose);

    let root = cli
        .root
        .clone()
        .unwrap_or_else(LauncherConfig::default_install_root);
    let mut config = LauncherConfig::new(root)
        .with_request_timeout(cli.timeout_secs.map(Duration::from_secs));

    match cli.command {
        Commands::List(args) => {
            let launcher = Launcher::new(config)?;
            for id in launcher.list_versions(args.category.into(), args.refresh).await? {
                println!("{}", id);
            }
        }
        Commands::Install(args) => {
            let launcher = Launcher::new(config)?;
            let report = launcher
                .install_version(&args.id)
                .await
                .with_context(|| format!("failed to install {}", args.id))?;
            for outcome in report.failed() {
                eprintln!("failed: {} ({})", outcome.unit.name, outcome.unit.url);
            }
            println!(
                "{}: {} downloaded, {} already present, {} failed",
                report.version_id,
                report.downloaded(),
                report.already_present(),
                report.failed().len()
            );
        }
        Commands::Launch(args) => {
            config = apply_launch_args(config, &args);
            let launcher = Launcher::new(config)?;
            wait(launcher.launch_version(&args.id, &args.player).await, &args.id)?;
        }
        Commands::Play(args) => {
            config = apply_launch_args(config, &args);
            let launcher = Launcher::new(config)?;
            wait(launcher.play(&args.id, &args.player).await, &args.id)?;
        }
    }

    Ok(())
}

fn apply_launch_args(mut config: LauncherConfig, args: &LaunchArgs) -> LauncherConfig {
    if let Some(memory) = args.memory {
        config = config.with_max_memory_mb(memory);
    }
    if let Some(size) = args.resolution {
        config = config.with_resolution(size.width, size.height);
    }
    config
}

fn wait(child: launchpad::LauncherResult<std::process::Child>, id: &str) -> Result<()> {
    let mut child = match child {
        Ok(child) => child,
        Err(e) if e.is_not_found() => bail!("{} is not available: {}", id, e),
        Err(e) => return Err(e).with_context(|| format!("failed to launch {}", id)),
    };

    let status = child.wait().context("failed to wait for the game process")?;
    if !status.success() {
        bail!("{} exited with {}", id, status);
    }
    Ok(())
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use launchpad::VersionCategory;

/// Launchpad - install and launch Minecraft releases
#[derive(Parser)]
#[command(name = "launchpad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Install root (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List release ids from the version manifest
    List(ListArgs),

    /// Download everything a release needs
    Install(InstallArgs),

    /// Launch an installed release
    Launch(LaunchArgs),

    /// Install a release, then launch it
    Play(LaunchArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list releases of this category
    #[arg(long, value_enum, default_value_t = CategoryArg::All)]
    pub category: CategoryArg,

    /// Re-fetch the manifest instead of using the cached copy
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Release id, e.g. 1.20.4
    pub id: String,
}

#[derive(Args)]
pub struct LaunchArgs {
    /// Release id, e.g. 1.20.4
    pub id: String,

    /// Player display name
    #[arg(long, default_value = "Player")]
    pub player: String,

    /// Maximum heap in megabytes
    #[arg(long)]
    pub memory: Option<u32>,

    /// Window size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_resolution)]
    pub resolution: Option<WindowSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    All,
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl From<CategoryArg> for VersionCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::All => VersionCategory::All,
            CategoryArg::Release => VersionCategory::Release,
            CategoryArg::Snapshot => VersionCategory::Snapshot,
            CategoryArg::OldBeta => VersionCategory::OldBeta,
            CategoryArg::OldAlpha => VersionCategory::OldAlpha,
        }
    }
}

fn parse_resolution(raw: &str) -> Result<WindowSize, String> {
    let (width, height) = raw
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", raw))?;
    let width = width.parse().map_err(|_| format!("invalid width '{}'", width))?;
    let height = height.parse().map_err(|_| format!("invalid height '{}'", height))?;
    Ok(WindowSize { width, height })
}

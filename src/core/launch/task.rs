// ─── Launch Task ───
// Builds the launch plan for an installed release and spawns the runtime.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use tracing::{debug, info};

use super::arguments::{assemble, launch_substitutions, LaunchArguments, SessionIdentity};
use super::classpath::{build_classpath, join_classpath, safe_path_str};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::LauncherConfig;
use crate::core::version::VersionJson;

/// Everything needed to start the game process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub executable_path: PathBuf,
    pub working_directory: PathBuf,
    pub classpath_entries: Vec<PathBuf>,
    pub natives_dir: PathBuf,
    pub arguments: LaunchArguments,
}

impl LaunchPlan {
    pub fn prepare(
        config: &LauncherConfig,
        version: &VersionJson,
        identity: &SessionIdentity,
    ) -> LauncherResult<Self> {
        let layout = config.layout();
        let platform = &config.platform;

        let classpath_entries = build_classpath(version, &layout, platform)?;
        let classpath = join_classpath(&classpath_entries, platform.classpath_separator);
        let natives_dir = layout.natives_dir(&version.downloads.client.sha1);

        let subs = launch_substitutions(config, version, identity, &classpath, &natives_dir);
        let arguments = assemble(version, &subs, config);

        Ok(Self {
            executable_path: layout
                .java_executable(version.runtime_component(), platform.java_executable),
            working_directory: layout.root().to_path_buf(),
            classpath_entries,
            natives_dir,
            arguments,
        })
    }

    pub fn argv(&self) -> &[String] {
        &self.arguments.argv
    }
}

/// Spawn `plan` and return without waiting. Output is inherited.
pub fn launch(plan: &LaunchPlan) -> LauncherResult<Child> {
    spawn(
        &plan.executable_path,
        &plan.working_directory,
        &plan.arguments,
        Some(&plan.natives_dir),
    )
}

pub fn spawn(
    executable: &Path,
    working_dir: &Path,
    arguments: &LaunchArguments,
    natives_dir: Option<&Path>,
) -> LauncherResult<Child> {
    if !executable.is_file() {
        return Err(LauncherError::ExecutableMissing(executable.to_path_buf()));
    }

    let mut cmd = Command::new(executable);
    apply_arguments(&mut cmd, arguments);
    cmd.current_dir(working_dir);
    if let Some(natives_dir) = natives_dir {
        configure_native_library_env(&mut cmd, natives_dir);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    info!("Launching with Java: {:?}", executable);
    debug!("Command (copy/paste): {:?} {}", executable, display_command_line(arguments));

    cmd.spawn().map_err(|source| LauncherError::Spawn {
        path: executable.to_path_buf(),
        source,
    })
}

#[cfg(target_os = "windows")]
fn apply_arguments(cmd: &mut Command, arguments: &LaunchArguments) {
    cmd.raw_arg(&arguments.command_line);
}

#[cfg(not(target_os = "windows"))]
fn apply_arguments(cmd: &mut Command, arguments: &LaunchArguments) {
    cmd.args(&arguments.argv);
}

#[cfg(target_os = "windows")]
fn display_command_line(arguments: &LaunchArguments) -> String {
    arguments.command_line.clone()
}

/// Shell-quoted so the logged line can be pasted into a terminal.
#[cfg(not(target_os = "windows"))]
fn display_command_line(arguments: &LaunchArguments) -> String {
    shlex::try_join(arguments.argv.iter().map(String::as_str))
        .unwrap_or_else(|_| arguments.command_line.clone())
}

fn configure_native_library_env(cmd: &mut Command, natives_dir: &Path) {
    let native_path = safe_path_str(natives_dir);

    let var = if cfg!(target_os = "windows") {
        "PATH"
    } else if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    };
    cmd.env(var, append_env_path(var, &native_path));
}

fn append_env_path(var_name: &str, value: &str) -> String {
    let separator = if cfg!(target_os = "windows") { ";" } else { ":" };
    match std::env::var(var_name) {
        Ok(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, separator, existing)
        }
        _ => value.to_string(),
    }
}

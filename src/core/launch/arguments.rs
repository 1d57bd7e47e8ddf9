// ─── Argument Templates ───
// Expands `${placeholder}` tokens in the JVM and game argument templates of a
// release and assembles the final command line.

use std::path::Path;

use tracing::debug;
use uuid::Uuid;

use super::classpath::safe_path_str;
use crate::core::platform::Platform;
use crate::core::state::LauncherConfig;
use crate::core::version::{is_applicable, ArgumentTemplate, RuleContext, VersionJson};

/// Appended when the rendered JVM arguments carry no classpath flag, after
/// the platform's legacy flags.
const DEFAULT_JVM_ARGS: &[&str] = &[
    "-Djava.library.path=${natives_directory}",
    "-Dminecraft.launcher.brand=${launcher_name}",
    "-Dminecraft.launcher.version=${launcher_version}",
    "-Dminecraft.client.jar=${client_jar_path}",
    "-cp",
    "${classpath}",
];

const G1_TUNING_ARGS: &[&str] = &[
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+UseG1GC",
    "-XX:G1NewSizePercent=20",
    "-XX:G1ReservePercent=20",
    "-XX:MaxGCPauseMillis=50",
    "-XX:G1HeapRegionSize=32M",
];

const CLASSPATH_FLAGS: &[&str] = &["-cp", "-classpath", "--class-path"];

/// Placeholder bindings, applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    entries: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `${name}` to `value`, replacing an earlier binding of the same name.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let token = format!("${{{}}}", name);
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let token = format!("${{{}}}", name);
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every bound token in `value`. Unknown tokens are left as is.
    pub fn apply(&self, value: &str) -> String {
        self.entries
            .iter()
            .filter(|(token, _)| value.contains(token.as_str()))
            .fold(value.to_string(), |acc, (token, bound)| acc.replace(token.as_str(), bound))
    }
}

/// Substitute one argument value. A result containing whitespace is wrapped
/// in double quotes unless `raw` is set.
pub fn substitute(value: &str, subs: &Substitutions, raw: bool) -> String {
    let resolved = subs.apply(value);
    if raw {
        resolved
    } else {
        quote(resolved)
    }
}

fn quote(value: String) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{}\"", value)
    } else {
        value
    }
}

/// Render templates whose rules apply, in order. List values contribute one
/// argument per element.
pub fn render(templates: &[ArgumentTemplate], subs: &Substitutions, ctx: &RuleContext<'_>) -> Vec<String> {
    expand(templates, subs, ctx).into_iter().map(quote).collect()
}

/// Like [`render`], without quoting: one argv element per value.
fn expand(templates: &[ArgumentTemplate], subs: &Substitutions, ctx: &RuleContext<'_>) -> Vec<String> {
    let mut expanded = Vec::new();

    for template in templates {
        if !is_applicable(template.rules(), ctx) {
            debug!("{:?} skipping due rules...", template.values());
            continue;
        }
        expanded.extend(template.values().into_iter().map(|v| subs.apply(v)));
    }

    expanded
}

fn has_classpath_flag(args: &[String]) -> bool {
    args.iter().any(|arg| CLASSPATH_FLAGS.contains(&arg.as_str()))
}

/// Fallback JVM arguments for releases without a usable classpath flag.
pub fn default_jvm_args(platform: &Platform) -> impl Iterator<Item = &'static str> {
    platform
        .legacy_jvm_args
        .iter()
        .chain(DEFAULT_JVM_ARGS.iter())
        .copied()
}

pub fn tuning_args(max_memory_mb: u32) -> Vec<String> {
    std::iter::once(format!("-Xmx{}M", max_memory_mb))
        .chain(G1_TUNING_ARGS.iter().map(|a| a.to_string()))
        .collect()
}

/// Assembled launch arguments in the two shapes a process needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArguments {
    /// One element per process argument, nothing quoted.
    pub argv: Vec<String>,
    /// Single command-line string, values with whitespace quoted and the
    /// legacy blob appended raw. Handed to the process verbatim on Windows.
    pub command_line: String,
}

/// Full argument list: JVM arguments (or the defaults), heap and GC tuning,
/// main class, game arguments, then the legacy `minecraftArguments` blob.
pub fn assemble(version: &VersionJson, subs: &Substitutions, config: &LauncherConfig) -> LaunchArguments {
    let jvm_ctx = RuleContext::jvm_argument(&config.platform, &config.features);
    let game_ctx = RuleContext::argument(&config.platform, &config.features);

    let mut argv = expand(version.jvm_templates(), subs, &jvm_ctx);
    if !has_classpath_flag(&argv) {
        debug!("{} declares no classpath flag, using default JVM arguments", version.id);
        argv.extend(default_jvm_args(&config.platform).map(|a| subs.apply(a)));
    }

    argv.extend(tuning_args(config.max_memory_mb));
    argv.push(version.main_class.clone());
    argv.extend(expand(version.game_templates(), subs, &game_ctx));

    let mut line: Vec<String> = argv.iter().cloned().map(quote).collect();

    if let Some(legacy) = &version.minecraft_arguments {
        line.push(substitute(legacy, subs, true));
        // Split the template, not the result, so bound values stay whole.
        argv.extend(legacy.split_whitespace().map(|token| subs.apply(token)));
    }

    LaunchArguments {
        argv,
        command_line: line.join(" "),
    }
}

/// Per-launch identity. Offline play: random ids, no access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub player_name: String,
    pub session_id: String,
    pub client_id: String,
    pub xuid: String,
}

impl SessionIdentity {
    pub fn offline(player_name: impl Into<String>) -> Self {
        // Top bit cleared so the token is a non-negative i64.
        let xuid = (Uuid::new_v4().as_u128() as u64) >> 1;
        Self {
            player_name: player_name.into(),
            session_id: Uuid::new_v4().simple().to_string(),
            client_id: Uuid::new_v4().simple().to_string(),
            xuid: xuid.to_string(),
        }
    }
}

/// Every placeholder a vanilla release uses, bound for one launch.
pub fn launch_substitutions(
    config: &LauncherConfig,
    version: &VersionJson,
    identity: &SessionIdentity,
    classpath: &str,
    natives_dir: &Path,
) -> Substitutions {
    let layout = config.layout();
    let index_id = &version.asset_index.id;

    let mut subs = Substitutions::new();
    subs.bind("auth_player_name", &identity.player_name)
        .bind("version_name", &version.id)
        .bind("game_directory", safe_path_str(layout.root()))
        .bind("assets_root", safe_path_str(&layout.assets_dir()))
        .bind("client_jar_path", safe_path_str(&layout.client_jar(&version.id)))
        .bind("game_assets", safe_path_str(&layout.virtual_assets_dir(index_id)))
        .bind("assets_index_name", index_id)
        .bind("auth_uuid", &identity.session_id)
        .bind("auth_access_token", "null")
        .bind("auth_session", "token:null")
        .bind("clientid", &identity.client_id)
        .bind("auth_xuid", &identity.xuid)
        .bind("user_type", "msa")
        .bind("user_properties", "{}")
        .bind("version_type", &version.version_type)
        .bind("natives_directory", safe_path_str(natives_dir))
        .bind("library_directory", safe_path_str(&layout.libraries_dir()))
        .bind("classpath_separator", config.platform.classpath_separator)
        .bind("launcher_name", &config.launcher_name)
        .bind("launcher_version", &config.launcher_version)
        .bind("classpath", classpath);

    if let Some(resolution) = config.resolution {
        subs.bind("resolution_width", resolution.width.to_string())
            .bind("resolution_height", resolution.height.to_string());
    }

    subs
}

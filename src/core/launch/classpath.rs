// ─── Classpath Builder ───
// Library jars in declaration order, then the client jar. No path appears
// twice.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::LauncherResult;
use crate::core::platform::Platform;
use crate::core::state::InstallLayout;
use crate::core::version::VersionJson;

/// Ordered, de-duplicated classpath entries for `version`.
pub fn build_classpath(
    version: &VersionJson,
    layout: &InstallLayout,
    platform: &Platform,
) -> LauncherResult<Vec<PathBuf>> {
    let mut entries = Vec::new();

    for library in version.allowed_libraries(platform) {
        if let Some(artifact) = library.primary_artifact()? {
            entries.push(layout.library(&artifact.relative_path));
        }
    }
    entries.push(layout.client_jar(&version.id));

    let before = entries.len();
    dedup_preserving_order(&mut entries);
    if entries.len() != before {
        debug!("Dropped {} duplicate classpath entries", before - entries.len());
    }

    Ok(entries)
}

/// Join entries with the platform separator.
pub fn join_classpath(entries: &[PathBuf], separator: &str) -> String {
    entries
        .iter()
        .map(|entry| safe_path_str(entry))
        .collect::<Vec<_>>()
        .join(separator)
}

fn dedup_preserving_order(entries: &mut Vec<PathBuf>) {
    let mut seen = HashSet::new();
    entries.retain(|entry| {
        let key = if cfg!(target_os = "windows") {
            entry.to_string_lossy().to_lowercase()
        } else {
            entry.to_string_lossy().to_string()
        };
        seen.insert(key)
    });
}

/// Path as a launch argument. Strips the `\\?\` prefix on Windows, which the
/// JVM classpath parser does not understand.
pub fn safe_path_str(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

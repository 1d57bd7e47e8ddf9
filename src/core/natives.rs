// ─── Native Extraction ───
// Unpacks classifier archives into the per-release native staging directory.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// The `extract` block of a library: substring filters on entry paths.
/// When `exclude` is present it wins and `include` is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ExtractRules {
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
}

impl ExtractRules {
    pub fn excluding(patterns: &[&str]) -> Self {
        Self {
            exclude: Some(patterns.iter().map(|p| p.to_string()).collect()),
            include: None,
        }
    }

    pub fn including(patterns: &[&str]) -> Self {
        Self {
            exclude: None,
            include: Some(patterns.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn accepts(&self, entry_name: &str) -> bool {
        if let Some(exclude) = &self.exclude {
            return !exclude.iter().any(|p| entry_name.contains(p.as_str()));
        }
        if let Some(include) = &self.include {
            return include.iter().any(|p| entry_name.contains(p.as_str()));
        }
        true
    }
}

/// Extracts zip archives, serializing file writes per destination root so
/// several archives can be unpacked into the same tree concurrently.
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractor {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, root: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(root.to_path_buf()).or_default().clone()
    }

    /// Unpack `archive` into `dest`, returning how many files were written.
    pub async fn extract(
        &self,
        archive: Vec<u8>,
        dest: &Path,
        rules: Option<&ExtractRules>,
    ) -> LauncherResult<usize> {
        let lock = self.lock_for(dest);
        let dest = dest.to_path_buf();
        let rules = rules.cloned();

        tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest, rules.as_ref(), &lock))
            .await
            .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))?
    }
}

fn extract_blocking(
    bytes: &[u8],
    dest: &Path,
    rules: Option<&ExtractRules>,
    lock: &Mutex<()>,
) -> LauncherResult<usize> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut written = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        if rules.is_some_and(|r| !r.accepts(&name)) {
            debug!("Skipping {} (extract rules)", name);
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path: {}", name);
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| LauncherError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }

        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = std::fs::File::create(&out_path).map_err(|e| LauncherError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| LauncherError::io(&out_path, e))?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn include_rules_skip_other_platforms() {
        let rules = ExtractRules::including(&["windows"]);
        assert!(!rules.accepts("natives/linux/libX.so"));
        assert!(rules.accepts("natives/windows/x.dll"));
    }

    #[test]
    fn exclude_rules_skip_meta_inf() {
        let rules = ExtractRules::excluding(&["META-INF"]);
        assert!(!rules.accepts("META-INF/MANIFEST.MF"));
        assert!(rules.accepts("lwjgl64.dll"));
    }

    #[test]
    fn exclude_takes_precedence_over_include() {
        let rules = ExtractRules {
            exclude: Some(vec!["META-INF".into()]),
            include: Some(vec!["nothing-matches".into()]),
        };
        assert!(rules.accepts("lwjgl64.dll"));
    }

    #[tokio::test]
    async fn extract_honours_rules_and_creates_directories() {
        let dir = TempDir::new().unwrap();
        let bytes = archive(&[
            ("META-INF/", b""),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
            ("lwjgl64.dll", b"dll"),
            ("sub/", b""),
            ("sub/OpenAL64.dll", b"openal"),
        ]);

        let written = ArchiveExtractor::new()
            .extract(bytes, dir.path(), Some(&ExtractRules::excluding(&["META-INF/"])))
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert!(dir.path().join("lwjgl64.dll").is_file());
        assert!(dir.path().join("sub/OpenAL64.dll").is_file());
        assert!(!dir.path().join("META-INF").exists());
    }

    #[tokio::test]
    async fn concurrent_extractions_into_one_root() {
        let dir = TempDir::new().unwrap();
        let extractor = ArchiveExtractor::new();
        let a = archive(&[("shared/a.dll", b"a"), ("common.txt", b"same")]);
        let b = archive(&[("shared/b.dll", b"b"), ("common.txt", b"same")]);

        let (ra, rb) = tokio::join!(
            extractor.extract(a, dir.path(), None),
            extractor.extract(b, dir.path(), None)
        );

        assert_eq!(ra.unwrap(), 2);
        assert_eq!(rb.unwrap(), 2);
        assert!(dir.path().join("shared/a.dll").is_file());
        assert!(dir.path().join("shared/b.dll").is_file());
        assert_eq!(std::fs::read(dir.path().join("common.txt")).unwrap(), b"same");
    }

    #[tokio::test]
    async fn corrupt_archive_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = ArchiveExtractor::new()
            .extract(b"not a zip".to_vec(), dir.path(), None)
            .await;
        assert!(matches!(result, Err(LauncherError::Zip(_))));
    }
}

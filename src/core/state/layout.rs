use std::path::{Path, PathBuf};

const MANIFEST_CACHE_FILE: &str = "version_manifest_v2.json";

/// On-disk layout of an install root. Every path is a pure function of the
/// root plus a logical identity (release id, hash, coordinate, file name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    /// Last successfully fetched top-level manifest.
    pub fn manifest_cache(&self) -> PathBuf {
        self.versions_dir().join(MANIFEST_CACHE_FILE)
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn version_json(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.json", id))
    }

    pub fn client_jar(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.jar", id))
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    pub fn library(&self, relative_path: &str) -> PathBuf {
        self.libraries_dir().join(relative_path)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_index(&self, index_id: &str) -> PathBuf {
        self.assets_dir()
            .join("indexes")
            .join(format!("{}.json", index_id))
    }

    /// `assets/objects/<hash[0:2]>/<hash>`.
    pub fn asset_object(&self, hash: &str) -> PathBuf {
        let bucket = hash.get(..2).unwrap_or(hash);
        self.assets_dir().join("objects").join(bucket).join(hash)
    }

    pub fn virtual_assets_dir(&self, index_id: &str) -> PathBuf {
        self.assets_dir().join("virtual").join(index_id)
    }

    /// Native staging directory, keyed by the client jar's SHA-1.
    pub fn natives_dir(&self, client_sha1: &str) -> PathBuf {
        self.root.join("native_temp").join(client_sha1)
    }

    pub fn runtime_dir(&self, component: &str) -> PathBuf {
        self.root.join("runtime").join(component)
    }

    /// Last fetched files-manifest of a runtime component.
    pub fn runtime_manifest_cache(&self, component: &str) -> PathBuf {
        self.root.join("runtime").join(format!("{}.json", component))
    }

    pub fn java_executable(&self, component: &str, executable: &str) -> PathBuf {
        self.runtime_dir(component).join("bin").join(executable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_objects_are_bucketed_by_hash_prefix() {
        let layout = InstallLayout::new("/games");
        let path = layout.asset_object("bdf48ef6b5d0d23bbb02e17d04865216179f510a");
        assert_eq!(
            path,
            PathBuf::from("/games/assets/objects/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a")
        );
    }

    #[test]
    fn version_files_live_under_their_id() {
        let layout = InstallLayout::new("/games");
        assert_eq!(
            layout.version_json("1.20.4"),
            PathBuf::from("/games/versions/1.20.4/1.20.4.json")
        );
        assert_eq!(
            layout.client_jar("1.20.4"),
            PathBuf::from("/games/versions/1.20.4/1.20.4.jar")
        );
    }

    #[test]
    fn runtime_executable_path() {
        let layout = InstallLayout::new("/games");
        assert_eq!(
            layout.java_executable("java-runtime-gamma", "javaw.exe"),
            PathBuf::from("/games/runtime/java-runtime-gamma/bin/javaw.exe")
        );
    }
}

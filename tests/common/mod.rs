#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use launchpad::core::http::Fetch;
use launchpad::{Launcher, LauncherConfig, LauncherError, LauncherResult};
use serde_json::json;
use zip::write::SimpleFileOptions;

pub const MANIFEST_URL: &str = "mem://meta/version_manifest_v2.json";
pub const RUNTIME_INDEX_URL: &str = "mem://meta/java-runtime/all.json";
pub const RESOURCES_URL: &str = "mem://resources";

pub const MODERN: &str = "1.20.4";
pub const LEGACY: &str = "1.8.9";
pub const CLIENT_SHA1: &str = "fd19469fed4a4b4c15b2d5133985f0e3e7816a8a";
pub const LEGACY_CLIENT_SHA1: &str = "3870888a6c3d349d3771a3e9d16c9bf5e076b908";

pub const ICON_HASH: &str = "bdf48ef6b5d0d23bbb02e17d04865216179f510a";
pub const SOUND_HASH: &str = "5d1d1a1d4c2ae08ef8e1ea2f3d1fb3a7b6ba4f0f";

/// In-memory `Fetch` with a switch that cuts the network.
#[derive(Default)]
pub struct MemoryFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl MemoryFetcher {
    pub fn insert(&self, url: &str, bytes: impl Into<Vec<u8>>) {
        self.files.lock().unwrap().insert(url.to_string(), bytes.into());
    }

    pub fn remove(&self, url: &str) {
        self.files.lock().unwrap().remove(url);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn requests_for(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for MemoryFetcher {
    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(LauncherError::Other(format!("network unavailable: {}", url)));
        }
        self.files
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| LauncherError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn natives_archive(os: &str) -> Vec<u8> {
    let library = format!("{}/liblwjgl.bin", os);
    zip_archive(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
        (library.as_str(), b"native"),
    ])
}

fn modern_metadata() -> serde_json::Value {
    json!({
        "id": MODERN,
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "javaVersion": { "component": "java-runtime-gamma", "majorVersion": 17 },
        "downloads": { "client": { "sha1": CLIENT_SHA1, "url": "mem://client/1.20.4.jar" } },
        "assetIndex": { "id": "12", "url": "mem://indexes/12.json" },
        "libraries": [
            { "name": "com.mojang:brigadier:1.2.9",
              "downloads": { "artifact": { "path": "com/mojang/brigadier/1.2.9/brigadier-1.2.9.jar", "url": "mem://libs/brigadier.jar" } } },
            { "name": "com.mojang:brigadier:1.2.9",
              "downloads": { "artifact": { "url": "mem://libs/brigadier.jar" } } },
            { "name": "org.lwjgl:lwjgl:3.3.2",
              "downloads": { "artifact": { "path": "org/lwjgl/lwjgl/3.3.2/lwjgl-3.3.2.jar", "url": "mem://libs/lwjgl.jar" } } }
        ],
        "arguments": {
            "game": [
                "--username", "${auth_player_name}",
                "--version", "${version_name}",
                "--gameDir", "${game_directory}",
                "--assetIndex", "${assets_index_name}",
                { "rules": [ { "action": "allow", "features": { "has_custom_resolution": true } } ],
                  "value": [ "--width", "${resolution_width}", "--height", "${resolution_height}" ] }
            ],
            "jvm": [
                { "rules": [ { "action": "allow", "os": { "name": "osx" } } ], "value": [ "-XstartOnFirstThread" ] },
                "-Djava.library.path=${natives_directory}",
                "-cp",
                "${classpath}"
            ]
        }
    })
}

fn legacy_metadata() -> serde_json::Value {
    json!({
        "id": LEGACY,
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "javaVersion": { "component": "jre-legacy", "majorVersion": 8 },
        "downloads": { "client": { "sha1": LEGACY_CLIENT_SHA1, "url": "mem://client/1.8.9.jar" } },
        "assetIndex": { "id": "1.8", "url": "mem://indexes/1.8.json" },
        "libraries": [
            { "name": "com.mojang:netty:1.8.8",
              "downloads": { "artifact": { "path": "com/mojang/netty/1.8.8/netty-1.8.8.jar", "url": "mem://libs/netty.jar" } } },
            { "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4-nightly-20150209",
              "natives": { "linux": "natives-linux", "windows": "natives-windows", "osx": "natives-osx" },
              "extract": { "exclude": [ "META-INF/" ] },
              "downloads": { "classifiers": {
                  "natives-linux": { "url": "mem://natives/linux.jar" },
                  "natives-windows": { "url": "mem://natives/windows.jar" },
                  "natives-osx": { "url": "mem://natives/osx.jar" }
              } } }
        ],
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --gameDir ${game_directory} --assetIndex ${assets_index_name} --accessToken ${auth_access_token}"
    })
}

fn runtime_files(component: &str) -> serde_json::Value {
    json!({
        "files": {
            "bin": { "type": "directory" },
            "bin/java": { "type": "file", "executable": true,
                          "downloads": { "raw": { "url": format!("mem://runtime/{}/java", component) } } },
            "bin/javaw.exe": { "type": "file", "executable": true,
                               "downloads": { "raw": { "url": format!("mem://runtime/{}/javaw.exe", component) } } },
            "lib/modules": { "type": "file",
                             "downloads": { "raw": { "url": format!("mem://runtime/{}/modules", component) } } }
        }
    })
}

pub fn manifest_json() -> String {
    json!({
        "latest": { "release": MODERN, "snapshot": "24w03a" },
        "versions": [
            { "id": "24w03a", "type": "snapshot", "url": "mem://versions/24w03a.json" },
            { "id": MODERN, "type": "release", "url": "mem://versions/1.20.4.json" },
            { "id": LEGACY, "type": "release", "url": "mem://versions/1.8.9.json" },
            { "id": "b1.7.3", "type": "old_beta", "url": "mem://versions/b1.7.3.json" }
        ]
    })
    .to_string()
}

/// A fetcher serving a small but complete release catalogue.
pub fn catalogue() -> Arc<MemoryFetcher> {
    let fetcher = Arc::new(MemoryFetcher::default());

    fetcher.insert(MANIFEST_URL, manifest_json());
    fetcher.insert("mem://versions/1.20.4.json", modern_metadata().to_string());
    fetcher.insert("mem://versions/1.8.9.json", legacy_metadata().to_string());

    let index = json!({
        "objects": {
            "icons/icon_16x16.png": { "hash": ICON_HASH, "size": 6 },
            "minecraft/sounds/ambient/cave/cave1.ogg": { "hash": SOUND_HASH, "size": 5 }
        }
    })
    .to_string();
    fetcher.insert("mem://indexes/12.json", index.clone());
    fetcher.insert("mem://indexes/1.8.json", index);
    fetcher.insert(&format!("{}/bd/{}", RESOURCES_URL, ICON_HASH), b"icon16".to_vec());
    fetcher.insert(&format!("{}/5d/{}", RESOURCES_URL, SOUND_HASH), b"sound".to_vec());

    fetcher.insert("mem://client/1.20.4.jar", b"client-1.20.4".to_vec());
    fetcher.insert("mem://client/1.8.9.jar", b"client-1.8.9".to_vec());
    fetcher.insert("mem://libs/brigadier.jar", b"brigadier".to_vec());
    fetcher.insert("mem://libs/lwjgl.jar", b"lwjgl".to_vec());
    fetcher.insert("mem://libs/netty.jar", b"netty".to_vec());
    for os in ["linux", "windows", "osx"] {
        fetcher.insert(&format!("mem://natives/{}.jar", os), natives_archive(os));
    }

    let mut runtime_index = serde_json::Map::new();
    for key in ["linux", "linux-arm64", "windows-x64", "mac-os", "mac-os-arm64"] {
        runtime_index.insert(
            key.to_string(),
            json!({
                "java-runtime-gamma": [ { "manifest": { "url": "mem://runtime/gamma.json" } } ],
                "jre-legacy": [ { "manifest": { "url": "mem://runtime/legacy.json" } } ]
            }),
        );
    }
    fetcher.insert(RUNTIME_INDEX_URL, serde_json::Value::Object(runtime_index).to_string());
    for component in ["java-runtime-gamma", "jre-legacy"] {
        let manifest_url = if component == "jre-legacy" {
            "mem://runtime/legacy.json"
        } else {
            "mem://runtime/gamma.json"
        };
        fetcher.insert(manifest_url, runtime_files(component).to_string());
        for file in ["java", "javaw.exe", "modules"] {
            fetcher.insert(
                &format!("mem://runtime/{}/{}", component, file),
                format!("{} {}", component, file).into_bytes(),
            );
        }
    }

    fetcher
}

pub fn config(root: &Path) -> LauncherConfig {
    let mut config = LauncherConfig::new(root);
    config.manifest_url = MANIFEST_URL.to_string();
    config.runtime_manifest_url = RUNTIME_INDEX_URL.to_string();
    config.resources_url = RESOURCES_URL.to_string();
    config
}

pub fn launcher(root: &Path, fetcher: &Arc<MemoryFetcher>) -> Launcher {
    Launcher::with_fetcher(config(root), fetcher.clone())
}

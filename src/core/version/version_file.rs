// ─── Version File ───
// Typed schema of a per-release metadata document. Decoded once at the
// boundary; a document missing a required key fails here with a JSON error.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::rules::{self, Rule, RuleContext};
use crate::core::error::LauncherResult;
use crate::core::maven::MavenArtifact;
use crate::core::natives::ExtractRules;
use crate::core::platform::Platform;

/// Runtime component assumed by releases that predate `javaVersion`.
const LEGACY_RUNTIME_COMPONENT: &str = "jre-legacy";

/// A fully parsed Mojang version JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub main_class: String,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    pub downloads: VersionDownloads,
    pub asset_index: AssetIndexInfo,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub component: String,
    #[serde(default)]
    pub major_version: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDownloads {
    pub client: DownloadArtifact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub sha1: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<ArgumentTemplate>,
    #[serde(default)]
    pub jvm: Vec<ArgumentTemplate>,
}

/// One entry of `arguments.jvm` / `arguments.game`: either a bare string or a
/// rule-gated value.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgumentTemplate {
    Plain(String),
    Conditional {
        #[serde(default)]
        rules: Option<Vec<Rule>>,
        value: ArgumentValue,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Many(Vec<String>),
}

impl ArgumentTemplate {
    pub fn rules(&self) -> Option<&[Rule]> {
        match self {
            ArgumentTemplate::Plain(_) => None,
            ArgumentTemplate::Conditional { rules, .. } => rules.as_deref(),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ArgumentTemplate::Plain(value) => vec![value.as_str()],
            ArgumentTemplate::Conditional { value, .. } => match value {
                ArgumentValue::Single(v) => vec![v.as_str()],
                ArgumentValue::Many(vs) => vs.iter().map(String::as_str).collect(),
            },
        }
    }
}

// ─── Library Entry ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    /// OS name → classifier key, e.g. `"windows": "natives-windows-${arch}"`.
    #[serde(default)]
    pub natives: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub extract: Option<ExtractRules>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
    #[serde(default)]
    pub classifiers: BTreeMap<String, LibDownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibDownloadArtifact {
    #[serde(default)]
    pub path: Option<String>,
    pub url: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub sha1: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub size: Option<u64>,
}

/// A library file with its storage location resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub url: String,
    /// `/`-separated path relative to the libraries directory.
    pub relative_path: String,
}

impl LibraryEntry {
    pub fn is_allowed(&self, platform: &Platform) -> bool {
        rules::is_applicable(self.rules.as_deref(), &RuleContext::library(platform))
    }

    /// The classpath jar, when the library declares one. A missing `path`
    /// falls back to the Maven layout of `name`.
    pub fn primary_artifact(&self) -> LauncherResult<Option<ResolvedArtifact>> {
        let Some(artifact) = self.downloads.as_ref().and_then(|d| d.artifact.as_ref()) else {
            return Ok(None);
        };

        let relative_path = match &artifact.path {
            Some(path) => path.clone(),
            None => MavenArtifact::parse(&self.name)?.relative_path(),
        };

        Ok(Some(ResolvedArtifact {
            url: artifact.url.clone(),
            relative_path,
        }))
    }

    /// Classifier key for this platform, with `${arch}` expanded.
    pub fn native_classifier(&self, platform: &Platform) -> Option<String> {
        let natives = self.natives.as_ref()?;
        natives
            .get(platform.os_name)
            .map(|key| key.replace("${arch}", platform.native_arch_bits))
    }

    /// The native archive for this platform, if the library ships one.
    pub fn native_artifact(&self, platform: &Platform) -> LauncherResult<Option<ResolvedArtifact>> {
        let Some(classifier) = self.native_classifier(platform) else {
            return Ok(None);
        };
        let Some(artifact) = self
            .downloads
            .as_ref()
            .and_then(|d| d.classifiers.get(&classifier))
        else {
            return Ok(None);
        };

        let relative_path = match &artifact.path {
            Some(path) => path.clone(),
            None => MavenArtifact::parse(&self.name)?
                .with_classifier(&classifier)
                .relative_path(),
        };

        Ok(Some(ResolvedArtifact {
            url: artifact.url.clone(),
            relative_path,
        }))
    }
}

impl VersionJson {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Runtime component name (`java-runtime-gamma`, `jre-legacy`, ...).
    pub fn runtime_component(&self) -> &str {
        self.java_version
            .as_ref()
            .map(|j| j.component.as_str())
            .unwrap_or(LEGACY_RUNTIME_COMPONENT)
    }

    pub fn jvm_templates(&self) -> &[ArgumentTemplate] {
        self.arguments
            .as_ref()
            .map(|a| a.jvm.as_slice())
            .unwrap_or_default()
    }

    pub fn game_templates(&self) -> &[ArgumentTemplate] {
        self.arguments
            .as_ref()
            .map(|a| a.game.as_slice())
            .unwrap_or_default()
    }

    /// Libraries that apply to `platform`, in declaration order.
    pub fn allowed_libraries<'a>(
        &'a self,
        platform: &'a Platform,
    ) -> impl Iterator<Item = &'a LibraryEntry> + 'a {
        self.libraries.iter().filter(move |lib| lib.is_allowed(platform))
    }
}

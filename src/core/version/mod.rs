pub mod manifest;
pub mod rules;
pub mod version_file;

pub use manifest::{ManifestResolver, VersionCategory, VersionEntry, VersionManifest};
pub use rules::{is_applicable, OsRule, Rule, RuleAction, RuleContext};
pub use version_file::{
    ArgumentTemplate, ArgumentValue, Arguments, AssetIndexInfo, DownloadArtifact,
    JavaVersionInfo, LibDownloadArtifact, LibraryDownloads, LibraryEntry, ResolvedArtifact,
    VersionDownloads, VersionJson,
};

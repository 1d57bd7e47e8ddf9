// ─── Launchpad Core ───
// Resolve a release, stage its files, launch it.
//
// Architecture:
//   core/
//     version/    - Mojang manifest + version JSON + rule evaluation
//     maven/      - Coordinate parser for library paths
//     downloader/ - Bounded-concurrency download units
//     assets/     - Asset index + content-addressed objects
//     java/       - Managed runtime from the runtime manifest
//     natives.rs  - Classifier archive extraction
//     install/    - Artifact planner + install pipeline
//     launch/     - Classpath, argument templates, process spawn
//     state/      - Config + on-disk layout

pub mod assets;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod java;
pub mod launch;
pub mod maven;
pub mod natives;
pub mod platform;
pub mod state;
pub mod version;

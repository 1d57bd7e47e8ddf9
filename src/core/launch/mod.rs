pub mod arguments;
pub mod classpath;
pub mod task;

pub use arguments::{assemble, render, substitute, LaunchArguments, SessionIdentity, Substitutions};
pub use classpath::{build_classpath, join_classpath};
pub use task::{launch, spawn, LaunchPlan};

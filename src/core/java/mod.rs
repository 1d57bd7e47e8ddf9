pub mod runtime;

pub use runtime::{mark_executables, RuntimeFiles, RuntimeIndex, RuntimePlan};

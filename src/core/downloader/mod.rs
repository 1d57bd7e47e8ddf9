pub mod client;

pub use client::{write_atomically, DownloadUnit, Downloader, UnitCategory, UnitOutcome, UnitStatus};

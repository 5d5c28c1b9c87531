//! Vesper Download Tracker
//!
//! The engine performs every transfer; this crate only decides where a
//! download lands and tracks it until the engine reports it done:
//! - Zero-length downloads are refused
//! - Existing names get a numeric suffix, `.1` up to `.998`
//! - Finish and 100% progress converge on one terminal state

mod download;
mod error;
mod tracker;

pub use download::{sanitize_file_name, DownloadEntry, DownloadId};
pub use error::DownloadError;
pub use tracker::{DownloadTracker, Progress, Registration, MAX_NAME_CANDIDATES};

pub type Result<T> = std::result::Result<T, DownloadError>;

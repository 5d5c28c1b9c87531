//! Download error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Download not found: {0}")]
    NotFound(String),

    #[error("Download has no content")]
    EmptyContent,

    #[error("No free file name for {0}")]
    NoFreeName(String),
}

//! Cooperation error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoopError {
    #[error("Cannot create FIFO at {path}: {source}")]
    Create {
        path: PathBuf,
        source: nix::errno::Errno,
    },

    #[error("Not a FIFO: {0}")]
    NotAFifo(PathBuf),

    #[error("Cannot write to FIFO: {0}")]
    Write(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

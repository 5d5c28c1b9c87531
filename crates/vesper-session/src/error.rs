//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Client not in session: {0}")]
    NotFound(String),

    #[error("Tab index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("Tab error: {0}")]
    Tab(#[from] vesper_tabs::TabError),
}

//! Navigation error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Cannot resolve to a URI: {0}")]
    Unresolvable(String),

    #[error("History file error: {0}")]
    History(#[from] std::io::Error),
}

//! Vesper Navigation
//!
//! Location bar input handling:
//! 1. `:/text` → find in page
//! 2. Bare domain, known scheme or existing local path → navigate
//! 3. Anything else → search

mod error;
mod history;
mod input;
mod normalize;

pub use error::NavigationError;
pub use history::HistoryLog;
pub use input::{InputResolution, InputResolver, DEFAULT_SEARCH_TEMPLATE, FIND_PREFIX};
pub use normalize::normalize_uri;

pub type Result<T> = std::result::Result<T, NavigationError>;

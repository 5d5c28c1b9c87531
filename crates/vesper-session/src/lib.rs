//! Vesper Session
//!
//! The session is the single owner of every open client:
//! - Tab strip order, new tabs land right after the active one
//! - At most one active client, which names the window
//! - URIs of closed clients go to the closed-tab history

mod error;
mod session;

pub use error::SessionError;
pub use session::Session;

pub type Result<T> = std::result::Result<T, SessionError>;

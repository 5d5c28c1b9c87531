//! Vesper Tab Model
//!
//! A Client is one browsing tab: a rendering surface owned by the engine
//! plus the chrome around it (location field, label, icon).
//! Closed tabs leave their URI behind in a bounded history.

mod client;
mod closed;
mod error;
mod state;

pub use client::{label_for, Client, ClientId, SurfaceId};
pub use closed::{ClosedTabs, CLOSED_TABS_CAPACITY};
pub use error::TabError;
pub use state::ClientState;

/// Application name, used for labels, window titles and per-user paths.
pub const APP_NAME: &str = "vesper";

pub type Result<T> = std::result::Result<T, TabError>;

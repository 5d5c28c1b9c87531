//! Vesper Core
//!
//! Session controller of the vesper browser shell. The rendering engine
//! and the windowing toolkit stay outside: the engine is driven through
//! [`WebEngine`], and everything either of them reports comes back as an
//! [`Event`].

mod bindings;
mod browser;
mod chrome;
mod config;
mod engine;
mod error;
mod event;
mod feeds;
mod hints;
mod resources;

#[cfg(test)]
mod recording;

pub use bindings::{fallback_action, find_binding, Action, Key, KeyBinding, Modifiers, KEY_BINDINGS};
pub use browser::Browser;
pub use chrome::{Chrome, DownloadChrome, TabChrome};
pub use config::{Config, TabPosition};
pub use engine::{FindDirection, ResponsePolicy, ScriptPurpose, SurfaceSettings, WebEngine};
pub use error::CoreError;
pub use event::{Event, KeyTarget};
pub use feeds::{feed_page, FEED_DISCOVERY_SCRIPT};
pub use hints::{HINTS_SCRIPT, HINT_CHARSET};
pub use resources::{load_trusted_certs, TrustedCert, UserScripts};

// Re-export component crates
pub use vesper_coop::{fifo_path, CoopError, Cooperation, Forwarder, Listener, Role};
pub use vesper_download::{DownloadEntry, DownloadError, DownloadId, DownloadTracker};
pub use vesper_navigation::{normalize_uri, HistoryLog, InputResolution, InputResolver, NavigationError};
pub use vesper_session::{Session, SessionError};
pub use vesper_tabs::{Client, ClientId, ClientState, ClosedTabs, SurfaceId, TabError, APP_NAME};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

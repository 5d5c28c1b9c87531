//! Chrome snapshot
//!
//! Read model of everything the windowing toolkit paints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use vesper_tabs::ClientId;

use crate::config::TabPosition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chrome {
    pub window_title: String,
    pub tab_position: TabPosition,
    pub tab_width_chars: u32,
    /// Tab strip order
    pub tabs: Vec<TabChrome>,
    /// Newest first
    pub downloads: Vec<DownloadChrome>,
    pub downloads_window_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabChrome {
    pub id: ClientId,
    pub label: String,
    pub location_text: String,
    pub progress: f64,
    pub favicon: Option<String>,
    pub active: bool,
    pub visible: bool,
    pub crashed: bool,
    pub has_feeds: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadChrome {
    pub label: String,
    pub progress: f64,
    pub destination: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl Chrome {
    /// Pretty JSON for dumping the chrome state
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

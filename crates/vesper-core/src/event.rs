//! Events delivered to the browser
//!
//! Engine callbacks, toolkit input, forwarded pipe lines and timers all
//! arrive as one of these and go through [`Browser::handle_event`].
//! Events name surfaces, not clients; an event for a surface whose client
//! is gone is dropped.
//!
//! [`Browser::handle_event`]: crate::Browser::handle_event

use serde::{Deserialize, Serialize};

use vesper_download::DownloadId;
use vesper_tabs::SurfaceId;

use crate::bindings::{Key, Modifiers};
use crate::engine::ScriptPurpose;

/// Where a key press happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyTarget {
    Page(SurfaceId),
    Location(SurfaceId),
    DownloadsWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Engine, per surface
    NavigationChanged {
        surface: SurfaceId,
        uri: String,
    },
    TitleChanged {
        surface: SurfaceId,
        title: Option<String>,
    },
    LoadProgress {
        surface: SurfaceId,
        fraction: f64,
    },
    ReadyToShow {
        surface: SurfaceId,
    },
    HoverChanged {
        surface: SurfaceId,
        link: Option<String>,
    },
    FaviconChanged {
        surface: SurfaceId,
        icon: Option<String>,
    },
    /// `result` is the string the script evaluated to, `None` for any
    /// other value or a failure
    ScriptFinished {
        surface: SurfaceId,
        purpose: ScriptPurpose,
        result: Option<String>,
    },
    WebProcessCrashed {
        surface: SurfaceId,
    },
    /// The page asked to close itself
    CloseRequested {
        surface: SurfaceId,
    },
    /// The page opened a popup window
    PopupRequested {
        opener: SurfaceId,
    },
    /// A response arrived and waits for a policy decision
    ResponsePolicy {
        surface: SurfaceId,
        mime_supported: bool,
    },

    // Engine, downloads
    DownloadStarted {
        download: DownloadId,
        suggested_filename: String,
        content_length: u64,
        mime_type: Option<String>,
    },
    DownloadProgress {
        download: DownloadId,
        fraction: f64,
    },
    DownloadFinished {
        download: DownloadId,
    },

    // Toolkit input
    KeyPressed {
        target: KeyTarget,
        key: Key,
        modifiers: Modifiers,
    },
    /// Return pressed in the location field
    LocationActivated {
        surface: SurfaceId,
        text: String,
    },
    LocationFocusChanged {
        surface: SurfaceId,
        focused: bool,
    },
    MouseReleased {
        surface: SurfaceId,
        button: u32,
        modifiers: Modifiers,
    },
    Scrolled {
        surface: SurfaceId,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    },
    TabLabelClicked {
        surface: SurfaceId,
        button: u32,
    },
    TabLabelScrolled {
        up: bool,
    },
    FeedIconActivated {
        surface: SurfaceId,
    },
    TabSelected {
        index: usize,
    },
    DownloadCancelRequested {
        download: DownloadId,
    },
    DownloadsWindowCloseRequested,

    // Process
    PipeLineReceived(String),
    CacheSweep,
    Shutdown,
}

impl Event {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::NavigationChanged { .. } => "navigation_changed",
            Event::TitleChanged { .. } => "title_changed",
            Event::LoadProgress { .. } => "load_progress",
            Event::ReadyToShow { .. } => "ready_to_show",
            Event::HoverChanged { .. } => "hover_changed",
            Event::FaviconChanged { .. } => "favicon_changed",
            Event::ScriptFinished { .. } => "script_finished",
            Event::WebProcessCrashed { .. } => "web_process_crashed",
            Event::CloseRequested { .. } => "close_requested",
            Event::PopupRequested { .. } => "popup_requested",
            Event::ResponsePolicy { .. } => "response_policy",
            Event::DownloadStarted { .. } => "download_started",
            Event::DownloadProgress { .. } => "download_progress",
            Event::DownloadFinished { .. } => "download_finished",
            Event::KeyPressed { .. } => "key_pressed",
            Event::LocationActivated { .. } => "location_activated",
            Event::LocationFocusChanged { .. } => "location_focus_changed",
            Event::MouseReleased { .. } => "mouse_released",
            Event::Scrolled { .. } => "scrolled",
            Event::TabLabelClicked { .. } => "tab_label_clicked",
            Event::TabLabelScrolled { .. } => "tab_label_scrolled",
            Event::FeedIconActivated { .. } => "feed_icon_activated",
            Event::TabSelected { .. } => "tab_selected",
            Event::DownloadCancelRequested { .. } => "download_cancel_requested",
            Event::DownloadsWindowCloseRequested => "downloads_window_close_requested",
            Event::PipeLineReceived(_) => "pipe_line_received",
            Event::CacheSweep => "cache_sweep",
            Event::Shutdown => "shutdown",
        }
    }
}

//! Rendering engine interface
//!
//! Everything the engine does (loading, scripting, rendering, transfers)
//! happens behind this trait. Requests return immediately; outcomes come
//! back later as [`Event`](crate::Event)s.

use serde::{Deserialize, Serialize};
use std::path::Path;

use vesper_download::DownloadId;
use vesper_tabs::SurfaceId;

/// Per-surface settings taken from the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSettings {
    pub accepted_language: Option<String>,
    pub user_agent: Option<String>,
    pub javascript: bool,
    pub images: bool,
    pub webgl: bool,
    pub hardware_acceleration: bool,
    pub smooth_scrolling: bool,
    pub console_to_stdout: bool,
    pub zoom: f64,
}

/// Why a script was evaluated; echoed back in `ScriptFinished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptPurpose {
    FeedDiscovery,
    Hints,
    UserScript,
    Scroll,
}

/// What to do with a response the surface is about to receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePolicy {
    /// Display it in the surface
    Use,
    /// Hand it to the download machinery instead
    Download,
}

impl ResponsePolicy {
    /// Content the engine cannot display is downloaded
    pub fn for_mime(mime_supported: bool) -> Self {
        if mime_supported {
            ResponsePolicy::Use
        } else {
            ResponsePolicy::Download
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindDirection {
    /// New search from the top, case-insensitive and wrapping
    Start,
    Next,
    Previous,
}

pub trait WebEngine {
    /// New surface, sharing engine context with `related` for popups
    fn create_surface(&mut self, related: Option<SurfaceId>) -> SurfaceId;
    fn apply_settings(&mut self, surface: SurfaceId, settings: &SurfaceSettings);
    fn destroy_surface(&mut self, surface: SurfaceId);

    fn load_uri(&mut self, surface: SurfaceId, uri: &str);
    fn reload(&mut self, surface: SurfaceId);
    fn stop_loading(&mut self, surface: SurfaceId);
    fn go_back(&mut self, surface: SurfaceId);
    fn go_forward(&mut self, surface: SurfaceId);
    fn set_zoom(&mut self, surface: SurfaceId, level: f64);
    /// Settle the pending response on `surface`
    fn decide_response(&mut self, surface: SurfaceId, policy: ResponsePolicy);

    fn evaluate_script(&mut self, surface: SurfaceId, script: &str, purpose: ScriptPurpose);
    fn find(&mut self, surface: SurfaceId, text: &str, direction: FindDirection);

    fn set_download_destination(&mut self, download: DownloadId, destination: &Path);
    fn cancel_download(&mut self, download: DownloadId);

    /// Trust a PEM certificate for one host
    fn allow_tls_certificate(&mut self, host: &str, pem: &[u8]);
    fn clear_cache(&mut self);
}

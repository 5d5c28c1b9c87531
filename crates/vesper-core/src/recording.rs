//! Engine double that records every request

use std::path::{Path, PathBuf};

use vesper_download::DownloadId;
use vesper_tabs::SurfaceId;

use crate::engine::{FindDirection, ResponsePolicy, ScriptPurpose, SurfaceSettings, WebEngine};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateSurface {
        related: Option<SurfaceId>,
        surface: SurfaceId,
    },
    ApplySettings(SurfaceId),
    DestroySurface(SurfaceId),
    LoadUri(SurfaceId, String),
    Reload(SurfaceId),
    StopLoading(SurfaceId),
    GoBack(SurfaceId),
    GoForward(SurfaceId),
    SetZoom(SurfaceId, f64),
    DecideResponse(SurfaceId, ResponsePolicy),
    EvaluateScript(SurfaceId, String, ScriptPurpose),
    Find(SurfaceId, String, FindDirection),
    SetDownloadDestination(DownloadId, PathBuf),
    CancelDownload(DownloadId),
    AllowCertificate(String),
    ClearCache,
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    next_surface: u64,
}

impl RecordingEngine {
    /// Every `load_uri` in order
    pub fn loads(&self) -> Vec<(SurfaceId, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::LoadUri(s, uri) => Some((*s, uri.clone())),
                _ => None,
            })
            .collect()
    }

    /// Every evaluated script with its purpose, in order
    pub fn scripts(&self) -> Vec<(String, ScriptPurpose)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::EvaluateScript(_, script, purpose) => Some((script.clone(), *purpose)),
                _ => None,
            })
            .collect()
    }
}

impl WebEngine for RecordingEngine {
    fn create_surface(&mut self, related: Option<SurfaceId>) -> SurfaceId {
        self.next_surface += 1;
        let surface = SurfaceId(self.next_surface);
        self.calls.push(Call::CreateSurface { related, surface });
        surface
    }

    fn apply_settings(&mut self, surface: SurfaceId, _settings: &SurfaceSettings) {
        self.calls.push(Call::ApplySettings(surface));
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        self.calls.push(Call::DestroySurface(surface));
    }

    fn load_uri(&mut self, surface: SurfaceId, uri: &str) {
        self.calls.push(Call::LoadUri(surface, uri.to_string()));
    }

    fn reload(&mut self, surface: SurfaceId) {
        self.calls.push(Call::Reload(surface));
    }

    fn stop_loading(&mut self, surface: SurfaceId) {
        self.calls.push(Call::StopLoading(surface));
    }

    fn go_back(&mut self, surface: SurfaceId) {
        self.calls.push(Call::GoBack(surface));
    }

    fn go_forward(&mut self, surface: SurfaceId) {
        self.calls.push(Call::GoForward(surface));
    }

    fn set_zoom(&mut self, surface: SurfaceId, level: f64) {
        self.calls.push(Call::SetZoom(surface, level));
    }

    fn decide_response(&mut self, surface: SurfaceId, policy: ResponsePolicy) {
        self.calls.push(Call::DecideResponse(surface, policy));
    }

    fn evaluate_script(&mut self, surface: SurfaceId, script: &str, purpose: ScriptPurpose) {
        self.calls
            .push(Call::EvaluateScript(surface, script.to_string(), purpose));
    }

    fn find(&mut self, surface: SurfaceId, text: &str, direction: FindDirection) {
        self.calls
            .push(Call::Find(surface, text.to_string(), direction));
    }

    fn set_download_destination(&mut self, download: DownloadId, destination: &Path) {
        self.calls
            .push(Call::SetDownloadDestination(download, destination.to_path_buf()));
    }

    fn cancel_download(&mut self, download: DownloadId) {
        self.calls.push(Call::CancelDownload(download));
    }

    fn allow_tls_certificate(&mut self, host: &str, _pem: &[u8]) {
        self.calls.push(Call::AllowCertificate(host.to_string()));
    }

    fn clear_cache(&mut self) {
        self.calls.push(Call::ClearCache);
    }
}

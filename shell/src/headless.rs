//! Headless engine
//!
//! Stands in for a rendering engine when none is linked: every load
//! commits at once and completes, and nothing is fetched or painted. The
//! notifications a real engine would raise go into the event channel.

use std::path::Path;

use tokio::sync::mpsc::UnboundedSender;

use vesper_core::{
    DownloadId, Event, FindDirection, ResponsePolicy, ScriptPurpose, SurfaceId, SurfaceSettings,
    WebEngine,
};

pub struct HeadlessEngine {
    events: UnboundedSender<Event>,
    next_surface: u64,
    trusted_hosts: Vec<String>,
}

impl HeadlessEngine {
    pub fn new(events: UnboundedSender<Event>) -> Self {
        Self {
            events,
            next_surface: 0,
            trusted_hosts: Vec::new(),
        }
    }

    pub fn trusted_hosts(&self) -> &[String] {
        &self.trusted_hosts
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::debug!("Event loop gone, dropping engine event");
        }
    }
}

impl WebEngine for HeadlessEngine {
    fn create_surface(&mut self, related: Option<SurfaceId>) -> SurfaceId {
        self.next_surface += 1;
        let surface = SurfaceId(self.next_surface);

        // Popups wait for this before they are shown
        if related.is_some() {
            self.emit(Event::ReadyToShow { surface });
        }
        surface
    }

    fn apply_settings(&mut self, surface: SurfaceId, settings: &SurfaceSettings) {
        tracing::debug!(
            surface = %surface,
            javascript = settings.javascript,
            zoom = settings.zoom,
            "Applied surface settings"
        );
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        tracing::debug!(surface = %surface, "Destroyed surface");
    }

    fn load_uri(&mut self, surface: SurfaceId, uri: &str) {
        self.emit(Event::NavigationChanged {
            surface,
            uri: uri.to_string(),
        });
        self.emit(Event::LoadProgress {
            surface,
            fraction: 1.0,
        });
    }

    fn reload(&mut self, surface: SurfaceId) {
        self.emit(Event::LoadProgress {
            surface,
            fraction: 1.0,
        });
    }

    fn stop_loading(&mut self, surface: SurfaceId) {
        tracing::debug!(surface = %surface, "Stop loading");
    }

    fn go_back(&mut self, surface: SurfaceId) {
        tracing::debug!(surface = %surface, "No history to go back to");
    }

    fn go_forward(&mut self, surface: SurfaceId) {
        tracing::debug!(surface = %surface, "No history to go forward to");
    }

    fn set_zoom(&mut self, surface: SurfaceId, level: f64) {
        tracing::debug!(surface = %surface, level, "Zoom");
    }

    fn decide_response(&mut self, surface: SurfaceId, policy: ResponsePolicy) {
        // Nothing is fetched, so there is never a response to download
        tracing::debug!(surface = %surface, ?policy, "Response policy decided");
    }

    fn evaluate_script(&mut self, surface: SurfaceId, _script: &str, purpose: ScriptPurpose) {
        // Without a DOM every script evaluates to nothing
        if purpose == ScriptPurpose::FeedDiscovery {
            self.emit(Event::ScriptFinished {
                surface,
                purpose,
                result: None,
            });
        }
    }

    fn find(&mut self, surface: SurfaceId, text: &str, direction: FindDirection) {
        tracing::debug!(surface = %surface, text = %text, ?direction, "Find");
    }

    fn set_download_destination(&mut self, download: DownloadId, destination: &Path) {
        tracing::debug!(
            download_id = %download,
            destination = %destination.display(),
            "Download destination set"
        );
    }

    fn cancel_download(&mut self, download: DownloadId) {
        tracing::debug!(download_id = %download, "Download cancelled");
    }

    fn allow_tls_certificate(&mut self, host: &str, _pem: &[u8]) {
        self.trusted_hosts.push(host.to_string());
    }

    fn clear_cache(&mut self) {
        tracing::debug!("Cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use vesper_core::{Browser, Config};

    #[test]
    fn test_load_commits_and_completes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = HeadlessEngine::new(tx);
        let surface = engine.create_surface(None);
        assert!(rx.try_recv().is_err());

        engine.load_uri(surface, "https://a.test/");
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::NavigationChanged {
                surface,
                uri: "https://a.test/".to_string()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::LoadProgress {
                surface,
                fraction: 1.0
            }
        );
    }

    #[test]
    fn test_popup_becomes_ready() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = HeadlessEngine::new(tx);
        let opener = engine.create_surface(None);
        let popup = engine.create_surface(Some(opener));
        assert_eq!(rx.try_recv().unwrap(), Event::ReadyToShow { surface: popup });
    }

    #[test]
    fn test_browser_settles_on_engine_events() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut browser = Browser::new(Config::default(), HeadlessEngine::new(tx))
            .with_resource_dirs(dir.path().join("certs"), dir.path().join("scripts"));
        std::fs::create_dir(dir.path().join("certs")).unwrap();
        std::fs::write(dir.path().join("certs").join("intranet.test"), b"pem").unwrap();

        browser.load_user_resources();
        assert_eq!(browser.engine().trusted_hosts(), ["intranet.test".to_string()]);

        browser.open_initial(&["https://a.test/".to_string()]);
        while let Ok(event) = rx.try_recv() {
            browser.handle_event(event);
        }

        assert_eq!(browser.window_title(), "https://a.test/");
        let chrome = browser.chrome();
        assert_eq!(chrome.tabs.len(), 1);
        assert_eq!(chrome.tabs[0].progress, 0.0);
        assert!(!chrome.tabs[0].has_feeds);
    }
}

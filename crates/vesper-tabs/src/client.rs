//! Client data structure
//!
//! A client carries everything the tab strip and location bar display:
//! - Label (title, falling back to the URI)
//! - Favicon
//! - Location text and load progress
//! - Hovered link and discovered feeds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TabError;
use crate::state::ClientState;
use crate::{Result, APP_NAME};

/// Stable identity of a client for as long as it lives in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a rendering surface. The surface itself is owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Tab label rule: title, else URI, else the application name.
pub fn label_for(title: Option<&str>, uri: &str) -> String {
    let uri = if uri.is_empty() { APP_NAME } else { uri };
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => uri.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Rendering surface bound to this client's lifetime
    pub surface: SurfaceId,
    /// Current URI: the requested one until the engine commits a
    /// navigation, then the last non-empty URI it reported
    pub uri: String,
    /// Page title as reported by the engine
    pub title: Option<String>,
    /// Tab strip label
    pub label: String,
    /// Text shown in the location field
    pub location_text: String,
    pub location_focused: bool,
    /// Load progress shown in the location field, 0 when idle
    pub progress: f64,
    /// Page zoom level
    pub zoom: f64,
    pub favicon: Option<String>,
    /// Link under the pointer, if any
    pub hover_uri: Option<String>,
    /// Feed list (HTML `<li>` items) found on the loaded page
    pub feed_html: Option<String>,
    /// Become the active client once the surface is shown
    pub focus_on_ready: bool,
    pub state: ClientState,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(surface: SurfaceId, focus_on_ready: bool) -> Self {
        Self {
            id: ClientId::new(),
            surface,
            uri: String::new(),
            title: None,
            label: APP_NAME.to_string(),
            location_text: String::new(),
            location_focused: false,
            progress: 0.0,
            zoom: 1.0,
            favicon: None,
            hover_uri: None,
            feed_html: None,
            focus_on_ready,
            state: ClientState::Pending,
            created_at: Utc::now(),
        }
    }

    /// Attempt to transition to a new state
    pub fn transition_to(&mut self, new_state: ClientState) -> Result<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(TabError::InvalidTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::debug!(
            client_id = %self.id,
            from = %self.state,
            to = %new_state,
            "Client state transition"
        );

        self.state = new_state;
        Ok(())
    }

    /// Reveal a pending client. Already shown clients are left alone.
    pub fn show(&mut self) -> Result<()> {
        if self.state == ClientState::Pending {
            self.transition_to(ClientState::Visible)
        } else {
            Ok(())
        }
    }

    /// Record a committed navigation. Returns false for the empty URI the
    /// engine reports after a crash, which must not clobber the crash notice.
    pub fn navigated(&mut self, uri: &str) -> Result<bool> {
        if uri.is_empty() {
            return Ok(false);
        }

        if self.state == ClientState::Crashed {
            self.transition_to(ClientState::Visible)?;
        }

        self.uri = uri.to_string();
        self.location_text = uri.to_string();
        self.refresh_label();
        Ok(true)
    }

    /// Remember a URI handed to the engine before it commits. The label
    /// and location field wait for the committed navigation.
    pub fn requested(&mut self, uri: &str) {
        if !uri.is_empty() {
            self.uri = uri.to_string();
        }
    }

    /// Update page title and derived label
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
        self.refresh_label();
    }

    pub fn mark_crashed(&mut self) -> Result<()> {
        self.transition_to(ClientState::Crashed)?;
        self.location_text = format!("WEB PROCESS CRASHED: {}", self.uri);
        Ok(())
    }

    /// Track the hovered link; mirrored into the location field unless the
    /// user is typing there.
    pub fn set_hover(&mut self, link: Option<String>) {
        self.hover_uri = link;
        if !self.location_focused {
            self.location_text = self
                .hover_uri
                .clone()
                .unwrap_or_else(|| self.uri.clone());
        }
    }

    /// Put the current URI back into the location field
    pub fn restore_location(&mut self) {
        self.location_text = if self.uri.is_empty() {
            APP_NAME.to_string()
        } else {
            self.uri.clone()
        };
    }

    /// Mirror engine load progress. Returns true when the page finished
    /// loading, in which case the indicator is reset.
    pub fn set_progress(&mut self, fraction: f64) -> bool {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction >= 1.0 {
            self.progress = 0.0;
            true
        } else {
            self.progress = fraction;
            false
        }
    }

    pub fn is_crashed(&self) -> bool {
        self.state == ClientState::Crashed
    }

    fn refresh_label(&mut self) {
        self.label = label_for(self.title.as_deref(), &self.uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = Client::new(SurfaceId(1), true);
        assert_eq!(client.label, "vesper");
        assert_eq!(client.state, ClientState::Pending);
        assert!(client.feed_html.is_none());
    }

    #[test]
    fn test_label_fallbacks() {
        assert_eq!(label_for(Some("Docs"), "https://x.test"), "Docs");
        assert_eq!(label_for(Some(""), "https://x.test"), "https://x.test");
        assert_eq!(label_for(None, ""), "vesper");
    }

    #[test]
    fn test_crash_notice_survives_empty_uri() {
        let mut client = Client::new(SurfaceId(1), false);
        client.show().unwrap();
        assert!(client.navigated("https://x.test/").unwrap());

        client.mark_crashed().unwrap();
        assert_eq!(client.location_text, "WEB PROCESS CRASHED: https://x.test/");

        assert!(!client.navigated("").unwrap());
        assert_eq!(client.location_text, "WEB PROCESS CRASHED: https://x.test/");
        assert!(client.is_crashed());

        assert!(client.navigated("https://x.test/again").unwrap());
        assert_eq!(client.state, ClientState::Visible);
    }

    #[test]
    fn test_requested_uri_until_commit() {
        let mut client = Client::new(SurfaceId(1), false);
        client.requested("https://x.test");
        assert_eq!(client.uri, "https://x.test");
        assert_eq!(client.label, "vesper");
        assert!(client.location_text.is_empty());

        client.requested("");
        assert_eq!(client.uri, "https://x.test");

        client.navigated("https://x.test/").unwrap();
        assert_eq!(client.uri, "https://x.test/");
    }

    #[test]
    fn test_hover_respects_location_focus() {
        let mut client = Client::new(SurfaceId(1), false);
        client.navigated("https://x.test/").unwrap();

        client.set_hover(Some("https://x.test/link".to_string()));
        assert_eq!(client.location_text, "https://x.test/link");

        client.set_hover(None);
        assert_eq!(client.location_text, "https://x.test/");

        client.location_focused = true;
        client.location_text = "typing".to_string();
        client.set_hover(Some("https://x.test/other".to_string()));
        assert_eq!(client.location_text, "typing");
    }

    #[test]
    fn test_progress_resets_when_complete() {
        let mut client = Client::new(SurfaceId(1), false);
        assert!(!client.set_progress(0.4));
        assert!((client.progress - 0.4).abs() < f64::EPSILON);
        assert!(client.set_progress(1.0));
        assert_eq!(client.progress, 0.0);
    }

    #[test]
    fn test_serializes_with_state() {
        let client = Client::new(SurfaceId(7), false);
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["state"], "pending");
        assert_eq!(json["surface"], 7);
    }
}

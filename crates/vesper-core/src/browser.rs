//! Session controller
//!
//! The browser owns every client, the download tracker and the cooperation
//! write side. All engine and toolkit callbacks come in through
//! [`Browser::handle_event`], one at a time, on the event loop thread.

use std::path::PathBuf;

use vesper_coop::Forwarder;
use vesper_download::{DownloadId, DownloadTracker, Progress};
use vesper_navigation::{HistoryLog, InputResolution, InputResolver, FIND_PREFIX};
use vesper_session::Session;
use vesper_tabs::{Client, ClientId, SurfaceId};

use crate::bindings::{fallback_action, find_binding, Action, Key, Modifiers};
use crate::chrome::{Chrome, DownloadChrome, TabChrome};
use crate::config::Config;
use crate::engine::{FindDirection, ResponsePolicy, ScriptPurpose, WebEngine};
use crate::event::{Event, KeyTarget};
use crate::feeds::{feed_page, FEED_DISCOVERY_SCRIPT};
use crate::hints::HINTS_SCRIPT;
use crate::resources::{load_trusted_certs, UserScripts};
use crate::Result;

const SCROLL_UP_SCRIPT: &str = "window.scrollBy(0, -50);";
const SCROLL_DOWN_SCRIPT: &str = "window.scrollBy(0, 50);";
const ZOOM_STEP: f64 = 0.1;

pub struct Browser<E: WebEngine> {
    config: Config,
    engine: E,
    session: Session,
    downloads: DownloadTracker,
    resolver: InputResolver,
    history: HistoryLog,
    user_scripts: UserScripts,
    certs_dir: PathBuf,
    /// Set when another instance hosts the tabs
    forwarder: Option<Forwarder>,
    /// Last text searched for with `:/`
    search_text: Option<String>,
    running: bool,
}

impl<E: WebEngine> Browser<E> {
    pub fn new(config: Config, engine: E) -> Self {
        let downloads = DownloadTracker::new(config.download_dir.clone());
        let resolver = InputResolver::with_search_engine(config.search_engine.clone());
        let history = HistoryLog::new(config.history_file.clone());

        Self {
            config,
            engine,
            session: Session::new(),
            downloads,
            resolver,
            history,
            user_scripts: UserScripts::new(Config::user_scripts_dir()),
            certs_dir: Config::certs_dir(),
            forwarder: None,
            search_text: None,
            running: true,
        }
    }

    /// Use other certificate and user script directories
    pub fn with_resource_dirs(mut self, certs_dir: PathBuf, user_scripts_dir: PathBuf) -> Self {
        self.certs_dir = certs_dir;
        self.user_scripts = UserScripts::new(user_scripts_dir);
        self
    }

    /// Turn this browser into a secondary: tab requests go down the pipe.
    pub fn with_forwarder(mut self, forwarder: Forwarder) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn is_secondary(&self) -> bool {
        self.forwarder.is_some()
    }

    /// False once the idle-shutdown check ended the process
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn window_title(&self) -> String {
        self.session.window_title()
    }

    // === Startup ===

    /// Trust user certificates and read user scripts ahead of the first page
    pub fn load_user_resources(&mut self) {
        self.reload_certs();
        let scripts = self.user_scripts.scripts().len();
        tracing::info!(scripts, "Loaded user scripts");
    }

    /// One tab per argument, or the home page when there are none
    pub fn open_initial(&mut self, uris: &[String]) -> Vec<ClientId> {
        if uris.is_empty() {
            let home = self.config.home_uri.clone();
            return self.create_tab(&home, None, true, true).into_iter().collect();
        }

        uris.iter()
            .filter_map(|uri| self.create_tab(uri, None, true, true))
            .collect()
    }

    // === Tab lifecycle ===

    /// Open a tab. A secondary forwards the URI instead and returns `None`.
    ///
    /// Tabs created with `show == false` stay hidden until the engine
    /// reports the surface ready to show.
    pub fn create_tab(
        &mut self,
        uri: &str,
        opener: Option<SurfaceId>,
        show: bool,
        focus: bool,
    ) -> Option<ClientId> {
        if let Some(forwarder) = self.forwarder.as_mut() {
            if !uri.is_empty() {
                let target = self.resolver.resolve_uri(uri);
                if let Some(target) = target.uri() {
                    match forwarder.forward(target) {
                        Ok(()) => tracing::info!(uri = %target, "Forwarded to primary instance"),
                        Err(e) => tracing::error!(uri = %target, error = %e, "Could not forward URI"),
                    }
                }
            }
            return None;
        }

        let surface = self.engine.create_surface(opener);
        self.engine
            .apply_settings(surface, &self.config.surface_settings());

        let target = if uri.is_empty() {
            None
        } else {
            self.resolver.resolve_uri(uri).uri().map(str::to_string)
        };

        let mut client = Client::new(surface, focus);
        client.zoom = self.config.zoom;
        if let Some(target) = &target {
            client.requested(target);
        }
        let id = self.session.insert(client);

        tracing::info!(client_id = %id, surface = %surface, uri = %uri, "Created tab");

        if show {
            self.show_client(id);
        }

        if let Some(target) = target {
            self.engine.load_uri(surface, &target);
        }

        Some(id)
    }

    fn show_client(&mut self, id: ClientId) {
        let Some(client) = self.session.get_mut(id) else {
            return;
        };

        if let Err(e) = client.show() {
            tracing::warn!(client_id = %id, error = %e, "Could not show client");
        }

        if client.focus_on_ready {
            if let Err(e) = self.set_active(id) {
                tracing::warn!(client_id = %id, error = %e, "Could not focus client");
            }
        }
    }

    /// Close a tab. Returns whether this ended the process.
    pub fn destroy_tab(&mut self, id: ClientId) -> Result<bool> {
        let client = self.session.remove(id)?;
        self.engine.destroy_surface(client.surface);

        tracing::info!(client_id = %id, uri = %client.uri, "Closed tab");

        Ok(self.idle_shutdown_check())
    }

    /// With no tabs left, stop when nothing is downloading, or else keep
    /// the downloads window up. Returns whether the process is ending.
    pub fn idle_shutdown_check(&mut self) -> bool {
        if !self.session.is_empty() {
            return false;
        }

        if self.downloads.active_count() == 0 {
            tracing::info!("No tabs or downloads left, shutting down");
            self.running = false;
            true
        } else {
            tracing::info!(
                downloads = self.downloads.active_count(),
                "Last tab closed, waiting for downloads"
            );
            self.downloads.show_window();
            false
        }
    }

    /// Focus a client; the window title follows it.
    pub fn set_active(&mut self, id: ClientId) -> Result<bool> {
        let changed = self.session.set_active(id)?;
        if changed {
            tracing::debug!(client_id = %id, title = %self.window_title(), "Active client changed");
        }
        Ok(changed)
    }

    /// Reopen the most recently closed tab, if any
    pub fn reopen_closed_tab(&mut self) -> Option<ClientId> {
        let uri = self.session.pop_closed()?;
        self.create_tab(&uri, None, true, true)
    }

    /// Hand every certificate in the certificate directory to the engine
    pub fn reload_certs(&mut self) -> usize {
        let certs = load_trusted_certs(&self.certs_dir);
        for cert in &certs {
            self.engine.allow_tls_certificate(&cert.host, &cert.pem);
            tracing::debug!(host = %cert.host, "Trusting certificate");
        }

        tracing::info!(count = certs.len(), dir = %self.certs_dir.display(), "Loaded trusted certificates");
        certs.len()
    }

    /// Close every tab, ending in the idle-shutdown check
    pub fn close_all(&mut self) {
        for id in self.session.ids() {
            if let Err(e) = self.destroy_tab(id) {
                tracing::warn!(client_id = %id, error = %e, "Could not close tab");
            }
        }
    }

    pub fn chrome(&self) -> Chrome {
        let active = self.session.active_id();

        Chrome {
            window_title: self.window_title(),
            tab_position: self.config.tab_position,
            tab_width_chars: self.config.tab_width_chars,
            tabs: self
                .session
                .iter()
                .map(|c| TabChrome {
                    id: c.id,
                    label: c.label.clone(),
                    location_text: c.location_text.clone(),
                    progress: c.progress,
                    favicon: c.favicon.clone(),
                    active: Some(c.id) == active,
                    visible: c.state.is_visible(),
                    crashed: c.is_crashed(),
                    has_feeds: c.feed_html.is_some(),
                })
                .collect(),
            downloads: self
                .downloads
                .entries()
                .iter()
                .map(|d| DownloadChrome {
                    label: d.label.clone(),
                    progress: d.progress,
                    destination: d.destination.clone(),
                    started_at: d.started_at,
                })
                .collect(),
            downloads_window_visible: self.downloads.window_visible(),
        }
    }

    // === Event dispatch ===

    fn client_for(&self, surface: SurfaceId, kind: &str) -> Option<ClientId> {
        let id = self.session.find_by_surface(surface);
        if id.is_none() {
            tracing::debug!(surface = %surface, event = kind, "Dropping event for closed client");
        }
        id
    }

    /// Apply one event. For input events the result says whether it was
    /// consumed; unconsumed input goes on to the surface.
    pub fn handle_event(&mut self, event: Event) -> bool {
        let kind = event.kind();
        tracing::trace!(event = kind, "Handling event");

        match event {
            Event::NavigationChanged { surface, uri } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.on_navigation(id, &uri)
            }
            Event::TitleChanged { surface, title } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if let Some(client) = self.session.get_mut(id) {
                    client.set_title(title);
                }
                true
            }
            Event::LoadProgress { surface, fraction } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.on_load_progress(id, fraction)
            }
            Event::ReadyToShow { surface } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.show_client(id);
                true
            }
            Event::HoverChanged { surface, link } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if let Some(client) = self.session.get_mut(id) {
                    client.set_hover(link);
                }
                true
            }
            Event::FaviconChanged { surface, icon } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if let Some(client) = self.session.get_mut(id) {
                    client.favicon = icon;
                }
                true
            }
            Event::ScriptFinished {
                surface,
                purpose,
                result,
            } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if purpose != ScriptPurpose::FeedDiscovery {
                    return true;
                }
                if let Some(client) = self.session.get_mut(id) {
                    client.feed_html = result;
                }
                true
            }
            Event::WebProcessCrashed { surface } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if let Some(client) = self.session.get_mut(id) {
                    match client.mark_crashed() {
                        Ok(()) => tracing::warn!(client_id = %id, uri = %client.uri, "Web process crashed"),
                        Err(e) => tracing::warn!(client_id = %id, error = %e, "Could not mark client crashed"),
                    }
                }
                true
            }
            Event::CloseRequested { surface } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.close_tab(id);
                true
            }
            Event::PopupRequested { opener } => {
                if self.client_for(opener, kind).is_none() {
                    return false;
                }
                self.create_tab("", Some(opener), false, false).is_some()
            }
            Event::ResponsePolicy {
                surface,
                mime_supported,
            } => {
                if self.client_for(surface, kind).is_none() {
                    return false;
                }
                let policy = ResponsePolicy::for_mime(mime_supported);
                if policy == ResponsePolicy::Download {
                    tracing::debug!(surface = %surface, "Unsupported content type, downloading");
                }
                self.engine.decide_response(surface, policy);
                true
            }

            Event::DownloadStarted {
                download,
                suggested_filename,
                content_length,
                mime_type,
            } => self.on_download_started(download, &suggested_filename, content_length, mime_type),
            Event::DownloadProgress { download, fraction } => {
                match self.downloads.on_progress(download, fraction) {
                    Ok(Progress::Finished) => {
                        self.on_download_retired();
                        true
                    }
                    Ok(Progress::Updated) => true,
                    Err(e) => {
                        tracing::debug!(download_id = %download, error = %e, "Ignoring stale download progress");
                        false
                    }
                }
            }
            Event::DownloadFinished { download } => {
                let retired = self.downloads.on_engine_finished(download);
                if retired {
                    self.on_download_retired();
                }
                retired
            }
            Event::DownloadCancelRequested { download } => match self.downloads.cancel(download) {
                Ok(_) => {
                    self.engine.cancel_download(download);
                    self.on_download_retired();
                    true
                }
                Err(e) => {
                    tracing::debug!(download_id = %download, error = %e, "Download already gone");
                    false
                }
            },
            Event::DownloadsWindowCloseRequested => {
                self.close_downloads_window();
                true
            }

            Event::KeyPressed {
                target,
                key,
                modifiers,
            } => self.on_key(target, key, modifiers),
            Event::LocationActivated { surface, text } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.on_location_activated(id, surface, &text);
                true
            }
            Event::LocationFocusChanged { surface, focused } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if let Some(client) = self.session.get_mut(id) {
                    client.location_focused = focused;
                }
                true
            }
            Event::MouseReleased {
                surface,
                button,
                modifiers,
            } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.on_mouse_released(id, surface, button, modifiers)
            }
            Event::Scrolled {
                surface,
                dx,
                dy,
                modifiers,
            } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                self.on_scroll(id, surface, dx, dy, modifiers)
            }
            Event::TabLabelClicked { surface, button } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                if button != 2 {
                    return false;
                }
                self.close_tab(id);
                true
            }
            Event::TabLabelScrolled { up } => {
                if up {
                    self.step_tab(-1);
                } else {
                    self.step_tab(1);
                }
                true
            }
            Event::FeedIconActivated { surface } => {
                let Some(id) = self.client_for(surface, kind) else {
                    return false;
                };
                let Some(feeds) = self.session.get(id).and_then(|c| c.feed_html.clone()) else {
                    return false;
                };
                self.engine.load_uri(surface, &feed_page(&feeds));
                true
            }
            Event::TabSelected { index } => match self.session.id_at(index) {
                Ok(id) => self.set_active(id).is_ok(),
                Err(e) => {
                    tracing::debug!(index, error = %e, "Ignoring selection of missing tab");
                    false
                }
            },

            Event::PipeLineReceived(line) => {
                let line = line.trim();
                if line.is_empty() {
                    return false;
                }
                tracing::info!(uri = %line, "Received URI from another instance");
                self.create_tab(line, None, true, true).is_some()
            }
            Event::CacheSweep => {
                tracing::debug!("Clearing engine cache");
                self.engine.clear_cache();
                true
            }
            Event::Shutdown => {
                if self.session.is_empty() {
                    tracing::info!("Shutdown requested again, exiting");
                    self.running = false;
                } else {
                    tracing::info!(tabs = self.session.len(), "Shutdown requested, closing tabs");
                    self.close_all();
                }
                true
            }
        }
    }

    fn close_tab(&mut self, id: ClientId) {
        if let Err(e) = self.destroy_tab(id) {
            tracing::warn!(client_id = %id, error = %e, "Could not close tab");
        }
    }

    fn on_navigation(&mut self, id: ClientId, uri: &str) -> bool {
        let Some(client) = self.session.get_mut(id) else {
            return false;
        };

        match client.navigated(uri) {
            Ok(true) => {
                if let Err(e) = self.history.record_visit(uri) {
                    tracing::warn!(uri = %uri, error = %e, "Could not write history");
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(client_id = %id, error = %e, "Could not record navigation");
                false
            }
        }
    }

    fn on_load_progress(&mut self, id: ClientId, fraction: f64) -> bool {
        let Some(client) = self.session.get_mut(id) else {
            return false;
        };

        if client.set_progress(fraction) {
            let surface = client.surface;
            self.engine
                .evaluate_script(surface, FEED_DISCOVERY_SCRIPT, ScriptPurpose::FeedDiscovery);
            if self.config.hints {
                self.engine
                    .evaluate_script(surface, HINTS_SCRIPT, ScriptPurpose::Hints);
            }
            for script in self.user_scripts.scripts() {
                self.engine
                    .evaluate_script(surface, &script, ScriptPurpose::UserScript);
            }
        }
        true
    }

    fn on_download_started(
        &mut self,
        download: DownloadId,
        suggested_filename: &str,
        content_length: u64,
        mime_type: Option<String>,
    ) -> bool {
        match self
            .downloads
            .register(download, suggested_filename, content_length, mime_type)
        {
            Ok(registration) => {
                self.engine
                    .set_download_destination(download, &registration.destination);
                true
            }
            Err(e) => {
                tracing::warn!(download_id = %download, error = %e, "Cancelling download");
                self.engine.cancel_download(download);
                false
            }
        }
    }

    /// A download left the active set. Without tabs it may have been the
    /// last thing keeping the process up.
    fn on_download_retired(&mut self) {
        if self.session.is_empty() {
            self.idle_shutdown_check();
        }
    }

    fn close_downloads_window(&mut self) {
        if !self.idle_shutdown_check() {
            self.downloads.hide_window();
        }
    }

    fn on_location_activated(&mut self, id: ClientId, surface: SurfaceId, text: &str) {
        match self.resolver.resolve(text) {
            InputResolution::Find(needle) => {
                tracing::debug!(client_id = %id, text = %needle, "Find in page");
                self.engine.find(surface, &needle, FindDirection::Start);
                self.search_text = Some(needle);
            }
            resolution => {
                if let Some(uri) = resolution.uri() {
                    self.engine.load_uri(surface, uri);
                }
            }
        }

        if let Some(client) = self.session.get_mut(id) {
            client.location_focused = false;
        }
    }

    fn on_key(&mut self, target: KeyTarget, key: Key, modifiers: Modifiers) -> bool {
        let (surface, in_location) = match target {
            KeyTarget::DownloadsWindow => {
                let closes = modifiers.contains(Modifiers::ALT)
                    && matches!(key, Key::Char('d') | Key::Char('q'));
                if closes {
                    self.close_downloads_window();
                }
                return closes;
            }
            KeyTarget::Page(surface) => (surface, false),
            KeyTarget::Location(surface) => (surface, true),
        };

        let Some(id) = self.client_for(surface, "key_pressed") else {
            return false;
        };

        if let Some(binding) = find_binding(key, modifiers) {
            return self.run_action(id, binding.action, binding.arg);
        }
        if let Some(action) = fallback_action(key, modifiers) {
            return self.run_action(id, action, None);
        }

        if key != Key::Escape {
            return false;
        }

        let Some(client) = self.session.get_mut(id) else {
            return false;
        };
        if in_location {
            client.restore_location();
            true
        } else {
            client.progress = 0.0;
            self.engine.stop_loading(surface);
            false
        }
    }

    /// Run a bound action on behalf of a client. Returns whether the
    /// action handled the key.
    pub fn run_action(&mut self, id: ClientId, action: Action, arg: Option<&str>) -> bool {
        let Some(surface) = self.session.get(id).map(|c| c.surface) else {
            return false;
        };

        tracing::debug!(client_id = %id, action = %action, "Running action");

        match action {
            Action::CloseTab => {
                self.close_tab(id);
                true
            }
            Action::NewTab => {
                let home = self.config.home_uri.clone();
                self.create_tab(&home, None, true, true);
                true
            }
            Action::ReopenClosedTab => self.reopen_closed_tab().is_some(),
            Action::GoHome => {
                self.engine.load_uri(surface, &self.config.home_uri);
                true
            }
            Action::Reload => {
                self.engine.reload(surface);
                true
            }
            Action::ShowDownloads => {
                self.downloads.show_window();
                true
            }
            Action::SearchForward => {
                self.find_again(surface, FindDirection::Next);
                true
            }
            Action::SearchBackward => {
                self.find_again(surface, FindDirection::Previous);
                true
            }
            Action::FocusLocation => {
                if let Some(client) = self.session.get_mut(id) {
                    client.location_focused = true;
                }
                true
            }
            Action::InitSearch => {
                if let Some(client) = self.session.get_mut(id) {
                    client.location_text = FIND_PREFIX.to_string();
                    client.location_focused = true;
                }
                true
            }
            Action::ReloadCerts => {
                self.reload_certs();
                true
            }
            Action::PrevTab => {
                self.step_tab(-1);
                true
            }
            Action::NextTab => {
                self.step_tab(1);
                true
            }
            Action::ScrollUp => {
                self.engine
                    .evaluate_script(surface, SCROLL_UP_SCRIPT, ScriptPurpose::Scroll);
                true
            }
            Action::ScrollDown => {
                self.engine
                    .evaluate_script(surface, SCROLL_DOWN_SCRIPT, ScriptPurpose::Scroll);
                true
            }
            Action::HistoryBack => {
                self.engine.go_back(surface);
                true
            }
            Action::HistoryForward => {
                self.engine.go_forward(surface);
                true
            }
            Action::GotoTab => {
                let Some(index) = arg.and_then(|a| a.parse::<usize>().ok()) else {
                    return false;
                };
                match self.session.id_at(index) {
                    Ok(target) => self.set_active(target).is_ok(),
                    Err(_) => false,
                }
            }
        }
    }

    fn find_again(&mut self, surface: SurfaceId, direction: FindDirection) {
        if let Some(text) = &self.search_text {
            self.engine.find(surface, text, direction);
        }
    }

    /// Move the active marker, stopping at either end of the strip
    fn step_tab(&mut self, delta: isize) {
        let Some(index) = self.session.active_index() else {
            return;
        };
        let Some(next) = index.checked_add_signed(delta) else {
            return;
        };
        if let Ok(id) = self.session.id_at(next) {
            if let Err(e) = self.set_active(id) {
                tracing::warn!(client_id = %id, error = %e, "Could not switch tab");
            }
        }
    }

    fn on_mouse_released(
        &mut self,
        id: ClientId,
        surface: SurfaceId,
        button: u32,
        modifiers: Modifiers,
    ) -> bool {
        match button {
            1 | 2 => {
                let wants_tab =
                    button == 2 || modifiers.relevant().contains(Modifiers::CONTROL);
                if !wants_tab {
                    return false;
                }
                let Some(link) = self.session.get(id).and_then(|c| c.hover_uri.clone()) else {
                    return false;
                };
                self.create_tab(&link, None, true, false);
                true
            }
            8 => {
                self.engine.go_back(surface);
                true
            }
            9 => {
                self.engine.go_forward(surface);
                true
            }
            _ => false,
        }
    }

    /// Ctrl or Alt + scroll zooms; a horizontal step resets the level.
    fn on_scroll(
        &mut self,
        id: ClientId,
        surface: SurfaceId,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    ) -> bool {
        let modifiers = modifiers.relevant();
        if !modifiers.contains(Modifiers::CONTROL) && !modifiers.contains(Modifiers::ALT) {
            return false;
        }

        let default_zoom = self.config.zoom;
        let Some(client) = self.session.get_mut(id) else {
            return false;
        };

        client.zoom = if dx != 0.0 {
            default_zoom
        } else {
            (client.zoom - dy * ZOOM_STEP).max(ZOOM_STEP)
        };
        self.engine.set_zoom(surface, client.zoom);
        true
    }
}

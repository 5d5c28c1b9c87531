//! Browser configuration
//!
//! Built-in defaults, overridden by `VESPER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use vesper_navigation::DEFAULT_SEARCH_TEMPLATE;
use vesper_tabs::APP_NAME;

use crate::engine::SurfaceSettings;

const ENV_PREFIX: &str = "VESPER_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabPosition {
    Top,
    Right,
    Bottom,
    Left,
}

impl FromStr for TabPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(TabPosition::Top),
            "right" => Ok(TabPosition::Right),
            "bottom" => Ok(TabPosition::Bottom),
            "left" => Ok(TabPosition::Left),
            _ => Err(format!("Unknown tab position: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preferred content language sent to sites
    pub accepted_language: Option<String>,
    pub smooth_scrolling: bool,
    /// Where downloads land
    pub download_dir: PathBuf,
    /// Echo page console messages on stdout
    pub console_to_stdout: bool,
    /// Distinguishes independent cooperating profiles
    pub fifo_suffix: String,
    /// Append-only visit log; disabled when unset
    pub history_file: Option<PathBuf>,
    pub home_uri: String,
    /// Search engine URL template
    pub search_engine: String,
    pub tab_position: TabPosition,
    pub tab_width_chars: u32,
    pub user_agent: Option<String>,
    pub zoom: f64,
    pub javascript: bool,
    pub images: bool,
    pub hardware_acceleration: bool,
    pub webgl: bool,
    /// Install link hints into every loaded page
    pub hints: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accepted_language: None,
            smooth_scrolling: true,
            download_dir: PathBuf::from("/var/tmp"),
            console_to_stdout: false,
            fifo_suffix: "main".to_string(),
            history_file: None,
            home_uri: "https://html.duckduckgo.com/html/".to_string(),
            search_engine: DEFAULT_SEARCH_TEMPLATE.to_string(),
            tab_position: TabPosition::Top,
            tab_width_chars: 20,
            user_agent: None,
            zoom: 1.0,
            javascript: true,
            images: true,
            hardware_acceleration: true,
            webgl: true,
            hints: true,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `VESPER_*` key. Booleans are true only for `true` or `1`; numbers
    /// that do not parse keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut config = Self::default();

        if let Some(v) = get("ACCEPTED_LANGUAGE") {
            config.accepted_language = Some(v);
        }
        if let Some(v) = get("DISABLE_SMOOTH_SCROLLING") {
            config.smooth_scrolling = !parse_bool(&v);
        }
        if let Some(v) = get("DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ENABLE_CONSOLE_TO_STDOUT") {
            config.console_to_stdout = parse_bool(&v);
        }
        if let Some(v) = get("FIFO_SUFFIX") {
            config.fifo_suffix = v;
        }
        if let Some(v) = get("HISTORY_FILE") {
            config.history_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("HOME_URI") {
            config.home_uri = v;
        }
        if let Some(v) = get("TAB_POS") {
            match v.parse() {
                Ok(pos) => config.tab_position = pos,
                Err(e) => tracing::warn!(error = %e, "Keeping default tab position"),
            }
        }
        if let Some(v) = get("TAB_WIDTH_CHARS") {
            config.tab_width_chars = parse_number("TAB_WIDTH_CHARS", &v, config.tab_width_chars);
        }
        if let Some(v) = get("USER_AGENT") {
            config.user_agent = Some(v);
        }
        if let Some(v) = get("ZOOM") {
            config.zoom = parse_number("ZOOM", &v, config.zoom);
        }
        if let Some(v) = get("ENABLE_JAVASCRIPT") {
            config.javascript = parse_bool(&v);
        }
        if let Some(v) = get("ENABLE_IMAGES") {
            config.images = parse_bool(&v);
        }
        if let Some(v) = get("ENABLE_HARDWARE_ACCELERATION") {
            config.hardware_acceleration = parse_bool(&v);
        }
        if let Some(v) = get("ENABLE_WEBGL") {
            config.webgl = parse_bool(&v);
        }
        if let Some(v) = get("ENABLE_HINTS") {
            config.hints = parse_bool(&v);
        }

        config
    }

    /// Settings applied to every new rendering surface
    pub fn surface_settings(&self) -> SurfaceSettings {
        SurfaceSettings {
            accepted_language: self.accepted_language.clone(),
            user_agent: self.user_agent.clone(),
            javascript: self.javascript,
            images: self.images,
            webgl: self.webgl,
            hardware_acceleration: self.hardware_acceleration,
            smooth_scrolling: self.smooth_scrolling,
            console_to_stdout: self.console_to_stdout,
            zoom: self.zoom,
        }
    }

    /// Per-user runtime directory holding the cooperation FIFO
    pub fn runtime_dir() -> PathBuf {
        dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir)
    }

    /// `~/.config/vesper` or the platform equivalent
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)))
    }

    pub fn certs_dir() -> PathBuf {
        Self::config_dir().join("certs")
    }

    pub fn user_scripts_dir() -> PathBuf {
        Self::config_dir().join("user-scripts")
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn parse_number<T>(name: &str, value: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match value.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(
                variable = %format!("{}{}", ENV_PREFIX, name),
                value = %value,
                "Unparseable number, keeping default"
            );
            default
        }
    }
}

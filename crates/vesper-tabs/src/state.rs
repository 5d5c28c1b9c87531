//! Client display state machine
//!
//! ```text
//! Pending ── ready-to-show ──> Visible
//!    │                           │  ↑
//!    └──────── crash ──────> Crashed ┘ navigation
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientState {
    /// Created hidden, waiting for the engine to report the surface ready
    Pending,
    /// Shown in the tab strip
    Visible,
    /// The rendering process behind the surface died
    Crashed,
}

impl ClientState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: ClientState) -> bool {
        match (self, target) {
            (ClientState::Pending, ClientState::Visible) => true,
            (ClientState::Pending, ClientState::Crashed) => true,
            (ClientState::Visible, ClientState::Crashed) => true,
            // A fresh navigation after a crash brings the page back
            (ClientState::Crashed, ClientState::Visible) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, ClientState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientState::Pending => "pending",
            ClientState::Visible => "visible",
            ClientState::Crashed => "crashed",
        }
    }
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

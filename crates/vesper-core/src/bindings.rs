//! Keyboard bindings
//!
//! A static table scanned in declared order; the first entry matching both
//! key and modifiers wins, even if its action then declines the event.
//! Reordering the table changes behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable key, case as delivered (Shift+t arrives as `'T'`)
    Char(char),
    PageUp,
    PageDown,
    Return,
    Escape,
    /// Function key F1..F12
    F(u8),
}

/// Modifier state. Bit positions follow the usual X11 layout; only Shift,
/// Control and Alt take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1 << 0);
    pub const CONTROL: Modifiers = Modifiers(1 << 2);
    pub const ALT: Modifiers = Modifiers(1 << 3);

    const RELEVANT: u32 = Self::SHIFT.0 | Self::CONTROL.0 | Self::ALT.0;

    /// Raw state from the toolkit, including bits that are ignored
    pub const fn from_bits(bits: u32) -> Self {
        Modifiers(bits)
    }

    pub const fn union(self, other: Modifiers) -> Self {
        Modifiers(self.0 | other.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Drop everything but Shift, Control and Alt
    pub const fn relevant(self) -> Self {
        Modifiers(self.0 & Self::RELEVANT)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CloseTab,
    NewTab,
    ReopenClosedTab,
    GoHome,
    Reload,
    ShowDownloads,
    SearchForward,
    SearchBackward,
    FocusLocation,
    InitSearch,
    ReloadCerts,
    PrevTab,
    NextTab,
    ScrollUp,
    ScrollDown,
    HistoryBack,
    HistoryForward,
    /// Argument: zero-based tab index
    GotoTab,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CloseTab => "close_tab",
            Action::NewTab => "new_tab",
            Action::ReopenClosedTab => "reopen_closed_tab",
            Action::GoHome => "go_home",
            Action::Reload => "reload",
            Action::ShowDownloads => "show_downloads",
            Action::SearchForward => "search_forward",
            Action::SearchBackward => "search_backward",
            Action::FocusLocation => "focus_location",
            Action::InitSearch => "init_search",
            Action::ReloadCerts => "reload_certs",
            Action::PrevTab => "prev_tab",
            Action::NextTab => "next_tab",
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::HistoryBack => "history_back",
            Action::HistoryForward => "history_forward",
            Action::GotoTab => "goto_tab",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
    pub action: Action,
    pub arg: Option<&'static str>,
}

const fn bind(key: Key, modifiers: Modifiers, action: Action) -> KeyBinding {
    KeyBinding {
        key,
        modifiers,
        action,
        arg: None,
    }
}

const fn goto(digit: char, index: &'static str) -> KeyBinding {
    KeyBinding {
        key: Key::Char(digit),
        modifiers: Modifiers::ALT,
        action: Action::GotoTab,
        arg: Some(index),
    }
}

const CTRL: Modifiers = Modifiers::CONTROL;
const ALT: Modifiers = Modifiers::ALT;
const SHIFT: Modifiers = Modifiers::SHIFT;

pub static KEY_BINDINGS: &[KeyBinding] = &[
    bind(Key::Char('w'), CTRL, Action::CloseTab),
    bind(Key::Char('t'), CTRL, Action::NewTab),
    bind(Key::Char('T'), CTRL.union(SHIFT), Action::ReopenClosedTab),
    bind(Key::Char('h'), ALT, Action::GoHome),
    bind(Key::Char('r'), CTRL, Action::Reload),
    bind(Key::Char('j'), CTRL, Action::ShowDownloads),
    bind(Key::Char('f'), CTRL, Action::SearchForward),
    bind(Key::Char('n'), ALT, Action::SearchForward),
    bind(Key::Char('b'), ALT, Action::SearchBackward),
    bind(Key::Char('l'), CTRL, Action::FocusLocation),
    bind(Key::Char('k'), ALT, Action::InitSearch),
    bind(Key::Char('c'), ALT, Action::ReloadCerts),
    bind(Key::PageUp, CTRL, Action::PrevTab),
    bind(Key::PageDown, CTRL, Action::NextTab),
    bind(Key::Char('k'), SHIFT, Action::ScrollUp),
    bind(Key::Char('j'), SHIFT, Action::ScrollDown),
    bind(Key::Char('h'), SHIFT, Action::HistoryBack),
    bind(Key::Char('l'), SHIFT, Action::HistoryForward),
    goto('1', "0"),
    goto('2', "1"),
    goto('3', "2"),
    goto('4', "3"),
    goto('5', "4"),
    goto('6', "5"),
    goto('7', "6"),
    goto('8', "7"),
    goto('9', "8"),
];

/// First table entry matching exactly, ignoring irrelevant modifiers
pub fn find_binding(key: Key, modifiers: Modifiers) -> Option<&'static KeyBinding> {
    let modifiers = modifiers.relevant();
    KEY_BINDINGS
        .iter()
        .find(|b| b.key == key && b.modifiers == modifiers)
}

/// Hardcoded bindings consulted when the table has no match. Shift-based
/// ones only require Shift to be among the held modifiers.
pub fn fallback_action(key: Key, modifiers: Modifiers) -> Option<Action> {
    if modifiers.contains(Modifiers::SHIFT) {
        match key {
            Key::Char('H') => return Some(Action::HistoryBack),
            Key::Char('L') => return Some(Action::HistoryForward),
            Key::Char('K') => return Some(Action::ScrollUp),
            Key::Char('J') => return Some(Action::ScrollDown),
            _ => {}
        }
    }

    match key {
        Key::F(2) => Some(Action::HistoryBack),
        Key::F(3) => Some(Action::HistoryForward),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_is_pinned() {
        let actions: Vec<&str> = KEY_BINDINGS.iter().map(|b| b.action.as_str()).collect();
        assert_eq!(
            &actions[..18],
            &[
                "close_tab",
                "new_tab",
                "reopen_closed_tab",
                "go_home",
                "reload",
                "show_downloads",
                "search_forward",
                "search_forward",
                "search_backward",
                "focus_location",
                "init_search",
                "reload_certs",
                "prev_tab",
                "next_tab",
                "scroll_up",
                "scroll_down",
                "history_back",
                "history_forward",
            ]
        );

        let goto_args: Vec<_> = KEY_BINDINGS[18..].iter().map(|b| b.arg.unwrap()).collect();
        assert_eq!(goto_args, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn test_exact_modifier_match() {
        assert_eq!(
            find_binding(Key::Char('t'), Modifiers::CONTROL).unwrap().action,
            Action::NewTab
        );
        assert_eq!(
            find_binding(Key::Char('T'), Modifiers::CONTROL | Modifiers::SHIFT)
                .unwrap()
                .action,
            Action::ReopenClosedTab
        );
        // Ctrl+Alt+t is not Ctrl+t
        assert!(find_binding(Key::Char('t'), Modifiers::CONTROL | Modifiers::ALT).is_none());
        assert!(find_binding(Key::Char('x'), Modifiers::NONE).is_none());
    }

    #[test]
    fn test_irrelevant_modifiers_ignored() {
        // Caps Lock and Mod2 (Num Lock) bits
        let raw = Modifiers::from_bits(Modifiers::CONTROL.bits() | (1 << 1) | (1 << 4));
        assert_eq!(find_binding(Key::Char('w'), raw).unwrap().action, Action::CloseTab);
    }

    #[test]
    fn test_first_match_wins() {
        let binding = find_binding(Key::Char('k'), Modifiers::ALT).unwrap();
        let first = KEY_BINDINGS
            .iter()
            .position(|b| b.key == Key::Char('k') && b.modifiers == Modifiers::ALT)
            .unwrap();
        assert!(std::ptr::eq(binding, &KEY_BINDINGS[first]));
        assert_eq!(binding.action, Action::InitSearch);
    }

    #[test]
    fn test_goto_arguments() {
        let binding = find_binding(Key::Char('1'), Modifiers::ALT).unwrap();
        assert_eq!(binding.action, Action::GotoTab);
        assert_eq!(binding.arg, Some("0"));
        assert_eq!(find_binding(Key::Char('9'), Modifiers::ALT).unwrap().arg, Some("8"));
    }

    #[test]
    fn test_fallbacks() {
        assert!(find_binding(Key::Char('H'), Modifiers::SHIFT).is_none());
        assert_eq!(
            fallback_action(Key::Char('H'), Modifiers::SHIFT),
            Some(Action::HistoryBack)
        );
        assert_eq!(
            fallback_action(Key::Char('L'), Modifiers::SHIFT | Modifiers::CONTROL),
            Some(Action::HistoryForward)
        );
        assert_eq!(
            fallback_action(Key::Char('K'), Modifiers::SHIFT),
            Some(Action::ScrollUp)
        );
        assert_eq!(
            fallback_action(Key::Char('J'), Modifiers::SHIFT),
            Some(Action::ScrollDown)
        );
        assert_eq!(fallback_action(Key::Char('H'), Modifiers::NONE), None);
        assert_eq!(
            fallback_action(Key::F(2), Modifiers::CONTROL),
            Some(Action::HistoryBack)
        );
        assert_eq!(fallback_action(Key::F(3), Modifiers::NONE), Some(Action::HistoryForward));
        assert_eq!(fallback_action(Key::Char('q'), Modifiers::NONE), None);
    }
}

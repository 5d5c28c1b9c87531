//! Recently closed tabs
//!
//! Most recently closed first. Only the URI survives a close.

use std::collections::VecDeque;

pub const CLOSED_TABS_CAPACITY: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct ClosedTabs {
    entries: VecDeque<String>,
}

impl ClosedTabs {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(CLOSED_TABS_CAPACITY + 1),
        }
    }

    /// Remember a closed tab's URI, evicting the oldest entry when full.
    /// Empty URIs are not recorded.
    pub fn push(&mut self, uri: &str) {
        if uri.is_empty() {
            return;
        }

        self.entries.push_front(uri.to_string());
        if self.entries.len() > CLOSED_TABS_CAPACITY {
            self.entries.pop_back();
        }
    }

    /// Take the most recently closed URI, or `None` when nothing was closed.
    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_bounded() {
        for n in 0..25 {
            let mut closed = ClosedTabs::new();
            for i in 0..n {
                closed.push(&format!("https://x.test/{}", i));
            }
            assert_eq!(closed.len(), n.min(CLOSED_TABS_CAPACITY));
            if n > 0 {
                assert_eq!(closed.peek(), Some(format!("https://x.test/{}", n - 1).as_str()));
            }
        }
    }

    #[test]
    fn test_oldest_is_evicted() {
        let mut closed = ClosedTabs::new();
        for i in 0..11 {
            closed.push(&format!("https://x.test/{}", i));
        }

        let mut drained = Vec::new();
        while let Some(uri) = closed.pop() {
            drained.push(uri);
        }
        assert_eq!(drained.len(), 10);
        assert_eq!(drained.first().unwrap(), "https://x.test/10");
        assert_eq!(drained.last().unwrap(), "https://x.test/1");
    }

    #[test]
    fn test_pop_empty() {
        let mut closed = ClosedTabs::new();
        assert!(closed.pop().is_none());
        closed.push("");
        assert!(closed.is_empty());
    }
}

//! Input resolution for the location bar

use crate::normalize::normalize_uri;

/// Location text starting with this prefix searches the current page.
pub const FIND_PREFIX: &str = ":/";

pub const DEFAULT_SEARCH_TEMPLATE: &str = "https://duckduckgo.com/?q=%s";

/// Result of resolving location bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    /// Search the current page for this text
    Find(String),
    /// Navigate to a normalized URI
    Navigate(String),
    /// Navigate to the search engine with this URL
    Search(String),
}

impl InputResolution {
    /// The URI to load, if the resolution navigates anywhere
    pub fn uri(&self) -> Option<&str> {
        match self {
            InputResolution::Navigate(u) | InputResolution::Search(u) => Some(u),
            InputResolution::Find(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputResolver {
    /// Search engine URL template (%s replaced with query)
    search_template: String,
}

impl InputResolver {
    pub fn new() -> Self {
        Self::with_search_engine(DEFAULT_SEARCH_TEMPLATE.to_string())
    }

    pub fn with_search_engine(template: String) -> Self {
        Self {
            search_template: template,
        }
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    /// Resolve text typed into the location bar
    pub fn resolve(&self, input: &str) -> InputResolution {
        if let Some(needle) = input.strip_prefix(FIND_PREFIX) {
            return InputResolution::Find(needle.to_string());
        }

        self.resolve_uri(input)
    }

    /// Resolve a URI request that never means find-in-page, such as a
    /// command line argument or a forwarded line.
    pub fn resolve_uri(&self, input: &str) -> InputResolution {
        match normalize_uri(input) {
            Ok(uri) => InputResolution::Navigate(uri),
            Err(e) => {
                tracing::debug!(input = %input, error = %e, "Falling back to search");
                InputResolution::Search(self.search_url(input))
            }
        }
    }

    /// Build search URL from query
    pub fn search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        self.search_template.replace("%s", &encoded)
    }
}

impl Default for InputResolver {
    fn default() -> Self {
        Self::new()
    }
}

mod urlencoding {
    pub fn encode(input: &str) -> String {
        let mut result = String::with_capacity(input.len() * 3);
        for byte in input.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char);
                }
                _ => {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_navigate() {
        let resolver = InputResolver::new();

        assert_eq!(
            resolver.resolve("example.com"),
            InputResolution::Navigate("http://example.com".to_string())
        );
        assert_eq!(
            resolver.resolve("https://x.test"),
            InputResolution::Navigate("https://x.test".to_string())
        );
    }

    #[test]
    fn test_resolve_search() {
        let resolver = InputResolver::new();

        match resolver.resolve("rust programming") {
            InputResolution::Search(url) => {
                assert_eq!(url, "https://duckduckgo.com/?q=rust%20programming");
            }
            other => panic!("Expected Search, got {:?}", other),
        }

        match resolver.resolve("./missing") {
            InputResolution::Search(url) => assert!(url.ends_with("q=.%2Fmissing")),
            other => panic!("Expected Search, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_find() {
        let resolver = InputResolver::new();
        assert_eq!(
            resolver.resolve(":/needle"),
            InputResolution::Find("needle".to_string())
        );
        assert!(resolver.resolve(":/needle").uri().is_none());
    }

    #[test]
    fn test_resolve_uri_ignores_find_prefix() {
        let resolver = InputResolver::with_search_engine("https://s.test/?q=%s".to_string());
        assert_eq!(
            resolver.resolve_uri(":/x"),
            InputResolution::Search("https://s.test/?q=%3A%2Fx".to_string())
        );
    }
}

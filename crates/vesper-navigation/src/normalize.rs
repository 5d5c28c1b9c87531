//! URI normalization
//!
//! Turns whatever the user typed (or passed on the command line) into an
//! absolute URI:
//! - `example.com/path` → `http://example.com/path`
//! - `https://…`, `file:…`, `about:…`, `data:…`, `webkit:…` → unchanged
//! - an existing local path → `file:///absolute/path`

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use url::Url;

use crate::error::NavigationError;
use crate::Result;

const KNOWN_SCHEMES: &[&str] = &["http:", "https:", "file:", "about:", "data:", "webkit:"];

fn bare_domain() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9-]+\.[a-zA-Z]{2,}(\S*)?$").expect("bare domain pattern is valid")
    })
}

/// Normalize user input into an absolute URI.
///
/// Fails when the input is neither a bare domain nor a known scheme and
/// does not name an existing local path; callers fall back to a search.
pub fn normalize_uri(input: &str) -> Result<String> {
    if bare_domain().is_match(input) {
        return Ok(format!("http://{}", input));
    }

    let lowered = input.to_ascii_lowercase();
    if KNOWN_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return Ok(input.to_string());
    }

    let absolute = Path::new(input)
        .canonicalize()
        .map_err(|_| NavigationError::Unresolvable(input.to_string()))?;

    Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .map_err(|_| NavigationError::Unresolvable(input.to_string()))
}

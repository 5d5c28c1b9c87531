//! History log
//!
//! Append-only, one URI per line. Nothing is ever read back.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    path: Option<PathBuf>,
}

impl HistoryLog {
    /// A log writing to `path`, or a disabled log when `None`
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Record a visit. Empty URIs are skipped.
    pub fn record_visit(&self, uri: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if uri.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", uri)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let log = HistoryLog::new(Some(path.clone()));

        log.record_visit("https://a.test/").unwrap();
        log.record_visit("").unwrap();
        log.record_visit("https://b.test/").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "https://a.test/\nhttps://b.test/\n");
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let log = HistoryLog::new(None);
        assert!(!log.is_enabled());
        log.record_visit("https://a.test/").unwrap();
    }

    #[test]
    fn test_unwritable_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(Some(dir.path().join("no/such/dir/history")));
        assert!(log.record_visit("https://a.test/").is_err());
    }
}

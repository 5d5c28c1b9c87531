//! Download data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine-side handle of a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadId(pub u64);

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "download-{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadEntry {
    pub id: DownloadId,
    pub suggested_filename: String,
    /// Where the engine writes the file
    pub destination: PathBuf,
    pub content_length: u64,
    pub mime_type: Option<String>,
    /// Fraction in [0, 1]
    pub progress: f64,
    /// Text of the list entry in the downloads window
    pub label: String,
    pub started_at: DateTime<Utc>,
}

impl DownloadEntry {
    pub fn new(
        id: DownloadId,
        suggested_filename: String,
        file_name: String,
        destination: PathBuf,
        content_length: u64,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            id,
            suggested_filename,
            destination,
            content_length,
            mime_type,
            progress: 0.0,
            label: file_name,
            started_at: Utc::now(),
        }
    }

    /// Images are saved quietly, without raising the downloads window
    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }

    /// Get download progress as percentage (0-100)
    pub fn percent(&self) -> f64 {
        self.progress * 100.0
    }

    pub fn size_mb(&self) -> f64 {
        self.content_length as f64 / 1e6
    }

    /// Store a progress report and refresh the label
    pub fn set_progress(&mut self, fraction: f64) {
        self.progress = fraction.clamp(0.0, 1.0);
        let name = self
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.suggested_filename.clone());
        self.label = format!("{} ({:.0}% of {:.1} MB)", name, self.percent(), self.size_mb());
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Replace path separators so a suggested name cannot escape the
/// download directory.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "download".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mime: Option<&str>) -> DownloadEntry {
        DownloadEntry::new(
            DownloadId(1),
            "file.zip".to_string(),
            "file.zip".to_string(),
            PathBuf::from("/downloads/file.zip.1"),
            2_500_000,
            mime.map(str::to_string),
        )
    }

    #[test]
    fn test_new_download() {
        let download = entry(None);
        assert_eq!(download.label, "file.zip");
        assert_eq!(download.progress, 0.0);
        assert!(!download.is_complete());
    }

    #[test]
    fn test_progress_label() {
        let mut download = entry(None);
        download.set_progress(0.5);
        assert_eq!(download.label, "file.zip.1 (50% of 2.5 MB)");

        download.set_progress(1.7);
        assert_eq!(download.progress, 1.0);
        assert!(download.is_complete());

        download.set_progress(-0.2);
        assert_eq!(download.progress, 0.0);
    }

    #[test]
    fn test_is_image() {
        assert!(entry(Some("image/png")).is_image());
        assert!(!entry(Some("application/pdf")).is_image());
        assert!(!entry(None).is_image());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_file_name(""), "download");
        assert_eq!(sanitize_file_name(".."), "download");
    }
}

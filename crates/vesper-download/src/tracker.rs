//! Download tracker

use std::path::{Path, PathBuf};

use crate::download::{sanitize_file_name, DownloadEntry, DownloadId};
use crate::error::DownloadError;
use crate::Result;

/// Names tried per download: the plain name, then `.1` through `.998`.
pub const MAX_NAME_CANDIDATES: usize = 999;

/// An accepted download
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub destination: PathBuf,
    /// Whether accepting it raised the downloads window
    pub window_shown: bool,
}

/// What a progress report did to its download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Updated,
    /// Reached 100%; the entry is gone from the active set
    Finished,
}

/// Owns every in-flight download until the engine reports it done or the
/// user cancels it. The active count is the number of entries held.
#[derive(Debug)]
pub struct DownloadTracker {
    download_dir: PathBuf,
    /// Newest first
    entries: Vec<DownloadEntry>,
    window_visible: bool,
}

impl DownloadTracker {
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            entries: Vec::new(),
            window_visible: false,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Accept a download the engine is about to start, or refuse it.
    /// A refused download must be cancelled by the caller.
    pub fn register(
        &mut self,
        id: DownloadId,
        suggested_filename: &str,
        content_length: u64,
        mime_type: Option<String>,
    ) -> Result<Registration> {
        if content_length == 0 {
            tracing::warn!(download_id = %id, "Refusing download with zero content length");
            return Err(DownloadError::EmptyContent);
        }

        let file_name = sanitize_file_name(suggested_filename);
        let destination = self.resolve_destination(&file_name).ok_or_else(|| {
            tracing::warn!(download_id = %id, file_name = %file_name, "Suffix reached limit for download");
            DownloadError::NoFreeName(file_name.clone())
        })?;

        let entry = DownloadEntry::new(
            id,
            suggested_filename.to_string(),
            file_name,
            destination.clone(),
            content_length,
            mime_type,
        );
        let window_shown = !entry.is_image();
        if window_shown {
            self.window_visible = true;
        }

        tracing::info!(
            download_id = %id,
            destination = %destination.display(),
            "Accepted download"
        );
        self.entries.insert(0, entry);

        Ok(Registration {
            destination,
            window_shown,
        })
    }

    /// First free name among `name`, `name.1`, … `name.998`. Destinations
    /// reserved by in-flight downloads count as taken.
    fn resolve_destination(&self, file_name: &str) -> Option<PathBuf> {
        let base = self.download_dir.join(file_name);
        (0..MAX_NAME_CANDIDATES)
            .map(|n| {
                if n == 0 {
                    base.clone()
                } else {
                    PathBuf::from(format!("{}.{}", base.display(), n))
                }
            })
            .find(|candidate| !candidate.exists() && !self.is_reserved(candidate))
    }

    fn is_reserved(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.destination == path)
    }

    /// Record engine progress. Reaching 100% completes the download right
    /// away; reports for downloads already done are rejected as stale.
    pub fn on_progress(&mut self, id: DownloadId, fraction: f64) -> Result<Progress> {
        let index = self.index_of(id)?;
        let entry = &mut self.entries[index];
        entry.set_progress(fraction);

        if entry.is_complete() {
            self.entries.remove(index);
            tracing::info!(download_id = %id, "Download complete");
            Ok(Progress::Finished)
        } else {
            Ok(Progress::Updated)
        }
    }

    /// The engine's own completion signal. Idempotent with a 100% progress
    /// report: returns whether this call retired the download. Hides the
    /// downloads window once nothing is left in flight.
    pub fn on_engine_finished(&mut self, id: DownloadId) -> bool {
        let removed = match self.index_of(id) {
            Ok(index) => {
                self.entries.remove(index);
                tracing::info!(download_id = %id, "Download finished");
                true
            }
            Err(_) => false,
        };

        if self.entries.is_empty() && self.window_visible {
            self.window_visible = false;
        }

        removed
    }

    /// Drop a download at the user's request. The caller tells the engine
    /// to stop it. A second cancel for the same download fails.
    pub fn cancel(&mut self, id: DownloadId) -> Result<DownloadEntry> {
        let index = self.index_of(id)?;
        tracing::info!(download_id = %id, "Cancelled download");
        Ok(self.entries.remove(index))
    }

    fn index_of(&self, id: DownloadId) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: DownloadId) -> Option<&DownloadEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Downloads in flight, newest first
    pub fn entries(&self) -> &[DownloadEntry] {
        &self.entries
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    pub fn window_visible(&self) -> bool {
        self.window_visible
    }

    pub fn show_window(&mut self) {
        self.window_visible = true;
    }

    pub fn hide_window(&mut self) {
        self.window_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (tempfile::TempDir, DownloadTracker) {
        let dir = tempfile::tempdir().unwrap();
        let tracker = DownloadTracker::new(dir.path().to_path_buf());
        (dir, tracker)
    }

    #[test]
    fn test_zero_length_rejected() {
        let (_dir, mut tracker) = tracker();
        let result = tracker.register(DownloadId(1), "empty.bin", 0, None);
        assert!(matches!(result, Err(DownloadError::EmptyContent)));
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_suffix_for_existing_and_concurrent() {
        let (dir, mut tracker) = tracker();
        std::fs::write(dir.path().join("report.pdf"), b"old").unwrap();

        let first = tracker
            .register(DownloadId(1), "report.pdf", 10, Some("application/pdf".into()))
            .unwrap();
        assert_eq!(first.destination, dir.path().join("report.pdf.1"));

        // The engine has not created report.pdf.1 yet, but it is reserved
        let second = tracker
            .register(DownloadId(2), "report.pdf", 10, Some("application/pdf".into()))
            .unwrap();
        assert_eq!(second.destination, dir.path().join("report.pdf.2"));
        assert_eq!(tracker.active_count(), 2);
    }

    #[test]
    fn test_rejects_after_all_candidates_taken() {
        let (dir, mut tracker) = tracker();
        std::fs::write(dir.path().join("report.pdf"), b"").unwrap();
        for n in 1..MAX_NAME_CANDIDATES {
            std::fs::write(dir.path().join(format!("report.pdf.{}", n)), b"").unwrap();
        }

        let result = tracker.register(DownloadId(1), "report.pdf", 10, None);
        assert!(matches!(result, Err(DownloadError::NoFreeName(_))));
        assert_eq!(tracker.active_count(), 0);
        assert!(!tracker.window_visible());
    }

    #[test]
    fn test_separator_sanitized() {
        let (dir, mut tracker) = tracker();
        let reg = tracker.register(DownloadId(1), "a/b.txt", 10, None).unwrap();
        assert_eq!(reg.destination, dir.path().join("a_b.txt"));
        assert_eq!(tracker.get(DownloadId(1)).unwrap().label, "a_b.txt");
    }

    #[test]
    fn test_images_do_not_raise_window() {
        let (_dir, mut tracker) = tracker();
        let reg = tracker
            .register(DownloadId(1), "cat.png", 10, Some("image/png".into()))
            .unwrap();
        assert!(!reg.window_shown);
        assert!(!tracker.window_visible());

        let reg = tracker
            .register(DownloadId(2), "notes.txt", 10, Some("text/plain".into()))
            .unwrap();
        assert!(reg.window_shown);
        assert!(tracker.window_visible());
    }

    #[test]
    fn test_finish_is_idempotent() {
        let (_dir, mut tracker) = tracker();
        tracker.register(DownloadId(1), "a.bin", 10, None).unwrap();
        tracker.register(DownloadId(2), "b.bin", 10, None).unwrap();

        assert_eq!(tracker.on_progress(DownloadId(1), 0.3).unwrap(), Progress::Updated);
        assert_eq!(tracker.on_progress(DownloadId(1), 1.0).unwrap(), Progress::Finished);
        assert_eq!(tracker.active_count(), 1);

        // The engine's finish signal arrives after 100%
        assert!(!tracker.on_engine_finished(DownloadId(1)));
        assert_eq!(tracker.active_count(), 1);

        // And the other way round
        assert!(tracker.on_engine_finished(DownloadId(2)));
        assert!(tracker.on_progress(DownloadId(2), 1.0).is_err());
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_window_hidden_when_last_finishes() {
        let (_dir, mut tracker) = tracker();
        tracker.register(DownloadId(1), "a.bin", 10, None).unwrap();
        tracker.register(DownloadId(2), "b.bin", 10, None).unwrap();
        assert!(tracker.window_visible());

        tracker.on_engine_finished(DownloadId(1));
        assert!(tracker.window_visible());
        tracker.on_engine_finished(DownloadId(2));
        assert!(!tracker.window_visible());
    }

    #[test]
    fn test_cancel_once() {
        let (_dir, mut tracker) = tracker();
        tracker.register(DownloadId(1), "a.bin", 10, None).unwrap();

        let entry = tracker.cancel(DownloadId(1)).unwrap();
        assert_eq!(entry.id, DownloadId(1));
        assert!(matches!(
            tracker.cancel(DownloadId(1)),
            Err(DownloadError::NotFound(_))
        ));
    }

    #[test]
    fn test_newest_first() {
        let (_dir, mut tracker) = tracker();
        tracker.register(DownloadId(1), "a.bin", 10, None).unwrap();
        tracker.register(DownloadId(2), "b.bin", 10, None).unwrap();
        let ids: Vec<_> = tracker.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![DownloadId(2), DownloadId(1)]);
    }
}

//! Per-user resources: trusted certificates and user scripts

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A certificate the user trusts for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedCert {
    /// Taken from the file name
    pub host: String,
    pub pem: Vec<u8>,
}

/// Regular files in `dir`, sorted by name. A missing directory is empty.
fn sorted_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "No resources directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

/// Every file in `dir` is a certificate for the host it is named after.
/// Unreadable files are skipped.
pub fn load_trusted_certs(dir: &Path) -> Vec<TrustedCert> {
    sorted_files(dir)
        .into_iter()
        .filter_map(|path| {
            let host = path.file_name()?.to_string_lossy().into_owned();
            match fs::read(&path) {
                Ok(pem) => Some(TrustedCert { host, pem }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not load trusted cert");
                    None
                }
            }
        })
        .collect()
}

/// `*.js` files run against every fully loaded page. The directory is
/// rescanned each time, but a file is only read once.
#[derive(Debug)]
pub struct UserScripts {
    dir: PathBuf,
    cache: HashMap<PathBuf, String>,
}

impl UserScripts {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            cache: HashMap::new(),
        }
    }

    /// Script sources in file name order
    pub fn scripts(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        for path in sorted_files(&self.dir) {
            if path.extension().and_then(|e| e.to_str()) != Some("js") {
                continue;
            }

            if let Some(source) = self.cache.get(&path) {
                out.push(source.clone());
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(source) => {
                    tracing::debug!(path = %path.display(), "Cached user script");
                    out.push(source.clone());
                    self.cache.insert(path, source);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not read user script");
                }
            }
        }
        out
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

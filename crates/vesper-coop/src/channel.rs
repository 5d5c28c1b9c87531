//! Named-pipe coordination channel
//!
//! Protocol: UTF-8 text, one URI per line, no acknowledgement. A writer
//! probes with a zero-length write before committing to the secondary role.

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::unix::pipe;

use crate::error::CoopError;
use crate::Result;

/// `{runtime_dir}/{app}.fifo-{suffix}`
pub fn fifo_path(runtime_dir: &Path, app_name: &str, suffix: &str) -> PathBuf {
    runtime_dir.join(format!("{}.fifo-{}", app_name, suffix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns the read end and hosts the tabs
    Primary,
    /// Forwards its URIs to the primary
    Secondary,
    /// No usable channel; hosts its own tabs without listening
    Standalone,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
            Role::Standalone => "standalone",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role this process settled on, with the pipe end that goes with it.
#[derive(Debug)]
pub enum Cooperation {
    Primary(Listener),
    Secondary(Forwarder),
    Standalone,
}

impl Cooperation {
    /// Decide this process's role. Never fails: any channel problem leaves
    /// the process standalone.
    ///
    /// Must be called from within a Tokio runtime, which the primary's
    /// listener registers with.
    pub fn setup(path: &Path) -> Self {
        if let Err(e) = ensure_fifo(path) {
            tracing::warn!(path = %path.display(), error = %e, "Cooperation disabled");
            return Cooperation::Standalone;
        }

        match open_writer(path) {
            Ok(mut file) => match file.write(&[]) {
                Ok(_) => {
                    tracing::info!(path = %path.display(), "Primary instance found, forwarding");
                    Cooperation::Secondary(Forwarder {
                        file,
                        path: path.to_path_buf(),
                    })
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Probe write failed, nobody is listening");
                    drop(file);
                    Self::listen(path)
                }
            },
            // Opening the write end without blocking fails with ENXIO
            // while no process holds the read end.
            Err(e) if e.raw_os_error() == Some(Errno::ENXIO as i32) => Self::listen(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Can't open FIFO at all");
                Cooperation::Standalone
            }
        }
    }

    fn listen(path: &Path) -> Self {
        match Listener::open(path) {
            Ok(listener) => {
                tracing::info!(path = %path.display(), "Listening for forwarded URIs");
                Cooperation::Primary(listener)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot listen on FIFO");
                Cooperation::Standalone
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Cooperation::Primary(_) => Role::Primary,
            Cooperation::Secondary(_) => Role::Secondary,
            Cooperation::Standalone => Role::Standalone,
        }
    }
}

fn ensure_fifo(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => Ok(()),
        Ok(_) => Err(CoopError::NotAFifo(path.to_path_buf())),
        Err(_) => match mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR) {
            // Another instance created it first
            Ok(()) | Err(Errno::EEXIST) => Ok(()),
            Err(source) => Err(CoopError::Create {
                path: path.to_path_buf(),
                source,
            }),
        },
    }
}

fn open_writer(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .custom_flags(OFlag::O_NONBLOCK.bits())
        .open(path)
}

/// Write end held by a secondary for the rest of its run.
#[derive(Debug)]
pub struct Forwarder {
    file: File,
    path: PathBuf,
}

impl Forwarder {
    /// Send one URI to the primary. Interrupted writes are retried; any
    /// other failure is returned.
    pub fn forward(&mut self, uri: &str) -> Result<()> {
        // One write per line so short lines reach the reader unsplit
        let mut line = Vec::with_capacity(uri.len() + 1);
        line.extend_from_slice(uri.as_bytes());
        line.push(b'\n');

        self.file.write_all(&line).map_err(CoopError::Write)?;
        tracing::debug!(uri = %uri, "Forwarded URI");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read end owned by the primary.
#[derive(Debug)]
pub struct Listener {
    reader: BufReader<pipe::Receiver>,
    /// Bytes of a line still being received
    pending: Vec<u8>,
    path: PathBuf,
}

impl Listener {
    fn open(path: &Path) -> Result<Self> {
        // Holding the pipe open for writing as well keeps readers from
        // seeing end-of-file between secondaries.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)?;
        let receiver = pipe::Receiver::from_file(file)?;

        Ok(Self {
            reader: BufReader::new(receiver),
            pending: Vec::new(),
            path: path.to_path_buf(),
        })
    }

    /// Wait for the next forwarded URI, trimmed. Lines that are empty or
    /// not UTF-8 are dropped. Returns `None` once the pipe is closed.
    ///
    /// Cancel safe: a partially received line is kept for the next call.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            let n = self.reader.read_until(b'\n', &mut self.pending).await?;
            if n == 0 && self.pending.is_empty() {
                return Ok(None);
            }

            let raw = std::mem::take(&mut self.pending);
            if let Some(uri) = decode_line(&raw) {
                return Ok(Some(uri));
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed line from FIFO");
            return None;
        }
    };

    let uri = text.trim();
    if uri.is_empty() {
        None
    } else {
        Some(uri.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_fifo_path() {
        let path = fifo_path(Path::new("/run/user/1000"), "vesper", "main");
        assert_eq!(path, PathBuf::from("/run/user/1000/vesper.fifo-main"));
    }

    #[tokio::test]
    async fn test_first_instance_becomes_primary() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_path(dir.path(), "vesper", "test");

        let coop = Cooperation::setup(&path);
        assert_eq!(coop.role(), Role::Primary);

        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.file_type().is_fifo());
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_second_instance_forwards() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_path(dir.path(), "vesper", "test");

        let mut listener = match Cooperation::setup(&path) {
            Cooperation::Primary(listener) => listener,
            other => panic!("Expected primary, got {}", other.role()),
        };
        let mut forwarder = match Cooperation::setup(&path) {
            Cooperation::Secondary(forwarder) => forwarder,
            other => panic!("Expected secondary, got {}", other.role()),
        };

        forwarder.forward("http://example.com").unwrap();
        assert_eq!(
            listener.next_line().await.unwrap().as_deref(),
            Some("http://example.com")
        );
    }

    #[tokio::test]
    async fn test_stale_fifo_without_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_path(dir.path(), "vesper", "stale");
        mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

        assert_eq!(Cooperation::setup(&path).role(), Role::Primary);
    }

    #[tokio::test]
    async fn test_regular_file_degrades_to_standalone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vesper.fifo-main");
        std::fs::write(&path, b"not a pipe").unwrap();

        assert_eq!(Cooperation::setup(&path).role(), Role::Standalone);
    }

    #[tokio::test]
    async fn test_malformed_lines_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = fifo_path(dir.path(), "vesper", "test");

        let mut listener = match Cooperation::setup(&path) {
            Cooperation::Primary(listener) => listener,
            other => panic!("Expected primary, got {}", other.role()),
        };

        let mut raw = open_writer(&path).unwrap();
        raw.write_all(b"\xff\xfe\n\n  https://ok.test/  \n").unwrap();

        assert_eq!(
            listener.next_line().await.unwrap().as_deref(),
            Some("https://ok.test/")
        );
    }
}

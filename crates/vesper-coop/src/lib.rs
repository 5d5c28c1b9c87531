//! Vesper Cooperation
//!
//! Several invocations share one browser process. The first instance owns
//! the read end of a per-user named pipe; later ones write their URIs into
//! it, one per line, and exit.
//!
//! Two instances starting at the same moment may both find nobody
//! listening and both become primary. No lock arbitrates this.

mod channel;
mod error;

pub use channel::{fifo_path, Cooperation, Forwarder, Listener, Role};
pub use error::CoopError;

pub type Result<T> = std::result::Result<T, CoopError>;

//! Process resource limits

use nix::sys::resource::{getrlimit, setrlimit, Resource};

/// Raise the open-file soft limit to the hard limit. Best effort.
pub(crate) fn raise_nofile_limit() {
    let (soft, hard) = match getrlimit(Resource::RLIMIT_NOFILE) {
        Ok(limits) => limits,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read open file limit");
            return;
        }
    };

    if soft >= hard {
        return;
    }

    match setrlimit(Resource::RLIMIT_NOFILE, hard, hard) {
        Ok(()) => tracing::debug!(from = soft, to = hard, "Raised open file limit"),
        Err(e) => tracing::warn!(error = %e, "Could not raise open file limit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_lowers_soft_limit() {
        let (before, _) = getrlimit(Resource::RLIMIT_NOFILE).unwrap();
        raise_nofile_limit();
        let (soft, hard) = getrlimit(Resource::RLIMIT_NOFILE).unwrap();
        assert!(soft >= before);
        assert!(soft <= hard);
    }
}

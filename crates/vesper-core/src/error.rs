//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Session error: {0}")]
    Session(#[from] vesper_session::SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_session::SessionError;

    #[test]
    fn test_session_error_converts() {
        let err: CoreError = SessionError::IndexOutOfRange(4).into();
        assert!(matches!(err, CoreError::Session(SessionError::IndexOutOfRange(4))));
        assert_eq!(err.to_string(), "Session error: Tab index out of range: 4");
    }
}

//! Error types for session operations
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },
}

impl SessionError {
    /// Check if this error was raised by local input validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            SessionError::EmptyUsername
                | SessionError::EmptyPassword
                | SessionError::InvalidEmail { .. }
        )
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}

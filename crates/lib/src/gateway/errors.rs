//! Error types for the remote gateway.

use thiserror::Error;

/// Errors returned by a [`RemoteProfileGateway`](super::RemoteProfileGateway).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The remote could not be reached or did not answer properly.
    #[error("Remote unreachable: {reason}")]
    Unreachable { reason: String },

    /// The remote answered and refused the request.
    #[error("Remote rejected request ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    /// The remote answered with a body this client cannot decode.
    #[error("Invalid response from remote: {reason}")]
    InvalidResponse { reason: String },

    /// The configured remote address is not usable.
    #[error("Invalid remote URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl GatewayError {
    /// Check if the remote refused the request (bad credentials, expired token).
    pub fn is_rejected(&self) -> bool {
        matches!(self, GatewayError::Rejected { .. })
    }

    /// Check if this is a transport-level failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Unreachable { .. } | GatewayError::InvalidResponse { .. }
        )
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GatewayError> for crate::Error {
    fn from(err: GatewayError) -> Self {
        crate::Error::Gateway(err)
    }
}

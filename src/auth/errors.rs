//! Access gate errors

use thiserror::Error;

/// Result type for gate checks
pub type AuthResult<T> = Result<T, AuthError>;

/// Credential failures, all answered with 401 and a basic-auth challenge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential header on the request
    #[error("missing credentials")]
    MissingCredentials,

    /// Credential header present but not decodable basic auth
    #[error("malformed credentials")]
    MalformedCredentials,

    /// Credentials decoded but not authorized
    #[error("invalid credentials")]
    InvalidCredentials,
}

//! Basic-credential access gate
//!
//! Every non-`OPTIONS` request must carry `Authorization: Basic ...`
//! credentials. A request is admitted when the username appears in the
//! authorized-user list AND the password appears in the authorized-password
//! list. Each list is checked independently, NOT as paired tuples: any
//! authorized username combined with any authorized password is admitted.
//! This mirrors the behavior the service has always had and is a likely
//! latent security bug; whether to pair credentials is an open question for
//! the service owner, so it is deliberately not changed here.

use axum::http::{header, HeaderMap, Method};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};

/// Challenge value sent with every 401
pub const CHALLENGE: &str = "Basic realm=Authorization Required";

/// Admits or rejects requests before any protocol work runs
#[derive(Debug, Clone)]
pub struct AccessGate {
    users: Vec<String>,
    passwords: Vec<String>,
}

impl AccessGate {
    /// Create a gate from the authorized user and password lists
    pub fn new(users: Vec<String>, passwords: Vec<String>) -> Self {
        Self { users, passwords }
    }

    /// Check one request
    ///
    /// Preflight (`OPTIONS`) requests bypass the gate unconditionally.
    pub fn admit(&self, method: &Method, headers: &HeaderMap) -> AuthResult<()> {
        if method == Method::OPTIONS {
            return Ok(());
        }

        let header = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let (user, password) = parse_basic(header)?;

        if contains(&self.users, &user) && contains(&self.passwords, &password) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Decode a `Basic` authorization header into user and password
fn parse_basic(header: &str) -> AuthResult<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(AuthError::MalformedCredentials)?;
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::MalformedCredentials)?;
    let text = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let (user, password) = text.split_once(':').ok_or(AuthError::MalformedCredentials)?;
    if user.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok((user.to_string(), password.to_string()))
}

/// Constant-time membership test
fn contains(list: &[String], candidate: &str) -> bool {
    let mut found = false;
    for entry in list {
        found |= bool::from(entry.as_bytes().ct_eq(candidate.as_bytes()));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AccessGate {
        AccessGate::new(
            vec!["alice".to_string(), "bob".to_string()],
            vec!["secret-a".to_string(), "secret-b".to_string()],
        )
    }

    fn basic_header(user: &str, password: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let token = BASE64.encode(format!("{user}:{password}"));
        headers.insert(
            header::AUTHORIZATION,
            format!("Basic {token}").parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_admits_matching_pair() {
        let result = gate().admit(&Method::GET, &basic_header("alice", "secret-a"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_admits_crossed_pair() {
        // Documented quirk: any authorized user with any authorized password.
        let result = gate().admit(&Method::GET, &basic_header("alice", "secret-b"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_unknown_user() {
        let err = gate()
            .admit(&Method::GET, &basic_header("mallory", "secret-a"))
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn test_rejects_unknown_password() {
        let err = gate()
            .admit(&Method::GET, &basic_header("alice", "guess"))
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn test_rejects_missing_header() {
        let err = gate().admit(&Method::GET, &HeaderMap::new()).unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
    }

    #[test]
    fn test_rejects_non_basic_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer token".parse().unwrap());
        let err = gate().admit(&Method::GET, &headers).unwrap_err();
        assert_eq!(err, AuthError::MalformedCredentials);
    }

    #[test]
    fn test_rejects_undecodable_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic %%%".parse().unwrap());
        let err = gate().admit(&Method::GET, &headers).unwrap_err();
        assert_eq!(err, AuthError::MalformedCredentials);
    }

    #[test]
    fn test_rejects_empty_user_or_password() {
        let err = gate()
            .admit(&Method::GET, &basic_header("", "secret-a"))
            .unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);

        let err = gate()
            .admit(&Method::GET, &basic_header("alice", ""))
            .unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
    }

    #[test]
    fn test_options_bypasses_gate() {
        let result = gate().admit(&Method::OPTIONS, &HeaderMap::new());
        assert!(result.is_ok());
    }
}

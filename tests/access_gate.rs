//! Access gate admission tests
//!
//! Covers the credential check that runs before any protocol work, the
//! unconditional preflight bypass, and the 401 challenge shape.

use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use eventgate::auth::{AccessGate, AuthError};
use eventgate::odata::GatewayError;

fn gate() -> AccessGate {
    AccessGate::new(
        vec!["reader".to_string(), "writer".to_string()],
        vec!["pw-reader".to_string(), "pw-writer".to_string()],
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
fn every_method_requires_credentials_except_options() {
    let gate = gate();
    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::from_bytes(b"MERGE").unwrap(),
    ] {
        let err = gate.admit(&method, &HeaderMap::new()).unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials, "method: {method}");
    }

    assert!(gate.admit(&Method::OPTIONS, &HeaderMap::new()).is_ok());
}

#[test]
fn authorized_pair_is_admitted() {
    assert!(gate()
        .admit(&Method::GET, &basic_header("reader", "pw-reader"))
        .is_ok());
}

#[test]
fn crossed_lists_are_admitted() {
    // The lists are checked independently, not as pairs; this mirrors the
    // service's long-standing behavior.
    assert!(gate()
        .admit(&Method::GET, &basic_header("reader", "pw-writer"))
        .is_ok());
    assert!(gate()
        .admit(&Method::GET, &basic_header("writer", "pw-reader"))
        .is_ok());
}

#[test]
fn unauthorized_credentials_are_rejected() {
    let gate = gate();
    for (user, password) in [
        ("reader", "wrong"),
        ("stranger", "pw-reader"),
        ("stranger", "wrong"),
    ] {
        let err = gate
            .admit(&Method::GET, &basic_header(user, password))
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials, "{user}:{password}");
    }
}

#[test]
fn rejection_carries_basic_challenge() {
    let err = GatewayError::Auth(AuthError::MissingCredentials);
    let response = err.into_response();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(challenge.starts_with("Basic"));
}

//! Router and request glue
//!
//! A single multiplexed route serves every entity set; the resource segment
//! carries the set name and optional key. Method routing happens here so
//! that the nonstandard `MERGE` verb can be dispatched alongside `PUT`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderName, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AccessGate;
use crate::odata::{parse_resource_path, GatewayError, ODataGateway};

/// Shared per-process request state
pub struct AppState {
    /// Protocol façade
    pub gateway: ODataGateway,
    /// Credential gate
    pub gate: AccessGate,
}

/// Request headers the CORS layer allows
const ALLOWED_HEADERS: [&str; 5] = [
    "x-csrf-token",
    "odata-version",
    "mime-version",
    "odata-maxversion",
    "content-type",
];

/// Build the application router
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let cors = cors_layer(cors_origins);

    Router::new()
        .route("/", any(service_root))
        .route("/:resource", any(dispatch))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy: configured origin allow-list, or permissive when unset
fn cors_layer(origins: &[String]) -> CorsLayer {
    let headers: Vec<HeaderName> = ALLOWED_HEADERS
        .into_iter()
        .map(HeaderName::from_static)
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(headers)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(headers)
    }
}

/// Gate middleware; preflight requests pass through untouched
async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    state
        .gate
        .admit(request.method(), request.headers())
        .map_err(GatewayError::from)?;
    Ok(next.run(request).await)
}

/// `GET /`: OData service document listing the entity sets
async fn service_root(
    State(state): State<Arc<AppState>>,
    method: Method,
) -> Result<Response, GatewayError> {
    match method {
        Method::GET => {
            let body = json!({ "d": { "EntitySets": state.gateway.entity_sets() } });
            Ok(Json(body).into_response())
        }
        Method::OPTIONS => Ok(StatusCode::NO_CONTENT.into_response()),
        _ => Err(GatewayError::MethodNotAllowed),
    }
}

/// All entity-set operations, multiplexed on one route
async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(options): Query<HashMap<String, String>>,
    method: Method,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let path = parse_resource_path(&resource)?;
    let gateway = &state.gateway;

    match (method.as_str(), path.key) {
        ("GET", None) => {
            let envelope = gateway.list(&path.entity_set, &options).await?;
            Ok(Json(envelope).into_response())
        }
        ("GET", Some(key)) => {
            let envelope = gateway.get(&path.entity_set, &key).await?;
            Ok(Json(envelope).into_response())
        }
        ("POST", None) => {
            let payload = parse_body(&body)?;
            let envelope = gateway.create(&path.entity_set, payload).await?;
            Ok((StatusCode::CREATED, Json(envelope)).into_response())
        }
        ("PUT" | "MERGE", Some(key)) => {
            let payload = parse_body(&body)?;
            gateway.update(&path.entity_set, &key, payload).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        ("DELETE", Some(key)) => {
            gateway.delete(&path.entity_set, &key).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        ("OPTIONS", _) => Ok(StatusCode::NO_CONTENT.into_response()),
        _ => Err(GatewayError::MethodNotAllowed),
    }
}

/// Decode a JSON request body
fn parse_body(body: &Bytes) -> Result<Value, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::Payload(format!("body is not valid JSON: {err}")))
}

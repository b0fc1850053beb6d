//! CRUD handlers for `/endpoints` and `/endpoints/{id}`.
//!
//! Identifiers are taken from the raw request path with a single pattern
//! match; anything that does not match is rejected before the store is
//! touched. Every store access runs on the blocking pool: writes rewrite
//! the CSV file while holding the store's write lock, and reads wait on
//! that same lock.

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::SocketAddr;
use tracing::{error, info, instrument, warn};

use crate::endpoint::Endpoint;
use crate::handlers::error::ApiError;
use crate::state::SharedState;
use crate::store::{PutOutcome, StoreError};

/// Path pattern for a single endpoint resource.
pub const ENDPOINT_PATH_PATTERN: &str = "^/endpoints/([a-z][-a-z0-9]+)$";

/// Collection path that accepts POST without an identifier.
pub const COLLECTION_PATH: &str = "/endpoints/";

static ENDPOINT_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(ENDPOINT_PATH_PATTERN).expect("endpoint path pattern is valid"));

/// Extracts the endpoint identifier from a request path.
pub fn extract_identifier(path: &str) -> Result<&str, ApiError> {
    ENDPOINT_PATH_RE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "path \"{}\" does not match pattern \"{}\"",
                path, ENDPOINT_PATH_PATTERN
            ))
        })
}

/// Logs a rejected request and counts it.
fn rejected(state: &SharedState, method: &Method, remote: SocketAddr, err: ApiError) -> ApiError {
    state.stats.record_rejected();
    if err.status().is_server_error() {
        error!("{} request from {} failed: {}", method, remote, err);
    } else {
        warn!("{} request from {} rejected: {}", method, remote, err);
    }
    err
}

fn store_error(state: &SharedState, err: StoreError) -> ApiError {
    match err {
        StoreError::IdentifierMismatch { .. } => ApiError::BadRequest(err.to_string()),
        StoreError::Persistence(_) => {
            state.stats.record_persistence_failure();
            ApiError::Internal(err.to_string())
        }
        StoreError::Poisoned => ApiError::Internal(err.to_string()),
    }
}

/// Handler for `GET /endpoints/{id}`.
#[instrument(skip(state))]
pub async fn get_endpoint(
    State(state): State<SharedState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Result<Json<Endpoint>, ApiError> {
    state.stats.record_http_request();
    info!("GET {} from {}", uri, remote);
    let reject = |err| rejected(&state, &Method::GET, remote, err);

    let identifier = extract_identifier(uri.path()).map_err(reject)?.to_string();

    let store = state.store.clone();
    let lookup = identifier.clone();
    let found = tokio::task::spawn_blocking(move || store.get(&lookup))
        .await
        .map_err(|e| reject(ApiError::Internal(format!("store task failed: {}", e))))?
        .map_err(|e| reject(store_error(&state, e)))?;

    match found {
        Some(endpoint) => Ok(Json(endpoint)),
        None => Err(reject(ApiError::NotFound(format!(
            "no such endpoint \"{}\"",
            identifier
        )))),
    }
}

/// Handler for `POST /endpoints/` and `POST /endpoints/{id}`.
///
/// Returns 201 when the identifier was new and 204 when an existing record
/// was replaced. The decision is made under the same lock that performs the
/// write.
#[instrument(skip(state, body))]
pub async fn post_endpoint(
    State(state): State<SharedState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.stats.record_http_request();
    info!("POST {} from {}", uri, remote);
    let reject = |err| rejected(&state, &Method::POST, remote, err);

    let path_identifier = if uri.path() == COLLECTION_PATH {
        None
    } else {
        Some(extract_identifier(uri.path()).map_err(reject)?)
    };

    let endpoint: Endpoint = serde_json::from_slice(&body)
        .map_err(|e| reject(ApiError::BadRequest(format!("parse JSON body: {}", e))))?;

    if let Some(path_identifier) = path_identifier {
        if path_identifier != endpoint.identifier {
            return Err(reject(ApiError::BadRequest(format!(
                "identifier mismatch (resource: {}, body: {})",
                path_identifier, endpoint.identifier
            ))));
        }
    }

    let store = state.store.clone();
    let identifier = endpoint.identifier.clone();
    let outcome = tokio::task::spawn_blocking(move || store.put(&identifier, endpoint))
        .await
        .map_err(|e| reject(ApiError::Internal(format!("store task failed: {}", e))))?
        .map_err(|e| reject(store_error(&state, e)))?;

    match outcome {
        PutOutcome::Created => {
            state.stats.record_created();
            Ok(StatusCode::CREATED)
        }
        PutOutcome::Replaced => {
            state.stats.record_replaced();
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

/// Handler for `DELETE /endpoints/{id}`. Deleting an unknown identifier
/// still answers 204.
#[instrument(skip(state))]
pub async fn delete_endpoint(
    State(state): State<SharedState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Result<StatusCode, ApiError> {
    state.stats.record_http_request();
    info!("DELETE {} from {}", uri, remote);
    let reject = |err| rejected(&state, &Method::DELETE, remote, err);

    let identifier = extract_identifier(uri.path()).map_err(reject)?.to_string();

    let store = state.store.clone();
    let removed = tokio::task::spawn_blocking(move || store.delete(&identifier))
        .await
        .map_err(|e| reject(ApiError::Internal(format!("store task failed: {}", e))))?
        .map_err(|e| reject(store_error(&state, e)))?;

    if removed {
        state.stats.record_deleted();
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `GET /endpoints`.
#[instrument(skip(state))]
pub async fn list_endpoints(
    State(state): State<SharedState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
) -> Result<Json<Vec<Endpoint>>, ApiError> {
    state.stats.record_http_request();
    info!("GET /endpoints from {}", remote);

    let reject = |err| rejected(&state, &Method::GET, remote, err);

    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.list())
        .await
        .map_err(|e| reject(ApiError::Internal(format!("store task failed: {}", e))))?
        .map(Json)
        .map_err(|e| reject(store_error(&state, e)))
}

/// Handler for `HEAD` on the endpoint paths, which only serve GET bodies.
#[instrument(skip(state))]
pub async fn head_not_allowed(
    State(state): State<SharedState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> ApiError {
    state.stats.record_http_request();
    rejected(
        &state,
        &Method::HEAD,
        remote,
        ApiError::MethodNotAllowed(uri.path().to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_identifier_valid() {
        for id in ["svc-a", "ab", "a-", "z9", "frontend-eu-1"] {
            let path = format!("/endpoints/{}", id);
            assert_eq!(extract_identifier(&path).unwrap(), id);
        }
    }

    #[test]
    fn test_extract_identifier_invalid() {
        for path in [
            "/endpoints/",
            "/endpoints/a",
            "/endpoints/Bad_ID",
            "/endpoints/1abc",
            "/endpoints/-abc",
            "/endpoints/svc-a/",
            "/endpoints/svc-a/extra",
            "/endpoints",
            "/other/svc-a",
            "/endpoints/svc%20a",
        ] {
            let err = extract_identifier(path).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "path {}", path);
        }
    }
}

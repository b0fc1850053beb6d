//! HTTP endpoint handlers for the service.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/endpoints`: list endpoint configurations
//! - `/endpoints/{id}`: read, create/replace and delete one configuration
//! - `/health`: service statistics
//! - `/`: landing page

pub mod endpoints;
pub mod error;
pub mod health;
pub mod root;

use axum::{
    routing::{get, MethodRouter},
    Router,
};

use crate::state::SharedState;

// Re-export handlers
pub use endpoints::{
    delete_endpoint, extract_identifier, get_endpoint, head_not_allowed, list_endpoints,
    post_endpoint,
};
pub use error::ApiError;
pub use health::health_handler;
pub use root::root_handler;

/// Builds the application router.
///
/// Handlers read the peer address through `ConnectInfo`, so the router must
/// be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: SharedState, enable_health: bool) -> Router {
    // axum answers HEAD with the GET handler unless HEAD has its own
    // endpoint; these paths only accept the verbs listed here.
    let resource: MethodRouter<SharedState> = get(get_endpoint)
        .head(head_not_allowed)
        .post(post_endpoint)
        .delete(delete_endpoint);

    // `/endpoints/{*path}` does not match an empty tail, so the bare
    // collection path gets its own route.
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/endpoints", get(list_endpoints).head(head_not_allowed))
        .route("/endpoints/", resource.clone())
        .route("/endpoints/{*path}", resource);

    if enable_health {
        app = app.route("/health", get(health_handler));
    }

    app.with_state(state)
}

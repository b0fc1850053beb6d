//! Root endpoint handler for the landing page.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.stats.record_http_request();

    let version = env!("CARGO_PKG_VERSION");
    let built = env!("VERGEN_BUILD_TIMESTAMP");

    let uptime_secs = state.stats.get_uptime_seconds();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    let uptime_str = format!("{}h {}m {}s", hours, minutes, seconds);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>meow-config</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 900px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 15px; }}
        li {{ margin: 12px 0; }}
        code {{ background: #e9ecef; padding: 2px 6px; border-radius: 3px; }}
    </style>
</head>
<body>
<div class="container">
    <h1>meow-config</h1>
    <p>Version {version} (built {built}) &middot; uptime {uptime}</p>

    <h2>Available Endpoints</h2>
    <ul>
        <li><code>GET /endpoints</code> list all endpoint configurations</li>
        <li><code>GET /endpoints/{{id}}</code> fetch one endpoint configuration</li>
        <li><code>POST /endpoints/</code> or <code>POST /endpoints/{{id}}</code> create or replace</li>
        <li><code>DELETE /endpoints/{{id}}</code> remove an endpoint configuration</li>
        <li><a href="/health">/health</a> service statistics (text)</li>
    </ul>
</div>
</body>
</html>"#,
        version = version,
        built = built,
        uptime = uptime_str,
    );

    Html(html)
}

pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod tasks;

use axum::http::StatusCode;
use task_tracker_core::ports::PortError;
use tracing::error;

// Re-export the router builder and auth middleware to make them easily
// accessible to the binary that builds the web server.
pub use middleware::require_auth;
pub use rest::api_router;

/// Maps a port error to the caller-visible status code and message.
///
/// `context` names the failed operation and doubles as the outward message
/// for unexpected failures, so storage details are logged but never leaked.
pub(crate) fn port_error_response(context: &str, err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(detail) => {
            error!("{}: {}", context, detail);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting the `/tasks...` routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub i64);

/// Middleware that validates the `Authorization: Bearer <token>` header and
/// resolves it to a user id.
///
/// If valid, inserts `AuthedUser` into request extensions for handlers to use.
/// If missing, malformed, or unknown, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the bearer token from the Authorization header
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Resolve the token against the in-memory session table
    let user_id = state
        .sessions
        .authenticate(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Insert the caller's identity into request extensions
    req.extensions_mut().insert(AuthedUser(user_id));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

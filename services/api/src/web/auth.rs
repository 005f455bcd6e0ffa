//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use task_tracker_core::ports::PortError;
use tracing::error;
use utoipa::ToSchema;

use crate::web::port_error_response;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

// Fields are Options so a missing field is our 400, not the framework's 422.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub user_id: i64,
}

fn require_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), (StatusCode, String)> {
    match (username, password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err((
            StatusCode::BAD_REQUEST,
            "username and password are required".to_string(),
        )),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /register - Create a new user account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Missing username or password"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the payload
    let (username, password) = require_credentials(req.username, req.password)?;

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to hash password".to_string(),
            )
        })?
        .to_string();

    // 3. Create the user; a duplicate username surfaces as 409
    let user = state
        .users
        .create_user(&username, &password_hash)
        .await
        .map_err(|e| port_error_response("Failed to create user", e))?;

    // 4. Return the new identity
    let response = RegisterResponse {
        user_id: user.id,
        username: user.username,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the payload
    let (username, password) = require_credentials(req.username, req.password)?;

    // 2. Look up the stored credentials. Unknown user and wrong password get
    //    the same 401 so the response does not reveal which usernames exist.
    let creds = state
        .users
        .get_user_by_username(&username)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            other => port_error_response("Failed to load user", other),
        })?;

    // 3. Verify the password against the stored hash
    let parsed_hash = PasswordHash::new(&creds.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error".to_string(),
        )
    })?;

    let valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".to_string(),
        ));
    }

    // 4. Issue a session token bound to this user
    let token = state
        .sessions
        .issue(creds.id)
        .await
        .map_err(|e| port_error_response("Failed to create session", e))?;

    // 5. Return the token alongside the identity
    let response = LoginResponse {
        token,
        username: creds.username,
        user_id: creds.id,
    };
    Ok((StatusCode::OK, Json(response)))
}

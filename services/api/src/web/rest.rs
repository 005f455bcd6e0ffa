//! services/api/src/web/rest.rs
//!
//! Contains the router assembly for the REST API and the master definition
//! for the OpenAPI specification.

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::web::auth::{self, login_handler, register_handler};
use crate::web::middleware::require_auth;
use crate::web::state::AppState;
use crate::web::tasks::{
    self, complete_task_handler, create_task_handler, delete_task_handler, get_task_handler,
    list_completed_handler, list_in_progress_handler, list_pending_handler, list_tasks_handler,
    reset_task_handler, start_task_handler,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        tasks::list_tasks_handler,
        tasks::get_task_handler,
        tasks::create_task_handler,
        tasks::delete_task_handler,
        tasks::list_pending_handler,
        tasks::list_completed_handler,
        tasks::list_in_progress_handler,
        tasks::complete_task_handler,
        tasks::start_task_handler,
        tasks::reset_task_handler,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::RegisterResponse,
        auth::LoginResponse,
        tasks::CreateTaskRequest,
        tasks::TaskResponse,
    )),
    tags(
        (name = "Task Tracker API", description = "Token-authenticated, per-user task management endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router Assembly
//=========================================================================================

/// GET / - A plain-text index of the available endpoints.
async fn home_handler() -> &'static str {
    "Welcome to the Task Tracker API\n\
     \n\
     Available Endpoints:\n\
     POST   /register (JSON payload)\n\
     POST   /login (JSON payload, returns a bearer token)\n\
     GET    /tasks\n\
     GET    /tasks/{id}\n\
     POST   /tasks/create (JSON payload)\n\
     DELETE /tasks/delete/{id}\n\
     GET    /tasks/pending, /tasks/completed, /tasks/in-progress (Filter by status)\n\
     POST   /tasks/complete/{id}, /tasks/in-progress/{id}, /tasks/pending/{id} (Change status)\n\
     \n\
     All /tasks routes require an 'Authorization: Bearer <token>' header.\n"
}

/// Builds the full application router over the given state.
///
/// `/register` and `/login` are public; everything under `/tasks` sits behind
/// the bearer-token middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(home_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/tasks", get(list_tasks_handler))
        .route("/tasks/{id}", get(get_task_handler))
        .route("/tasks/create", post(create_task_handler))
        .route("/tasks/delete/{id}", delete(delete_task_handler))
        .route("/tasks/pending", get(list_pending_handler))
        .route("/tasks/completed", get(list_completed_handler))
        .route("/tasks/in-progress", get(list_in_progress_handler))
        .route(
            "/tasks/complete/{id}",
            post(complete_task_handler).patch(complete_task_handler),
        )
        .route(
            "/tasks/in-progress/{id}",
            post(start_task_handler).patch(start_task_handler),
        )
        .route(
            "/tasks/pending/{id}",
            post(reset_task_handler).patch(reset_task_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(state)
}

//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use task_tracker_core::ports::{SessionStore, TaskStore, UserStore};

/// The shared application state, created once at startup and passed to all handlers.
///
/// There is deliberately no global mutable state anywhere else: the session
/// table and the stores live here and only here, which keeps handlers
/// testable against in-memory stand-ins.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<Config>,
}

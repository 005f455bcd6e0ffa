//! crates/task_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or
//! in-process session tables.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Task, TaskStatus, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Registration and credential lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user with an already-hashed credential.
    ///
    /// Fails with `PortError::Conflict` when the username is taken. The
    /// implementation must enforce uniqueness itself (not check-then-insert)
    /// so that concurrent registrations cannot both succeed.
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User>;

    /// Looks up a user's credentials by username for login verification.
    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials>;
}

/// The per-user-scoped task repository.
///
/// Every operation takes the authenticated caller's user id and is implicitly
/// filtered to tasks owned by that user. A task belonging to someone else is
/// indistinguishable from a nonexistent one: both are `PortError::NotFound`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks owned by `user_id`, in insertion order. Empty is not an error.
    async fn list_tasks(&self, user_id: i64) -> PortResult<Vec<Task>>;

    /// A single owned task by id.
    async fn get_task(&self, user_id: i64, task_id: i64) -> PortResult<Task>;

    /// Inserts a new task owned by `user_id` with status forced to `Pending`,
    /// returning the persisted record including its assigned id.
    async fn create_task(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        date: NaiveDate,
    ) -> PortResult<Task>;

    /// Removes an owned task. `NotFound` covers both a missing id and an id
    /// owned by a different user.
    async fn delete_task(&self, user_id: i64, task_id: i64) -> PortResult<()>;

    /// Atomically moves an owned task to `status` and returns the updated
    /// record. Transitions are unrestricted.
    async fn set_status(
        &self,
        user_id: i64,
        task_id: i64,
        status: TaskStatus,
    ) -> PortResult<Task>;

    /// Owned tasks matching `status`. No match yields an empty vec.
    async fn list_by_status(&self, user_id: i64, status: TaskStatus) -> PortResult<Vec<Task>>;
}

/// The token-session authenticator.
///
/// Bindings live only in process memory: there is no expiry, no logout, and
/// everything is lost on restart. One user may hold any number of concurrent
/// tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issues a fresh opaque token bound to `user_id` and returns it.
    /// A token, once issued, maps to exactly one user id for the lifetime of
    /// the process; implementations must never overwrite an existing binding.
    async fn issue(&self, user_id: i64) -> PortResult<String>;

    /// Resolves a token to the user id it was issued for, with no side
    /// effects. Fails with `PortError::Unauthorized` for unknown tokens.
    async fn authenticate(&self, token: &str) -> PortResult<i64>;
}

//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `UserStore` and `TaskStore` ports from the `core` crate. It handles all
//! interactions with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};
use task_tracker_core::domain::{Task, TaskStatus, User, UserCredentials};
use task_tracker_core::ports::{PortError, PortResult, TaskStore, UserStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `UserStore` and `TaskStore` ports.
#[derive(Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
}

impl SqliteAdapter {
    /// Creates a new `SqliteAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    id: i64,
    username: String,
    password_hash: String,
}
impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: i64,
    name: String,
    description: String,
    status: String,
    date: String,
    user_id: i64,
}
impl TaskRecord {
    /// Converts a raw row into a domain task. Status and date text is parsed
    /// rather than trusted: a row written outside the API shows up as an
    /// error instead of an arbitrary string leaking to callers.
    fn to_domain(self) -> PortResult<Task> {
        let status = self
            .status
            .parse::<TaskStatus>()
            .map_err(|e| PortError::Unexpected(format!("Corrupt task {}: {}", self.id, e)))?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            PortError::Unexpected(format!("Corrupt date on task {}: {}", self.id, e))
        })?;
        Ok(Task {
            id: self.id,
            name: self.name,
            description: self.description,
            status,
            date,
            user_id: self.user_id,
        })
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for SqliteAdapter {
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        // The UNIQUE constraint on username arbitrates concurrent
        // registrations; there is no check-then-insert window.
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id, username",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Username '{}' is already taken", username))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User '{}' not found", username))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }
}

//=========================================================================================
// `TaskStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TaskStore for SqliteAdapter {
    async fn list_tasks(&self, user_id: i64) -> PortResult<Vec<Task>> {
        let records = sqlx::query_as::<_, TaskRecord>(
            "SELECT id, name, description, status, date, user_id FROM tasks \
             WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_task(&self, user_id: i64, task_id: i64) -> PortResult<Task> {
        // Scoping by user_id makes another user's task indistinguishable
        // from a nonexistent one.
        let record = sqlx::query_as::<_, TaskRecord>(
            "SELECT id, name, description, status, date, user_id FROM tasks \
             WHERE id = ? AND user_id = ?",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Task {} not found", task_id))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        record.to_domain()
    }

    async fn create_task(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        date: NaiveDate,
    ) -> PortResult<Task> {
        let record = sqlx::query_as::<_, TaskRecord>(
            "INSERT INTO tasks (name, description, status, date, user_id) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, name, description, status, date, user_id",
        )
        .bind(name)
        .bind(description)
        .bind(TaskStatus::Pending.as_str())
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        record.to_domain()
    }

    async fn delete_task(&self, user_id: i64, task_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Task {} not found", task_id)));
        }
        Ok(())
    }

    async fn set_status(
        &self,
        user_id: i64,
        task_id: i64,
        status: TaskStatus,
    ) -> PortResult<Task> {
        let record = sqlx::query_as::<_, TaskRecord>(
            "UPDATE tasks SET status = ? WHERE id = ? AND user_id = ? \
             RETURNING id, name, description, status, date, user_id",
        )
        .bind(status.as_str())
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match record {
            Some(record) => record.to_domain(),
            None => Err(PortError::NotFound(format!("Task {} not found", task_id))),
        }
    }

    async fn list_by_status(&self, user_id: i64, status: TaskStatus) -> PortResult<Vec<Task>> {
        let records = sqlx::query_as::<_, TaskRecord>(
            "SELECT id, name, description, status, date, user_id FROM tasks \
             WHERE user_id = ? AND status = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}

//=========================================================================================
// Tests
//=========================================================================================

//! services/api/src/adapters/sessions.rs
//!
//! In-process implementation of the `SessionStore` port: an RwLock-guarded
//! map from opaque bearer tokens to user ids. Sessions survive only as long
//! as the process does; there is no expiry and no logout.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use task_tracker_core::ports::{PortError, PortResult, SessionStore};
use tokio::sync::RwLock;
use uuid::Uuid;

/// The in-memory session table.
///
/// All read-modify-write sequences happen under the write guard, so
/// concurrent logins cannot interleave badly.
#[derive(Default)]
pub struct InMemorySessions {
    tokens: RwLock<HashMap<String, i64>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn issue(&self, user_id: i64) -> PortResult<String> {
        let mut tokens = self.tokens.write().await;
        // UUIDv4 collisions are vanishingly rare, but an issued token must
        // never be rebound to a different user, so re-roll rather than
        // overwrite if we ever draw an occupied key.
        loop {
            let token = Uuid::new_v4().to_string();
            match tokens.entry(token.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(user_id);
                    return Ok(token);
                }
                Entry::Occupied(_) => continue,
            }
        }
    }

    async fn authenticate(&self, token: &str) -> PortResult<i64> {
        self.tokens
            .read()
            .await
            .get(token)
            .copied()
            .ok_or(PortError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_its_user() {
        let sessions = InMemorySessions::new();
        let token = sessions.issue(7).await.unwrap();
        assert_eq!(sessions.authenticate(&token).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let sessions = InMemorySessions::new();
        let err = sessions.authenticate("not-a-token").await.unwrap_err();
        assert!(matches!(err, PortError::Unauthorized));
    }

    #[tokio::test]
    async fn one_user_may_hold_many_sessions() {
        let sessions = InMemorySessions::new();
        let first = sessions.issue(3).await.unwrap();
        let second = sessions.issue(3).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(sessions.authenticate(&first).await.unwrap(), 3);
        assert_eq!(sessions.authenticate(&second).await.unwrap(), 3);
    }
}

//! Access grants kept in the visitor's server-side session.

use async_trait::async_trait;
use tower_sessions::Session;

use eventlens_core::access::AccessStore;
use eventlens_core::{EventLensError, EventLensResult};

/// [`AccessStore`] backed by the `tower-sessions` session of one visitor.
#[derive(Clone)]
pub struct SessionAccessStore {
    session: Session,
}

impl SessionAccessStore {
    pub fn new(session: Session) -> Self {
        SessionAccessStore { session }
    }
}

#[async_trait]
impl AccessStore for SessionAccessStore {
    async fn get(&self, key: &str) -> EventLensResult<Option<String>> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|e| EventLensError::Transient(format!("Failed to read session: {e}")))
    }

    async fn set(&self, key: &str, value: String) -> EventLensResult<()> {
        self.session
            .insert(key, value)
            .await
            .map_err(|e| EventLensError::Transient(format!("Failed to write session: {e}")))
    }
}

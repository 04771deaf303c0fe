//! Per-visitor record of unlocked events.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{EventLensError, EventLensResult};

/// Value written by older clients that only stored a flag.
const LEGACY_FLAG: &str = "true";

/// Storage key for an event's unlock grant.
pub fn access_key(slug: &str) -> String {
    format!("event_access_{slug}")
}

/// Durable key/value storage scoped to one visitor.
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn get(&self, key: &str) -> EventLensResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> EventLensResult<()>;
}

/// Key/value store kept in process memory.
#[derive(Clone, Default)]
pub struct MemoryAccessStore {
    data: Arc<DashMap<String, String>>,
}

impl MemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessStore for MemoryAccessStore {
    async fn get(&self, key: &str) -> EventLensResult<Option<String>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> EventLensResult<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }
}

/// Proof that the password for an event was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

impl AccessGrant {
    pub fn new(issued_at: DateTime<Utc>, ttl_secs: Option<u64>) -> Self {
        AccessGrant {
            issued_at,
            ttl_secs,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = i64::try_from(self.ttl_secs?).ok()?;
        self.issued_at.checked_add_signed(Duration::seconds(ttl))
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (self.ttl_secs, self.expires_at()) {
            (None, _) => true,
            (Some(_), Some(expires_at)) => now < expires_at,
            // TTL too large to represent: never expires in practice
            (Some(_), None) => true,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        if raw == LEGACY_FLAG {
            return Some(AccessGrant::new(DateTime::<Utc>::UNIX_EPOCH, None));
        }
        serde_json::from_str(raw).ok()
    }
}

/// The access session of one visitor: which events they have unlocked.
pub struct AccessSession<S> {
    store: S,
    ttl_secs: Option<u64>,
}

impl<S: AccessStore> AccessSession<S> {
    /// `ttl_secs` applies to grants issued through this session.
    pub fn new(store: S, ttl_secs: Option<u64>) -> Self {
        AccessSession { store, ttl_secs }
    }

    /// The stored grant for `slug`, expired or not.
    pub async fn grant(&self, slug: &str) -> EventLensResult<Option<AccessGrant>> {
        let raw = self.store.get(&access_key(slug)).await?;
        Ok(raw.as_deref().and_then(AccessGrant::parse))
    }

    pub async fn is_unlocked(&self, slug: &str) -> bool {
        self.is_unlocked_at(slug, Utc::now()).await
    }

    /// Unreadable storage counts as locked.
    pub async fn is_unlocked_at(&self, slug: &str, now: DateTime<Utc>) -> bool {
        match self.grant(slug).await {
            Ok(Some(grant)) => grant.is_valid_at(now),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(slug, error = %e, "could not read access grant");
                false
            }
        }
    }

    pub async fn mark_unlocked(&self, slug: &str) -> EventLensResult<AccessGrant> {
        self.mark_unlocked_at(slug, Utc::now()).await
    }

    pub async fn mark_unlocked_at(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> EventLensResult<AccessGrant> {
        let grant = AccessGrant::new(now, self.ttl_secs);
        let value =
            serde_json::to_string(&grant).map_err(|e| EventLensError::Serialization(e.to_string()))?;

        self.store.set(&access_key(slug), value).await?;
        tracing::debug!(slug, "event unlocked");

        Ok(grant)
    }
}

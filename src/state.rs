use std::num::NonZeroU32;
use std::sync::Arc;

use tower_sessions::Session;

use eventlens_core::access::{AccessSession, AttemptLimiter, PasswordChallenge};
use eventlens_core::gallery::MediaResolver;
use eventlens_core::{Backend, EventLensConfig};

use crate::session::SessionAccessStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn Backend>,
    resolver: Arc<MediaResolver>,
    limiter: Option<Arc<AttemptLimiter>>,
    grant_ttl_secs: Option<u64>,
    max_upload_bytes: usize,
    secure_cookies: bool,
}

impl AppState {
    pub fn new(config: &EventLensConfig, backend: Arc<dyn Backend>) -> Self {
        let limiter = config
            .access
            .attempts_per_minute
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(AttemptLimiter::per_minute(n)));

        AppState {
            backend,
            resolver: Arc::new(MediaResolver::from_config(config)),
            limiter,
            grant_ttl_secs: config.access.grant_ttl_secs,
            max_upload_bytes: config.server.max_upload_bytes,
            secure_cookies: config.server.secure_cookies,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn resolver(&self) -> &MediaResolver {
        &self.resolver
    }

    /// The visitor's unlocked events, kept in their session.
    pub fn access(&self, session: Session) -> AccessSession<SessionAccessStore> {
        AccessSession::new(SessionAccessStore::new(session), self.grant_ttl_secs)
    }

    pub fn challenge(&self) -> PasswordChallenge<'_> {
        PasswordChallenge::new(self.backend()).with_limiter(self.attempt_limiter())
    }

    pub fn grant_ttl_secs(&self) -> Option<u64> {
        self.grant_ttl_secs
    }

    pub fn attempt_limiter(&self) -> Option<&AttemptLimiter> {
        self.limiter.as_deref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

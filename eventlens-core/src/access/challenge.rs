//! Password challenge for unlocking an event.

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use super::guard::{GuestRoute, NEUTRAL_ROUTE};
use super::store::{AccessGrant, AccessSession, AccessStore};
use crate::backend::Backend;
use crate::error::{EventLensError, EventLensResult};

/// Number of tracked events above which idle entries are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Caps password attempts per event.
///
/// Only slugs of existing events should be checked; keys are pruned once
/// their quota has fully replenished.
pub struct AttemptLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl AttemptLimiter {
    pub fn per_minute(attempts: NonZeroU32) -> Self {
        AttemptLimiter::new(Quota::per_minute(attempts))
    }

    pub fn new(quota: Quota) -> Self {
        AttemptLimiter {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Consume one attempt for `slug`.
    pub fn check(&self, slug: &str) -> EventLensResult<()> {
        if self.limiter.len() >= PRUNE_THRESHOLD {
            self.prune();
        }

        self.limiter
            .check_key(&slug.to_string())
            .map_err(|_| EventLensError::RateLimited(slug.to_string()))
    }

    /// Forget events whose attempts have fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of events currently tracked.
    pub fn tracked(&self) -> usize {
        self.limiter.len()
    }
}

/// A successful challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlocked {
    pub slug: String,
    pub grant: AccessGrant,
}

impl Unlocked {
    /// Where the guest goes next.
    pub fn redirect_to(&self) -> String {
        GuestRoute::Gallery.path(&self.slug)
    }
}

/// Verifies a candidate password with the backend and records the unlock.
///
/// Passwords are never compared locally.
pub struct PasswordChallenge<'a> {
    backend: &'a dyn Backend,
    limiter: Option<&'a AttemptLimiter>,
}

impl<'a> PasswordChallenge<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        PasswordChallenge {
            backend,
            limiter: None,
        }
    }

    pub fn with_limiter(mut self, limiter: Option<&'a AttemptLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Submit a password for `slug`.
    ///
    /// Fails with `IncorrectPassword` on a definitive "no" and with
    /// `Transient` when the backend could not answer. Neither touches the
    /// session, so the guest can simply try again.
    pub async fn submit<S: AccessStore>(
        &self,
        session: &AccessSession<S>,
        slug: &str,
        candidate: &str,
    ) -> EventLensResult<Unlocked> {
        if candidate.trim().is_empty() {
            return Err(EventLensError::PasswordRequired);
        }

        if let Some(limiter) = self.limiter {
            limiter.check(slug).inspect_err(|_| {
                tracing::warn!(slug, "password attempts rate limited");
            })?;
        }

        let valid = self
            .backend
            .validate_password(slug, candidate)
            .await
            .map_err(|e| {
                tracing::error!(slug, error = %e, "password validation failed");
                match e {
                    EventLensError::Transient(msg) => EventLensError::Transient(msg),
                    other => EventLensError::Transient(other.to_string()),
                }
            })?;

        if !valid {
            tracing::info!(slug, "incorrect event password");
            return Err(EventLensError::IncorrectPassword);
        }

        let grant = session.mark_unlocked(slug).await?;
        tracing::info!(slug, "event unlocked");

        Ok(Unlocked {
            slug: slug.to_string(),
            grant,
        })
    }

    /// The guest dismissed the challenge: the event stays locked and they
    /// leave the event pages.
    pub fn cancel(&self, slug: &str) -> &'static str {
        tracing::debug!(slug, "password challenge cancelled");
        NEUTRAL_ROUTE
    }
}

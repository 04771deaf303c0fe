//! The guest access gate.
//!
//! A guest proves the event password once through a [`PasswordChallenge`];
//! the resulting grant is remembered in an [`AccessStore`] and consulted by
//! the [`AccessGuard`] on every navigation to a gated page.
//!
//! The password check in the backend is the only real authorization step.
//! The stored grant is a navigation cache of "already proved".

mod challenge;
mod guard;
mod store;

pub use challenge::{AttemptLimiter, PasswordChallenge, Unlocked};
pub use guard::{AccessGuard, GuardDecision, GuestRoute, NEUTRAL_ROUTE};
pub use store::{AccessGrant, AccessSession, AccessStore, MemoryAccessStore, access_key};

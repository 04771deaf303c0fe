//! Events as stored by the backend.
//!
//! The backend owns events; the client only ever holds read-only copies
//! fetched by slug. A slug resolves to at most one event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A password-protected event (wedding, party, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Human-readable unique identifier used in URLs
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
}

/// The public part of an event shown on the access page before unlocking.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        EventSummary {
            slug: event.slug.clone(),
            name: event.name.clone(),
            description: event.description.clone(),
            event_date: event.event_date,
        }
    }
}

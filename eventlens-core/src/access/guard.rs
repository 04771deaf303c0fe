//! Navigation guard for event pages.

use super::store::{AccessSession, AccessStore};

/// Where guests are sent when there is nothing sensible to show.
pub const NEUTRAL_ROUTE: &str = "/";

/// Guest-facing pages of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestRoute {
    /// `/<slug>`
    Landing,
    /// `/<slug>/access`
    Access,
    /// `/<slug>/gallery`
    Gallery,
    /// `/<slug>/upload`
    Upload,
}

impl GuestRoute {
    pub fn path(&self, slug: &str) -> String {
        match self {
            GuestRoute::Landing => format!("/{slug}"),
            GuestRoute::Access => format!("/{slug}/access"),
            GuestRoute::Gallery => format!("/{slug}/gallery"),
            GuestRoute::Upload => format!("/{slug}/upload"),
        }
    }

    /// Only pages that show or accept media sit behind the gate.
    pub fn is_guarded(&self) -> bool {
        matches!(self, GuestRoute::Gallery | GuestRoute::Upload)
    }

    /// Split a request path into slug and page.
    pub fn parse(path: &str) -> Option<(String, GuestRoute)> {
        let mut segments = path.trim_matches('/').split('/');
        let slug = segments.next().filter(|s| !s.is_empty())?;

        let route = match (segments.next(), segments.next()) {
            (None, _) => GuestRoute::Landing,
            (Some("access"), None) => GuestRoute::Access,
            (Some("gallery"), None) => GuestRoute::Gallery,
            (Some("upload"), None) => GuestRoute::Upload,
            _ => return None,
        };

        Some((slug.to_string(), route))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Decides whether a guest may enter an event page.
pub struct AccessGuard;

impl AccessGuard {
    /// Allow unlocked or ungated pages; send everyone else to the access
    /// page of the same event, which is never gated itself.
    pub async fn check<S: AccessStore>(
        session: &AccessSession<S>,
        slug: &str,
        route: GuestRoute,
    ) -> GuardDecision {
        if slug.is_empty() {
            return GuardDecision::Redirect(NEUTRAL_ROUTE.to_string());
        }

        if !route.is_guarded() || session.is_unlocked(slug).await {
            return GuardDecision::Allow;
        }

        tracing::debug!(slug, ?route, "event locked, redirecting to access page");
        GuardDecision::Redirect(GuestRoute::Access.path(slug))
    }

    /// Where `/<slug>` leads: the gallery once unlocked, the access page before.
    pub async fn entry_point<S: AccessStore>(session: &AccessSession<S>, slug: &str) -> String {
        if session.is_unlocked(slug).await {
            GuestRoute::Gallery.path(slug)
        } else {
            GuestRoute::Access.path(slug)
        }
    }
}

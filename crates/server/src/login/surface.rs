//! The secondary navigable surface the login flow watches.
//!
//! Window creation belongs to the host. The poll loop only needs to read the
//! surface's location and to hide or close it.

use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use super::events::{EventHub, ShellEvent};

/// A window (or anything that navigates) showing the Riot login page.
pub trait NavigationSurface: Send + Sync {
    /// The surface's current location, if known.
    fn current_url(&self) -> Option<String>;

    /// Conceal the surface without closing it.
    fn hide(&self);

    /// Close the surface.
    fn close(&self);
}

/// A surface owned by the desktop window host.
///
/// The host learns about it from a `surface-open` event, reports each
/// navigation back, and follows `surface-hide` / `surface-close` commands
/// carrying the same attempt id.
#[derive(Debug)]
pub struct ReportedSurface {
    attempt: Uuid,
    location: Mutex<Option<String>>,
    events: EventHub,
}

impl ReportedSurface {
    /// Ask the host to open a surface at `url`.
    #[must_use]
    pub fn open(attempt: Uuid, url: &str, events: EventHub) -> Self {
        events.publish(ShellEvent::SurfaceOpen {
            attempt,
            url: url.to_string(),
        });
        Self {
            attempt,
            location: Mutex::new(Some(url.to_string())),
            events,
        }
    }

    /// Record the host-reported location.
    pub fn report_navigation(&self, url: &str) {
        *self
            .location
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(url.to_string());
    }
}

impl NavigationSurface for ReportedSurface {
    fn current_url(&self) -> Option<String> {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn hide(&self) {
        self.events.publish(ShellEvent::SurfaceHide {
            attempt: self.attempt,
        });
    }

    fn close(&self) {
        self.events.publish(ShellEvent::SurfaceClose {
            attempt: self.attempt,
        });
    }
}

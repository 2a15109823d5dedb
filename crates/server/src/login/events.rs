//! Events pushed from the server to the desktop window host.
//!
//! The host subscribes once (`GET /api/events`) and receives both surface
//! commands (open, hide, close the login window) and login outcomes for the
//! primary page.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// A message for the window host or the primary page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ShellEvent {
    /// Open the secondary login window for `attempt` at `url`.
    SurfaceOpen { attempt: Uuid, url: String },
    /// Hide the login window of `attempt` now.
    SurfaceHide { attempt: Uuid },
    /// Close the login window of `attempt`.
    SurfaceClose { attempt: Uuid },
    /// Tokens were stored; the primary page should load the store.
    LoginSuccess { attempt: Uuid },
    /// The redirect was seen but carried no usable tokens.
    LoginFailed { attempt: Uuid, reason: String },
    /// No redirect within the polling budget.
    LoginTimeout { attempt: Uuid },
    /// The attempt was cancelled or superseded.
    LoginCancelled { attempt: Uuid },
}

impl ShellEvent {
    /// SSE event name, matching the DOM event dispatched by the page.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SurfaceOpen { .. } => "surface-open",
            Self::SurfaceHide { .. } => "surface-hide",
            Self::SurfaceClose { .. } => "surface-close",
            Self::LoginSuccess { .. } => "login-success",
            Self::LoginFailed { .. } => "login-failed",
            Self::LoginTimeout { .. } => "login-timeout",
            Self::LoginCancelled { .. } => "login-cancelled",
        }
    }

    /// The login attempt this event belongs to.
    #[must_use]
    pub const fn attempt(&self) -> Uuid {
        match self {
            Self::SurfaceOpen { attempt, .. }
            | Self::SurfaceHide { attempt }
            | Self::SurfaceClose { attempt }
            | Self::LoginSuccess { attempt }
            | Self::LoginFailed { attempt, .. }
            | Self::LoginTimeout { attempt }
            | Self::LoginCancelled { attempt } => *attempt,
        }
    }

    /// Whether this event ends an attempt.
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        matches!(
            self,
            Self::LoginSuccess { .. }
                | Self::LoginFailed { .. }
                | Self::LoginTimeout { .. }
                | Self::LoginCancelled { .. }
        )
    }
}

/// Fan-out channel for [`ShellEvent`]s.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<ShellEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: ShellEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(event = name, receivers, "Shell event published"),
            Err(_) => tracing::debug!(event = name, "Shell event dropped, no subscribers"),
        }
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.sender.subscribe()
    }
}

//! Desktop login flow.
//!
//! # Flow
//!
//! 1. The page calls `POST /api/login/start`
//! 2. A `surface-open` event asks the window host for a login window
//! 3. The host reports every navigation through `POST /api/login/navigate`
//! 4. [`sniff_token`] polls the reported location until the token redirect
//!    appears, then hides and closes the window
//! 5. The outcome is published (`login-success`, `login-failed`,
//!    `login-timeout` or `login-cancelled`)
//!
//! At most one attempt is in flight. Starting a new one cancels the previous.
//! Every event names its attempt so late events from a superseded attempt
//! can be told apart.
//!
//! The window host may live out of process and speak HTTP, or run in process
//! through [`WindowHost`].

pub mod events;
pub mod host;
pub mod poll;
pub mod surface;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

pub use events::{EventHub, ShellEvent};
pub use host::{LoginWindows, WindowError, WindowHost};
pub use poll::{LoginOutcome, MAX_POLL_ATTEMPTS, POLL_INTERVAL, PollSettings, sniff_token};
pub use surface::{NavigationSurface, ReportedSurface};

use crate::services::Session;

/// A navigation was reported with no login window open, or for an attempt
/// that is no longer the current one.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no login attempt in progress")]
pub struct NoActiveAttempt;

/// Public view of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoginState {
    /// Nothing has been attempted yet.
    Idle,
    /// An attempt is polling.
    Awaiting { attempt: Uuid },
    /// The last attempt finished.
    Completed { outcome: ShellEvent },
}

#[derive(Debug)]
struct Attempt {
    id: Uuid,
    surface: Arc<ReportedSurface>,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct Progress {
    current: Option<Attempt>,
    last_outcome: Option<(Uuid, LoginOutcome)>,
}

#[derive(Debug)]
struct Inner {
    session: Arc<Session>,
    events: EventHub,
    settings: PollSettings,
    authorize_url: String,
    progress: Mutex<Progress>,
}

/// Coordinates desktop login attempts.
///
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    inner: Arc<Inner>,
}

impl LoginFlow {
    #[must_use]
    pub fn new(
        session: Arc<Session>,
        events: EventHub,
        authorize_url: String,
        settings: PollSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session,
                events,
                settings,
                authorize_url,
                progress: Mutex::default(),
            }),
        }
    }

    /// The event hub surface commands and outcomes are published on.
    #[must_use]
    pub fn events(&self) -> &EventHub {
        &self.inner.events
    }

    fn progress(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.inner
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a login window and start polling it in the background.
    ///
    /// Any attempt already in flight is cancelled first. Must be called
    /// from within a Tokio runtime.
    pub fn start(&self) -> Uuid {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let previous = {
            let mut progress = self.progress();
            let previous = progress.current.take();
            let surface = Arc::new(ReportedSurface::open(
                id,
                &self.inner.authorize_url,
                self.inner.events.clone(),
            ));
            progress.current = Some(Attempt {
                id,
                surface: Arc::clone(&surface),
                cancel: cancel.clone(),
            });
            self.spawn_poll(id, surface, cancel);
            previous
        };

        if let Some(previous) = previous {
            tracing::info!(attempt = %previous.id, "Superseding login attempt");
            previous.cancel.cancel();
        }

        tracing::info!(attempt = %id, "Login attempt started");
        id
    }

    // The poll task runs under its own span, parented to the caller's
    // request span so the request id follows the attempt.
    fn spawn_poll(&self, id: Uuid, surface: Arc<ReportedSurface>, cancel: CancellationToken) {
        let flow = self.clone();
        let span = tracing::info_span!("login_attempt", attempt = %id);
        tokio::spawn(
            async move {
                let outcome = sniff_token(
                    surface.as_ref(),
                    &flow.inner.session,
                    flow.inner.settings,
                    &cancel,
                )
                .await;
                flow.finish(id, outcome);
            }
            .instrument(span),
        );
    }

    fn finish(&self, id: Uuid, outcome: LoginOutcome) {
        {
            let mut progress = self.progress();
            // Superseded and cancelled attempts were already settled
            if progress.current.as_ref().is_some_and(|a| a.id == id) {
                progress.current = None;
                progress.last_outcome = Some((id, outcome.clone()));
            }
        }
        tracing::info!(outcome = ?outcome, "Login attempt finished");
        self.inner.events.publish(outcome.event(id));
    }

    /// Record a navigation reported by the window host.
    ///
    /// With `attempt` set, the report is accepted only while that attempt is
    /// the current one.
    ///
    /// # Errors
    ///
    /// Returns [`NoActiveAttempt`] if no login window is open or `attempt`
    /// is not the current attempt.
    pub fn report_navigation(
        &self,
        attempt: Option<Uuid>,
        url: &str,
    ) -> Result<(), NoActiveAttempt> {
        let progress = self.progress();
        let current = progress
            .current
            .as_ref()
            .filter(|current| attempt.is_none_or(|id| id == current.id))
            .ok_or(NoActiveAttempt)?;
        current.surface.report_navigation(url);
        Ok(())
    }

    /// Cancel the attempt in flight. Returns whether one was running.
    ///
    /// The state reads as cancelled at once; the `login-cancelled` event
    /// follows when the poll task stops.
    pub fn cancel(&self) -> bool {
        self.cancel_where(|_| true)
    }

    /// Cancel `attempt` if it is still the one in flight.
    pub fn cancel_attempt(&self, attempt: Uuid) -> bool {
        self.cancel_where(|id| id == attempt)
    }

    fn cancel_where(&self, matches: impl FnOnce(Uuid) -> bool) -> bool {
        let mut progress = self.progress();
        let Some(attempt) = progress.current.take_if(|current| matches(current.id)) else {
            return false;
        };
        progress.last_outcome = Some((attempt.id, LoginOutcome::Cancelled));
        drop(progress);

        tracing::info!(attempt = %attempt.id, "Cancelling login attempt");
        attempt.cancel.cancel();
        true
    }

    /// Current state of the flow.
    #[must_use]
    pub fn state(&self) -> LoginState {
        let progress = self.progress();
        if let Some(attempt) = &progress.current {
            return LoginState::Awaiting {
                attempt: attempt.id,
            };
        }
        progress
            .last_outcome
            .as_ref()
            .map_or(LoginState::Idle, |(id, outcome)| LoginState::Completed {
                outcome: outcome.event(*id),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tokio::sync::broadcast;

    use super::*;

    const AUTHORIZE: &str = "https://auth.riotgames.com/authorize?client_id=play-valorant-web-prod";
    const REDIRECT: &str = "https://playvalorant.com/opt_in#access_token=acc&id_token=idt";

    fn flow(max_attempts: u32) -> (LoginFlow, Arc<Session>) {
        let session = Arc::new(Session::new());
        let flow = LoginFlow::new(
            Arc::clone(&session),
            EventHub::new(),
            AUTHORIZE.to_string(),
            PollSettings {
                interval: Duration::from_millis(1),
                max_attempts,
            },
        );
        (flow, session)
    }

    /// Receive events until an attempt outcome arrives.
    async fn next_outcome(rx: &mut broadcast::Receiver<ShellEvent>) -> ShellEvent {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = rx.recv().await.unwrap();
                if event.is_outcome() {
                    return event;
                }
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_login_via_reported_navigation() {
        let (flow, session) = flow(5_000);
        let mut rx = flow.events().subscribe();

        let attempt = flow.start();
        assert_eq!(
            rx.recv().await.unwrap(),
            ShellEvent::SurfaceOpen {
                attempt,
                url: AUTHORIZE.to_string()
            }
        );
        assert_eq!(flow.state(), LoginState::Awaiting { attempt });

        flow.report_navigation(Some(attempt), REDIRECT).unwrap();

        assert_eq!(
            next_outcome(&mut rx).await,
            ShellEvent::LoginSuccess { attempt }
        );
        assert!(session.tokens().await.is_some());
        assert_eq!(
            flow.state(),
            LoginState::Completed {
                outcome: ShellEvent::LoginSuccess { attempt }
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_publishes_event() {
        let (flow, session) = flow(3);
        let mut rx = flow.events().subscribe();

        let attempt = flow.start();

        assert_eq!(
            next_outcome(&mut rx).await,
            ShellEvent::LoginTimeout { attempt }
        );
        assert!(session.tokens().await.is_none());
        assert_eq!(
            flow.report_navigation(None, "https://playvalorant.com/opt_in#access_token=a"),
            Err(NoActiveAttempt)
        );
    }

    #[tokio::test]
    async fn test_new_attempt_cancels_previous() {
        let (flow, _) = flow(5_000);
        let mut rx = flow.events().subscribe();

        let first = flow.start();
        let second = flow.start();
        assert_ne!(first, second);

        // The late outcome names the superseded attempt, not the live one
        assert_eq!(
            next_outcome(&mut rx).await,
            ShellEvent::LoginCancelled { attempt: first }
        );
        assert_eq!(flow.state(), LoginState::Awaiting { attempt: second });
    }

    #[tokio::test]
    async fn test_report_for_superseded_attempt_is_rejected() {
        let (flow, session) = flow(5_000);

        let first = flow.start();
        let second = flow.start();

        assert_eq!(
            flow.report_navigation(Some(first), REDIRECT),
            Err(NoActiveAttempt)
        );
        assert_eq!(flow.report_navigation(Some(second), AUTHORIZE), Ok(()));
        assert!(session.tokens().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_settles_state_immediately() {
        let (flow, _) = flow(5_000);
        let mut rx = flow.events().subscribe();

        assert!(!flow.cancel());

        // An earlier outcome must not show through while the cancel lands
        let earlier = flow.start();
        flow.report_navigation(None, REDIRECT).unwrap();
        assert_eq!(
            next_outcome(&mut rx).await,
            ShellEvent::LoginSuccess { attempt: earlier }
        );

        let attempt = flow.start();
        assert!(flow.cancel());
        assert_eq!(
            flow.state(),
            LoginState::Completed {
                outcome: ShellEvent::LoginCancelled { attempt }
            }
        );

        assert_eq!(
            next_outcome(&mut rx).await,
            ShellEvent::LoginCancelled { attempt }
        );
        assert_eq!(
            flow.state(),
            LoginState::Completed {
                outcome: ShellEvent::LoginCancelled { attempt }
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_attempt_only_hits_current() {
        let (flow, _) = flow(5_000);

        let first = flow.start();
        let second = flow.start();

        assert!(!flow.cancel_attempt(first));
        assert_eq!(flow.state(), LoginState::Awaiting { attempt: second });
        assert!(flow.cancel_attempt(second));
        assert!(!flow.cancel_attempt(second));
    }

    #[test]
    fn test_navigation_without_attempt() {
        let (flow, _) = flow(1);
        assert_eq!(flow.state(), LoginState::Idle);
        assert_eq!(
            flow.report_navigation(None, "https://example.test"),
            Err(NoActiveAttempt)
        );
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(LoginState::Completed {
            outcome: ShellEvent::LoginTimeout {
                attempt: Uuid::nil(),
            },
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "state": "completed",
                "outcome": {
                    "type": "login-timeout",
                    "attempt": "00000000-0000-0000-0000-000000000000"
                }
            })
        );
    }
}

//! Bounded poll loop that watches a surface for the post-login redirect.

use std::time::Duration;

use dsf_core::{TokenError, has_access_token};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::events::ShellEvent;
use super::surface::NavigationSurface;
use crate::services::Session;

/// How often the surface location is checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Attempts before giving up (about two minutes at the default interval).
pub const MAX_POLL_ATTEMPTS: u32 = 1200;

/// Polling cadence and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

/// How a login attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Tokens were extracted and stored.
    Success,
    /// The redirect was seen but extraction failed.
    Failed(TokenError),
    /// The attempt budget ran out.
    TimedOut,
    /// The cancellation token fired.
    Cancelled,
}

impl LoginOutcome {
    /// The event announcing this outcome of `attempt` to the primary page.
    #[must_use]
    pub fn event(&self, attempt: Uuid) -> ShellEvent {
        match self {
            Self::Success => ShellEvent::LoginSuccess { attempt },
            Self::Failed(e) => ShellEvent::LoginFailed {
                attempt,
                reason: e.to_string(),
            },
            Self::TimedOut => ShellEvent::LoginTimeout { attempt },
            Self::Cancelled => ShellEvent::LoginCancelled { attempt },
        }
    }
}

/// Poll `surface` until it shows the token redirect, the budget runs out, or
/// `cancel` fires.
///
/// On detection the surface is hidden before extraction so the provider's
/// landing page never flashes. The surface is closed on every outcome.
pub async fn sniff_token(
    surface: &dyn NavigationSurface,
    session: &Session,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> LoginOutcome {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for attempt in 0..settings.max_attempts {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!(attempt, "Login polling cancelled");
                surface.close();
                return LoginOutcome::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        let Some(url) = surface.current_url() else {
            continue;
        };
        if !has_access_token(&url) {
            continue;
        }

        surface.hide();
        let outcome = match session.extract_tokens_from_url(&url).await {
            Ok(()) => LoginOutcome::Success,
            Err(e) => LoginOutcome::Failed(e),
        };
        surface.close();

        tracing::info!(attempt, outcome = ?outcome, "Login redirect detected");
        return outcome;
    }

    tracing::warn!(
        attempts = settings.max_attempts,
        "Login polling timed out without a token redirect"
    );
    surface.close();
    LoginOutcome::TimedOut
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use super::*;

    /// Surface that replays a scripted list of locations and records calls.
    #[derive(Default)]
    struct ScriptedSurface {
        locations: Mutex<Vec<Option<String>>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedSurface {
        fn new(locations: &[Option<&str>]) -> Self {
            let mut locations: Vec<_> = locations.iter().map(|l| l.map(String::from)).collect();
            locations.reverse();
            Self {
                locations: Mutex::new(locations),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn record(&self, call: &'static str) {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(call);
        }
    }

    impl NavigationSurface for ScriptedSurface {
        fn current_url(&self) -> Option<String> {
            self.record("current_url");
            let mut locations = self.locations.lock().unwrap_or_else(PoisonError::into_inner);
            // The last scripted location sticks
            if locations.len() > 1 {
                locations.pop().flatten()
            } else {
                locations.last().cloned().flatten()
            }
        }

        fn hide(&self) {
            self.record("hide");
        }

        fn close(&self) {
            self.record("close");
        }
    }

    fn fast(max_attempts: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_detects_token_hides_then_closes() {
        let surface = ScriptedSurface::new(&[
            None,
            Some("https://auth.riotgames.com/login"),
            Some("https://playvalorant.com/opt_in#access_token=acc&id_token=idt"),
        ]);
        let session = Session::new();

        let outcome = sniff_token(&surface, &session, fast(50), &CancellationToken::new()).await;

        assert_eq!(outcome, LoginOutcome::Success);
        assert_eq!(session.tokens().await.unwrap().access_token(), "acc");

        let calls = surface.calls();
        let hide = calls.iter().position(|c| *c == "hide").unwrap();
        let close = calls.iter().position(|c| *c == "close").unwrap();
        assert!(hide < close);
        assert_eq!(calls.iter().filter(|c| **c == "current_url").count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_redirect_fails_and_closes() {
        let surface =
            ScriptedSurface::new(&[Some("https://playvalorant.com/opt_in#access_token=acc")]);
        let session = Session::new();

        let outcome = sniff_token(&surface, &session, fast(50), &CancellationToken::new()).await;

        assert_eq!(outcome, LoginOutcome::Failed(TokenError::MissingIdToken));
        assert!(session.tokens().await.is_none());
        assert_eq!(surface.calls().last(), Some(&"close"));
    }

    #[tokio::test]
    async fn test_times_out_after_budget() {
        let surface = ScriptedSurface::new(&[Some("https://auth.riotgames.com/login")]);
        let session = Session::new();

        let outcome = sniff_token(&surface, &session, fast(5), &CancellationToken::new()).await;

        assert_eq!(outcome, LoginOutcome::TimedOut);
        let calls = surface.calls();
        assert_eq!(calls.iter().filter(|c| **c == "current_url").count(), 5);
        assert!(!calls.contains(&"hide"));
        assert_eq!(calls.last(), Some(&"close"));
    }

    #[tokio::test]
    async fn test_cancellation_stops_polling() {
        let surface = ScriptedSurface::new(&[Some("https://auth.riotgames.com/login")]);
        let session = Session::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = sniff_token(&surface, &session, PollSettings::default(), &cancel).await;

        assert_eq!(outcome, LoginOutcome::Cancelled);
        assert_eq!(surface.calls(), vec!["close"]);
    }

    #[test]
    fn test_outcome_events() {
        let attempt = Uuid::new_v4();
        assert_eq!(
            LoginOutcome::Success.event(attempt),
            ShellEvent::LoginSuccess { attempt }
        );
        assert_eq!(
            LoginOutcome::TimedOut.event(attempt),
            ShellEvent::LoginTimeout { attempt }
        );
        assert_eq!(
            LoginOutcome::Cancelled.event(attempt),
            ShellEvent::LoginCancelled { attempt }
        );
        assert_eq!(
            LoginOutcome::Failed(TokenError::MissingAccessToken).event(attempt),
            ShellEvent::LoginFailed {
                attempt,
                reason: "no access token found in URL".to_string()
            }
        );
    }

    #[test]
    fn test_default_budget_is_two_minutes() {
        let settings = PollSettings::default();
        assert_eq!(
            settings.interval * settings.max_attempts,
            Duration::from_secs(120)
        );
    }
}

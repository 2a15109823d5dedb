//! In-process window host for the desktop variant.
//!
//! [`WindowHost`] follows the surface commands published on the event hub,
//! drives native windows through [`LoginWindows`], and feeds each window's
//! location back into the [`LoginFlow`]. A host running in another process
//! does the same over `GET /api/events` and `POST /api/login/navigate`.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{LoginFlow, ShellEvent};

/// A login window could not be created.
#[derive(Debug, Error)]
#[error("failed to open login window: {0}")]
pub struct WindowError(pub String);

/// Native windows that show the Riot login page, one per attempt.
pub trait LoginWindows: Send + Sync + 'static {
    /// Create a visible window for `attempt` showing `url`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError`] if the platform refuses the window.
    fn open(&self, attempt: Uuid, url: &str) -> Result<(), WindowError>;

    /// The window's current location, `None` once it is gone.
    fn current_url(&self, attempt: Uuid) -> Option<String>;

    fn hide(&self, attempt: Uuid);

    /// Close the window. Closing a window that is already gone is a no-op.
    fn close(&self, attempt: Uuid);
}

/// Drives [`LoginWindows`] from the login flow's events.
pub struct WindowHost<W> {
    flow: LoginFlow,
    windows: Arc<W>,
    events: broadcast::Receiver<ShellEvent>,
    watchers: HashMap<Uuid, CancellationToken>,
}

impl<W: LoginWindows> WindowHost<W> {
    /// Subscribe to `flow`. Commands published after this call are followed.
    #[must_use]
    pub fn new(flow: LoginFlow, windows: Arc<W>) -> Self {
        let events = flow.events().subscribe();
        Self {
            flow,
            windows,
            events,
            watchers: HashMap::new(),
        }
    }

    /// Follow surface commands until `shutdown` fires or the hub closes.
    ///
    /// Windows still open on exit are closed.
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            let received = tokio::select! {
                () = shutdown.cancelled() => break,
                received = self.events.recv() => received,
            };
            match received {
                Ok(event) => self.handle(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Window host lagged behind shell events");
                }
                Err(RecvError::Closed) => break,
            }
        }

        for (attempt, watcher) in self.watchers.drain() {
            watcher.cancel();
            self.windows.close(attempt);
        }
    }

    fn handle(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::SurfaceOpen { attempt, url } => self.open(attempt, &url),
            ShellEvent::SurfaceHide { attempt } => self.windows.hide(attempt),
            ShellEvent::SurfaceClose { attempt } => {
                if let Some(watcher) = self.watchers.remove(&attempt) {
                    watcher.cancel();
                }
                self.windows.close(attempt);
            }
            _ => {}
        }
    }

    fn open(&mut self, attempt: Uuid, url: &str) {
        if let Err(e) = self.windows.open(attempt, url) {
            tracing::error!(%attempt, error = %e, "Login window did not open");
            self.flow.cancel_attempt(attempt);
            return;
        }

        let watcher = CancellationToken::new();
        self.watchers.insert(attempt, watcher.clone());
        tokio::spawn(watch_location(
            self.flow.clone(),
            Arc::clone(&self.windows),
            attempt,
            watcher,
        ));
    }
}

/// Report every location change of `attempt`'s window until `stop` fires or
/// the attempt is no longer current.
async fn watch_location<W: LoginWindows>(
    flow: LoginFlow,
    windows: Arc<W>,
    attempt: Uuid,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval(flow.inner.settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_reported: Option<String> = None;

    loop {
        tokio::select! {
            () = stop.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let Some(url) = windows.current_url(attempt) else {
            continue;
        };
        if last_reported.as_deref() == Some(url.as_str()) {
            continue;
        }
        if flow.report_navigation(Some(attempt), &url).is_err() {
            return;
        }
        last_reported = Some(url);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    use super::*;
    use crate::login::{EventHub, LoginState, PollSettings};
    use crate::services::Session;

    const REDIRECT: &str = "https://playvalorant.com/opt_in#access_token=acc&id_token=idt";

    /// Windows that jump to a scripted location as soon as they open.
    #[derive(Default)]
    struct FakeWindows {
        land_on: Option<&'static str>,
        refuse: bool,
        open: Mutex<HashMap<Uuid, String>>,
        calls: Mutex<Vec<(&'static str, Uuid)>>,
    }

    impl FakeWindows {
        fn record(&self, call: &'static str, attempt: Uuid) {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((call, attempt));
        }

        fn calls(&self) -> Vec<(&'static str, Uuid)> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl LoginWindows for FakeWindows {
        fn open(&self, attempt: Uuid, url: &str) -> Result<(), WindowError> {
            self.record("open", attempt);
            if self.refuse {
                return Err(WindowError("no display".to_string()));
            }
            let location = self.land_on.map_or_else(|| url.to_string(), String::from);
            self.open
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(attempt, location);
            Ok(())
        }

        fn current_url(&self, attempt: Uuid) -> Option<String> {
            self.open
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&attempt)
                .cloned()
        }

        fn hide(&self, attempt: Uuid) {
            self.record("hide", attempt);
        }

        fn close(&self, attempt: Uuid) {
            self.record("close", attempt);
            self.open
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&attempt);
        }
    }

    fn hosted(windows: FakeWindows) -> (LoginFlow, Arc<Session>, Arc<FakeWindows>) {
        let session = Arc::new(Session::new());
        let flow = LoginFlow::new(
            Arc::clone(&session),
            EventHub::new(),
            "https://auth.riotgames.com/authorize".to_string(),
            PollSettings {
                interval: Duration::from_millis(1),
                max_attempts: 5_000,
            },
        );
        let windows = Arc::new(windows);
        let host = WindowHost::new(flow.clone(), Arc::clone(&windows));
        tokio::spawn(host.run(CancellationToken::new()));
        (flow, session, windows)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_redirect_in_window_logs_in() {
        let (flow, session, windows) = hosted(FakeWindows {
            land_on: Some(REDIRECT),
            ..FakeWindows::default()
        });

        let attempt = flow.start();
        wait_until(|| windows.calls().contains(&("close", attempt))).await;

        assert_eq!(
            windows.calls(),
            vec![("open", attempt), ("hide", attempt), ("close", attempt)]
        );
        wait_until(|| {
            flow.state()
                == LoginState::Completed {
                    outcome: ShellEvent::LoginSuccess { attempt },
                }
        })
        .await;
        assert_eq!(session.tokens().await.unwrap().access_token(), "acc");
    }

    #[tokio::test]
    async fn test_refused_window_cancels_attempt() {
        let (flow, _, _) = hosted(FakeWindows {
            refuse: true,
            ..FakeWindows::default()
        });
        let mut rx = flow.events().subscribe();

        let attempt = flow.start();

        let outcome = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = rx.recv().await.unwrap();
                if event.is_outcome() {
                    return event;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(outcome, ShellEvent::LoginCancelled { attempt });
    }

    #[tokio::test]
    async fn test_superseded_window_is_closed_and_current_kept() {
        let (flow, session, windows) = hosted(FakeWindows::default());

        let first = flow.start();
        let second = flow.start();

        wait_until(|| windows.calls().contains(&("close", first))).await;
        wait_until(|| windows.calls().contains(&("open", second))).await;
        assert!(!windows.calls().contains(&("close", second)));
        assert!(windows.current_url(second).is_some());
        assert_eq!(flow.state(), LoginState::Awaiting { attempt: second });
        assert!(session.tokens().await.is_none());
    }
}

//! Login windows backed by Tauri webview windows.

use dsf_server::login::{LoginFlow, LoginWindows, WindowError};
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder, WindowEvent};
use uuid::Uuid;

const LOGIN_WINDOW_TITLE: &str = "Riot Sign In";
const LOGIN_WINDOW_WIDTH: f64 = 1100.0;
const LOGIN_WINDOW_HEIGHT: f64 = 800.0;

/// One webview window per login attempt, labelled by attempt id.
pub struct TauriLoginWindows {
    app: AppHandle,
    flow: LoginFlow,
}

impl TauriLoginWindows {
    pub const fn new(app: AppHandle, flow: LoginFlow) -> Self {
        Self { app, flow }
    }

    fn window(&self, attempt: Uuid) -> Option<WebviewWindow> {
        self.app.get_webview_window(&label(attempt))
    }
}

fn label(attempt: Uuid) -> String {
    format!("login-{}", attempt.simple())
}

impl LoginWindows for TauriLoginWindows {
    fn open(&self, attempt: Uuid, url: &str) -> Result<(), WindowError> {
        let url = url
            .parse::<tauri::Url>()
            .map_err(|e| WindowError(e.to_string()))?;

        let window = WebviewWindowBuilder::new(&self.app, label(attempt), WebviewUrl::External(url))
            .title(LOGIN_WINDOW_TITLE)
            .inner_size(LOGIN_WINDOW_WIDTH, LOGIN_WINDOW_HEIGHT)
            .center()
            .build()
            .map_err(|e| WindowError(e.to_string()))?;

        // Closing the window by hand abandons the attempt
        let flow = self.flow.clone();
        window.on_window_event(move |event| {
            if matches!(event, WindowEvent::Destroyed) && flow.cancel_attempt(attempt) {
                tracing::info!(%attempt, "Login window closed by the user");
            }
        });

        Ok(())
    }

    fn current_url(&self, attempt: Uuid) -> Option<String> {
        let url = self.window(attempt)?.url().ok()?;
        Some(url.to_string())
    }

    fn hide(&self, attempt: Uuid) {
        let Some(window) = self.window(attempt) else {
            return;
        };
        if let Err(e) = window.hide() {
            tracing::warn!(%attempt, error = %e, "Failed to hide login window");
        }
    }

    fn close(&self, attempt: Uuid) {
        let Some(window) = self.window(attempt) else {
            return;
        };
        if let Err(e) = window.destroy() {
            tracing::warn!(%attempt, error = %e, "Failed to close login window");
        }
    }
}

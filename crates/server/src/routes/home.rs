//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::config::{DsfConfig, Variant};
use crate::filters;
use crate::state::AppState;

/// Landing page template.
///
/// One page serves both variants; the script picks the login control from
/// `data-variant`.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// `web` or `desktop`.
    pub variant: &'static str,
    /// Whether the pasted-URL login form is shown.
    pub paste_login: bool,
    /// Riot sign-in link for the paste form.
    pub authorize_url: String,
}

impl IndexTemplate {
    #[must_use]
    pub fn new(config: &DsfConfig) -> Self {
        Self {
            variant: config.variant.as_str(),
            paste_login: config.variant == Variant::Web,
            authorize_url: config.riot.authorize_url(),
        }
    }
}

/// Display the landing page.
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate::new(state.config())
}

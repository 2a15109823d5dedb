//! Server-sent shell events for the desktop window host and page.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// `GET /api/events`
///
/// Each [`ShellEvent`](crate::login::ShellEvent) is sent with its name as the
/// SSE event type and its JSON form as data.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.login().events().subscribe();

    let event_stream = stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_else(|_| {
                        r#"{"type":"error","message":"Failed to serialize event"}"#.to_string()
                    });
                    yield Ok(Event::default().event(event.name()).data(json));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

//! Server-sent event stream of change events.
//!
//! Each frame carries one JSON-encoded `ChangeEvent` with the bus sequence
//! number as its id. The subscription lives as long as the response stream;
//! a client disconnect drops it, which unsubscribes.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use crate::bus::BusEvent;
use crate::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.bus.subscribe();
    let stream = subscription
        .into_stream()
        .take_until(state.closed())
        .filter_map(|event| async move { to_sse(&event) })
        .map(Ok);

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

fn to_sse(event: &BusEvent) -> Option<Event> {
    match serde_json::to_string(&event.change) {
        Ok(data) => Some(Event::default().id(event.seq.to_string()).data(data)),
        Err(e) => {
            tracing::warn!(seq = event.seq, "failed to encode change event: {e}");
            None
        }
    }
}

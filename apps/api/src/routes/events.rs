use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::feed::Table;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub user_id: Uuid,
    #[serde(default = "default_table")]
    pub table: Table,
}

fn default_table() -> Table {
    Table::Jobs
}

/// GET /api/v1/events
///
/// Server-sent change notifications for one table of one user. The event name
/// is the change kind; the data is the JSON-encoded `ChangeEvent`.
pub async fn handle_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = state
        .feed
        .subscribe(query.table, query.user_id)
        .into_stream()
        .map(|change| {
            let data = serde_json::to_string(&change).unwrap_or_default();
            Ok(Event::default().event(change.kind.as_str()).data(data))
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

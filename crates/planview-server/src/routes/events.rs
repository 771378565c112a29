use crate::error::AppError;
use crate::hub::Envelope;
use crate::state::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

/// SSE feed: one `initial` frame carrying the current snapshot, then an
/// `update` frame per publish. The receiver is taken before the snapshot
/// is read, so a publish racing the handshake is delivered rather than
/// lost.
pub async fn subscribe(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.hub.subscribe();
    let initial = state.hub.current().await?;
    let first = Event::default().data(serde_json::to_string(&Envelope::initial(&initial))?);

    let updates = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok().and_then(|snapshot| {
            serde_json::to_string(&Envelope::update(&snapshot))
                .ok()
                .map(|data| Ok::<Event, Infallible>(Event::default().data(data)))
        })
    });
    let stream = tokio_stream::once(Ok::<Event, Infallible>(first)).chain(updates);

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    ))
}

// src/stream/session.rs

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use crate::engine::RunEvent;
use crate::stream::encoder;

/// Turn an event receiver into an SSE response.
///
/// Every event is encoded and delivered in production order; the stream
/// ends when the producer closes the channel, which happens right after
/// the terminal event. Keep-alive comments hold the connection open
/// through long silent stretches of a deploy. When the remote side hangs
/// up, axum drops the stream, which drops the receiver, which the runner
/// observes and kills the child.
pub fn sse_response(
    rx: mpsc::Receiver<RunEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = ReceiverStream::new(rx).map(|event| {
        let envelope = encoder::encode(&event);
        // Envelope serialization is infallible in practice; fall back to a
        // literal error frame rather than break the stream.
        let data = serde_json::to_string(&envelope).unwrap_or_else(|_| {
            r#"{"type":"error","text":"event serialization failed"}"#.to_string()
        });
        Ok(Event::default().data(data))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

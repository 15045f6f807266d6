//! Helpers for building server-driven datastar SSE responses.

use std::{convert::Infallible, future::Future};

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, PatchElements, PatchSignals};

/// Builder for composing datastar-compatible SSE events.
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an element patch targeting the supplied selector.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Queue a datastar signal patch.
    pub fn push_signals(&mut self, payload: &str) -> &mut Self {
        let event = PatchSignals::new(payload).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// SSE response whose events are produced once `events` resolves.
///
/// The future lives inside the response body: when the client goes away the
/// body is dropped and so is the future, along with anything it owns.
pub fn deferred_response<F>(events: F) -> Response
where
    F: Future<Output = StreamBuilder> + Send + 'static,
{
    let stream = stream! {
        let builder = events.await;
        for event in builder.into_events() {
            yield Ok::<Event, Infallible>(event);
        }
    };
    Sse::new(stream).into_response()
}

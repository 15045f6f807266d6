use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{Instrument, error, info_span};

use crate::{
    application::{
        listing,
        loader::PostSource,
        page::IndexPage,
        stream::{StreamBuilder, deferred_response},
    },
    config::SiteSettings,
    domain::posts::CategoryFilter,
    presentation::views::{
        IndexTemplate, LayoutContext, render_not_found_response, render_template_response,
    },
};

use super::middleware::{RequestContext, log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub source: Arc<dyn PostSource>,
    pub site: Arc<SiteSettings>,
}

impl HttpState {
    pub fn new(source: Arc<dyn PostSource>, site: SiteSettings) -> Self {
        Self {
            source,
            site: Arc::new(site),
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ui/posts", get(posts_stream))
        .route("/_health", get(health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Page shell; the listing arrives through `/ui/posts`.
///
/// The category selection lives in the browser (`$category` signal), so the
/// shell is the same on every load.
async fn index(State(state): State<HttpState>) -> Response {
    let content = listing::shell_context(&state.site);
    let view = LayoutContext::new(listing::chrome(&state.site), content);
    render_template_response(IndexTemplate { view }, StatusCode::OK)
}

/// One page visit: mount, wait for the fetch, patch the listing in.
///
/// The page is owned by the response body, so a client that disconnects
/// early unmounts it and the late result is discarded.
async fn posts_stream(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    let span = info_span!(
        target: "postboard::http::stream",
        "page_visit",
        request_id = %ctx.request_id
    );
    let page = IndexPage::mount_in_span(state.source.clone(), CategoryFilter::All, span.clone());
    let site = state.site.clone();

    deferred_response(
        async move {
            let loaded = page.loaded().await;
            match listing::listing_stream(&site, &loaded) {
                Ok(stream) => stream,
                Err(err) => {
                    error!(
                        target = "postboard::http::stream",
                        status = err.status().as_u16(),
                        error = ?err,
                        "failed to render listing"
                    );
                    StreamBuilder::new()
                }
            }
        }
        .instrument(span),
    )
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(listing::chrome(&state.site))
}

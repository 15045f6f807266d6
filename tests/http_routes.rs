mod common;

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use async_trait::async_trait;
use httpmock::MockServer;
use tower::ServiceExt;
use tracing::Span;

use postboard::application::loader::{FetchError, PostSource};
use postboard::domain::posts::Post;
use postboard::infra::http::{HttpState, build_router};

use common::{POSTS_PATH, body_to_string, reference_posts, site, source};

async fn get(server: &MockServer, uri: &str) -> (StatusCode, Option<String>, String) {
    get_from(Arc::new(source(server)), uri).await
}

async fn get_from(
    source: Arc<dyn PostSource>,
    uri: &str,
) -> (StatusCode, Option<String>, String) {
    let state = HttpState::new(source, site());
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");

    let response = build_router(state)
        .oneshot(request)
        .await
        .expect("router response");
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = body_to_string(response.into_body()).await;
    (status, content_type, body)
}

async fn serve_reference_posts(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method("GET").path(POSTS_PATH);
            then.status(200).json_body(reference_posts());
        })
        .await
}

#[tokio::test]
async fn index_renders_shell_with_loading_placeholder() {
    let server = MockServer::start_async().await;

    let (status, _, body) = get(&server, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Minimal Blog</title>"));
    assert!(body.contains("Loading posts..."));
    assert!(body.contains("/ui/posts"));
    assert!(body.contains(r#"id="post-list""#));
    assert!(!body.contains("post-card"));
}

#[tokio::test]
async fn index_ignores_category_query_on_reload() {
    let server = MockServer::start_async().await;

    let (status, _, body) = get(&server, "/?category=second").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("@get('/ui/posts')"));
    assert!(!body.contains("category=second"));
    assert!(body.contains("category: ''"));
}

#[tokio::test]
async fn stream_patches_loaded_listing() {
    let server = MockServer::start_async().await;
    serve_reference_posts(&server).await;

    let (status, content_type, body) = get(&server, "/ui/posts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/event-stream"));
    assert!(body.contains("datastar-patch-elements"));
    assert!(body.contains("#category-filters"));
    assert!(body.contains("#post-list"));
    assert!(body.contains(r#"id="post-first-post""#));
    assert!(body.contains(r#"href="/posts/why-i-love-python""#));
    assert!(body.contains("Category - second"));
    assert!(body.contains("postsLoading"));
    assert!(!body.contains("Loading posts..."));
}

#[tokio::test]
async fn category_selection_happens_in_the_browser() {
    let server = MockServer::start_async().await;
    let mock = serve_reference_posts(&server).await;

    let (_, _, shell) = get(&server, "/").await;
    assert!(shell.contains("@get('/ui/posts')"));

    let (status, _, body) = get(&server, "/ui/posts").await;
    assert_eq!(status, StatusCode::OK);

    // Every card ships once and is shown or hidden against `$category`.
    assert!(body.contains(r#"id="post-first-post""#));
    assert!(body.contains(r#"id="post-fastapi-and-nextjs""#));
    assert!(body.contains(r#"id="post-why-i-love-python""#));
    assert!(body.contains(r#"data-category="second""#));
    assert!(body.contains("data-show="));

    // Filter entries set the signal instead of navigating.
    assert!(body.contains("data-on:click="));
    assert!(!body.contains("?category="));

    mock.assert_async().await;
}

#[tokio::test]
async fn stream_renders_empty_listing_when_upstream_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path(POSTS_PATH);
            then.status(500);
        })
        .await;

    let (status, _, body) = get(&server, "/ui/posts").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("#post-list"));
    assert!(!body.contains("post-card"));
    assert!(!body.contains("Loading posts..."));
}

#[tokio::test]
async fn health_reports_no_content() {
    let server = MockServer::start_async().await;

    let (status, _, _) = get(&server, "/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unknown_route_renders_not_found_page() {
    let server = MockServer::start_async().await;

    let (status, _, body) = get(&server, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found"));
}

/// Answers with no posts and records the span the fetch ran in.
#[derive(Default)]
struct SpanRecordingSource {
    seen: Mutex<Option<(&'static str, bool)>>,
}

#[async_trait]
impl PostSource for SpanRecordingSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        let span = Span::current();
        let seen = span
            .metadata()
            .map(|meta| (meta.name(), meta.fields().field("request_id").is_some()));
        *self.seen.lock().expect("lock") = seen;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn page_visit_fetch_runs_in_request_span() {
    let _default = tracing::subscriber::set_default(tracing_subscriber::registry());
    let source = Arc::new(SpanRecordingSource::default());

    let (status, _, _) = get_from(source.clone(), "/ui/posts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(*source.seen.lock().expect("lock"), Some(("page_visit", true)));
}

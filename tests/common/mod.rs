#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use http_body_util::BodyExt;
use httpmock::MockServer;
use serde_json::{Value, json};
use url::Url;

use postboard::config::{SiteSettings, UpstreamSettings};
use postboard::infra::api_client::HttpPostSource;

pub const POSTS_PATH: &str = "/api/posts";

/// Collection served by the reference posts API, `content` included.
pub fn reference_posts() -> Value {
    json!([
        {
            "slug": "first-post",
            "title": "My first post",
            "content": "Notes on web development.",
            "author": "Rauli",
            "date": "2.07.2025",
            "category": "first"
        },
        {
            "slug": "fastapi-and-nextjs",
            "title": "FastAPI + Next.js",
            "content": "A backend and a frontend.",
            "author": "Rauli",
            "date": "2.07.2025",
            "category": "second"
        },
        {
            "slug": "why-i-love-python",
            "title": "Why I love Python",
            "content": "Simple syntax, big ecosystem.",
            "author": "Rauli",
            "date": "2.07.2025",
            "category": "first"
        }
    ])
}

pub fn upstream(server: &MockServer) -> UpstreamSettings {
    UpstreamSettings {
        posts_url: Url::parse(&server.url(POSTS_PATH)).expect("mock url"),
        timeout: Duration::from_secs(5),
    }
}

pub fn source(server: &MockServer) -> HttpPostSource {
    HttpPostSource::new(&upstream(server)).expect("http source")
}

pub fn site() -> SiteSettings {
    SiteSettings {
        title: "Minimal Blog".to_string(),
        all_label: "All".to_string(),
        loading_message: "Loading posts...".to_string(),
        detail_path_prefix: "/posts".to_string(),
        datastar_script: "/static/datastar.js".to_string(),
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.expect("collect body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Site-wide pieces every full page renders.
#[derive(Clone)]
pub struct LayoutChrome {
    pub site_title: String,
    pub datastar_script: String,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub site_title: String,
    pub datastar_script: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            site_title: chrome.site_title,
            datastar_script: chrome.datastar_script,
            content,
        }
    }
}

/// Filter button; `category` is empty for the "all" entry.
#[derive(Clone)]
pub struct CategoryLink {
    pub label: String,
    pub category: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PostCard {
    /// Element id, derived from the percent-encoded slug.
    pub dom_id: String,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub category: String,
    pub href: String,
}

/// Index page before the posts have arrived.
pub struct ShellContext {
    pub loading_message: String,
    /// Datastar SSE endpoint that delivers the loaded listing.
    pub stream_url: String,
}

/// Every loaded post is rendered once; the browser hides the cards that do
/// not match the `$category` signal.
pub struct ListingContext {
    pub filters: Vec<CategoryLink>,
    pub posts: Vec<PostCard>,
    pub loading: bool,
    pub loading_message: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<ShellContext>,
}

#[derive(Template)]
#[template(path = "partials/filters.html")]
pub struct FiltersPartial {
    pub filters: Vec<CategoryLink>,
}

#[derive(Template)]
#[template(path = "partials/posts.html")]
pub struct PostsPartial {
    pub content: ListingContext,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub home_href: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
            home_href: "/".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

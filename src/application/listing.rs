//! Turns index page state into view models and datastar patches.

use askama::Template;
use datastar::prelude::ElementPatchMode;
use url::form_urlencoded;

use crate::application::error::HttpError;
use crate::application::page::PageState;
use crate::application::stream::StreamBuilder;
use crate::config::SiteSettings;
use crate::domain::posts::Post;
use crate::presentation::views::{
    CategoryLink, FiltersPartial, LayoutChrome, ListingContext, PostCard, PostsPartial,
    ShellContext, TemplateRenderError,
};

const SOURCE: &str = "application::listing";
const STREAM_PATH: &str = "/ui/posts";
const FILTERS_SELECTOR: &str = "#category-filters";
const POSTS_SELECTOR: &str = "#post-list";

pub fn chrome(site: &SiteSettings) -> LayoutChrome {
    LayoutChrome {
        site_title: site.title.clone(),
        datastar_script: site.datastar_script.clone(),
    }
}

pub fn shell_context(site: &SiteSettings) -> ShellContext {
    ShellContext {
        loading_message: site.loading_message.clone(),
        stream_url: STREAM_PATH.to_string(),
    }
}

/// View model of the loaded listing.
///
/// Every post is rendered; choosing a category only flips the `$category`
/// signal in the browser, so the listing always starts on the "all" entry.
pub fn listing_context(site: &SiteSettings, state: &PageState) -> ListingContext {
    let categories = state.categories();
    let mut filters = Vec::with_capacity(categories.len() + 1);
    filters.push(CategoryLink {
        label: site.all_label.clone(),
        category: String::new(),
        is_active: true,
    });
    filters.extend(categories.into_iter().map(|category| CategoryLink {
        label: category.clone(),
        category,
        is_active: false,
    }));

    let posts = state
        .posts
        .iter()
        .map(|post| post_card(site, post))
        .collect();

    ListingContext {
        filters,
        posts,
        loading: state.loading,
        loading_message: site.loading_message.clone(),
    }
}

/// Patches that replace the shell's placeholders with the loaded listing.
pub fn listing_stream(site: &SiteSettings, state: &PageState) -> Result<StreamBuilder, HttpError> {
    let content = listing_context(site, state);

    let filters_html = FiltersPartial {
        filters: content.filters.clone(),
    }
    .render()
    .map_err(render_failure)?;
    let posts_html = PostsPartial { content }.render().map_err(render_failure)?;

    let mut stream = StreamBuilder::new();
    stream
        .push_patch(filters_html, FILTERS_SELECTOR, ElementPatchMode::Replace)
        .push_patch(posts_html, POSTS_SELECTOR, ElementPatchMode::Replace)
        .push_signals(r#"{"postsLoading": false}"#);
    Ok(stream)
}

pub fn detail_href(prefix: &str, slug: &str) -> String {
    format!("{prefix}/{}", encode_slug(slug))
}

fn encode_slug(slug: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(slug.as_bytes()).collect();
    encoded.replace('+', "%20")
}

fn post_card(site: &SiteSettings, post: &Post) -> PostCard {
    PostCard {
        dom_id: format!("post-{}", encode_slug(&post.slug)),
        slug: post.slug.clone(),
        title: post.title.clone(),
        author: post.author.clone(),
        date: post.date.clone(),
        category: post.category.clone(),
        href: detail_href(&site.detail_path_prefix, &post.slug),
    }
}

fn render_failure(err: askama::Error) -> HttpError {
    HttpError::from(TemplateRenderError::new(
        SOURCE,
        "Template rendering failed",
        err,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::CategoryFilter;

    fn site() -> SiteSettings {
        SiteSettings {
            title: "Minimal Blog".to_string(),
            all_label: "All".to_string(),
            loading_message: "Loading posts...".to_string(),
            detail_path_prefix: "/posts".to_string(),
            datastar_script: "/datastar.js".to_string(),
        }
    }

    fn post(slug: &str, category: &str) -> Post {
        Post {
            slug: slug.to_string(),
            title: format!("Title {slug}"),
            author: "Rauli".to_string(),
            date: "2.07.2025".to_string(),
            category: category.to_string(),
        }
    }

    fn loaded(selection: CategoryFilter) -> PageState {
        PageState {
            posts: vec![post("a", "tech"), post("b", "life"), post("c", "tech")],
            loading: false,
            selection,
        }
    }

    #[test]
    fn filters_start_with_all_then_categories() {
        let content = listing_context(&site(), &loaded(CategoryFilter::All));
        let labels: Vec<&str> = content.filters.iter().map(|f| f.label.as_str()).collect();
        let values: Vec<&str> = content.filters.iter().map(|f| f.category.as_str()).collect();

        assert_eq!(labels, vec!["All", "tech", "life"]);
        assert_eq!(values, vec!["", "tech", "life"]);
        assert!(content.filters[0].is_active);
        assert!(!content.filters[1].is_active);
    }

    #[test]
    fn every_loaded_post_is_rendered_whatever_the_selection() {
        let content = listing_context(
            &site(),
            &loaded(CategoryFilter::Category("tech".into())),
        );

        let slugs: Vec<&str> = content.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        let active: Vec<&str> = content
            .filters
            .iter()
            .filter(|f| f.is_active)
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(active, vec!["All"]);
    }

    #[test]
    fn cards_link_to_detail_prefix() {
        let content = listing_context(&site(), &loaded(CategoryFilter::All));
        assert_eq!(content.posts[0].href, "/posts/a");
        assert_eq!(content.posts[0].dom_id, "post-a");
    }

    #[test]
    fn detail_href_encodes_slug() {
        assert_eq!(detail_href("/posts", "hello world"), "/posts/hello%20world");
        assert_eq!(detail_href("/posts", "a/b"), "/posts/a%2Fb");
        assert_eq!(detail_href("/posts", "c++"), "/posts/c%2B%2B");
    }

    #[test]
    fn card_id_uses_encoded_slug() {
        let card = post_card(&site(), &post("hello world", "tech"));
        assert_eq!(card.dom_id, "post-hello%20world");
        assert!(!card.dom_id.contains(char::is_whitespace));
    }

    #[test]
    fn shell_stream_url_carries_no_selection() {
        assert_eq!(shell_context(&site()).stream_url, "/ui/posts");
    }

    #[test]
    fn posts_partial_renders_cards() {
        let content = listing_context(&site(), &loaded(CategoryFilter::All));
        let html = PostsPartial { content }.render().expect("render posts");

        assert!(html.contains(r#"id="post-a""#));
        assert!(html.contains(r#"data-category="life""#));
        assert!(html.contains("data-show="));
        assert!(html.contains("Author - Rauli. Date - 2.07.2025"));
        assert!(html.contains("Category - life"));
        assert!(!html.contains("Loading posts..."));
    }

    #[test]
    fn posts_partial_renders_placeholder_while_loading() {
        let state = PageState {
            posts: Vec::new(),
            loading: true,
            selection: CategoryFilter::All,
        };
        let content = listing_context(&site(), &state);
        let html = PostsPartial { content }.render().expect("render posts");

        assert!(html.contains("Loading posts..."));
        assert!(!html.contains("post-card"));
    }

    #[test]
    fn filters_partial_renders_client_side_buttons() {
        let content = listing_context(&site(), &loaded(CategoryFilter::All));
        let html = FiltersPartial {
            filters: content.filters,
        }
        .render()
        .expect("render filters");

        assert!(html.contains(r#"data-category="""#));
        assert!(html.contains(r#"data-category="tech""#));
        assert!(html.contains("data-on:click="));
        assert!(!html.contains("href="));
    }

    #[test]
    fn listing_stream_patches_filters_posts_and_signal() {
        let stream = listing_stream(&site(), &loaded(CategoryFilter::All)).expect("stream");
        assert_eq!(stream.len(), 3);
    }
}

//! Post collection helpers: category derivation and selection filtering.

use std::collections::HashSet;

pub use postboard_api_types::Post;

/// Active category selection for the index page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filter; every post is shown.
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Build a filter from an optional query value. Blank values mean "all".
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(category) if !category.is_empty() => Self::Category(category.to_string()),
            _ => Self::All,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Category(value) => Some(value.as_str()),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(value) => post.category == *value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

/// Distinct categories of `posts` in first-seen order.
pub fn categories(posts: &[Post]) -> Vec<String> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|post| seen.insert(post.category.as_str()))
        .map(|post| post.category.clone())
        .collect()
}

/// Posts matching `filter`, in their original order.
pub fn filter_posts<'a>(posts: &'a [Post], filter: &CategoryFilter) -> Vec<&'a Post> {
    posts.iter().filter(|post| filter.matches(post)).collect()
}

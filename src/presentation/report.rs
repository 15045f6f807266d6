//! Plain-text and JSON rendering of a loaded listing for the `list` command.

use serde::Serialize;

use crate::application::page::PageState;
use crate::domain::posts::Post;

#[derive(Debug, Serialize)]
pub struct ListingReport<'a> {
    pub categories: Vec<String>,
    pub selection: Option<&'a str>,
    pub posts: Vec<&'a Post>,
}

impl<'a> ListingReport<'a> {
    pub fn from_state(state: &'a PageState) -> Self {
        Self {
            categories: state.categories(),
            selection: state.selection.category(),
            posts: state.visible_posts(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self, all_label: &str) -> String {
        let mut out = String::new();
        out.push_str("Categories: ");
        out.push_str(all_label);
        for category in &self.categories {
            out.push_str(", ");
            out.push_str(category);
        }
        out.push('\n');
        if let Some(selection) = self.selection {
            out.push_str(&format!("Showing: {selection}\n"));
        }
        for post in &self.posts {
            out.push_str(&format!(
                "\n{title} [{slug}]\n  Author - {author}. Date - {date}\n  Category - {category}\n",
                title = post.title,
                slug = post.slug,
                author = post.author,
                date = post.date,
                category = post.category,
            ));
        }
        out
    }
}

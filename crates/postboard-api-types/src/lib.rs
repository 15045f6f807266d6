//! Request and response shapes of the posts API that postboard reads from.

use serde::{Deserialize, Serialize};

/// Summary of one blog entry as returned by `GET /api/posts`.
///
/// Unknown fields (the API also sends the full `content`) are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub author: String,
    /// Display-formatted date, passed through as-is.
    pub date: String,
    pub category: String,
}

/// Body of `GET /api/posts`.
pub type PostList = Vec<Post>;

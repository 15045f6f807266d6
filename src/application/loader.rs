//! Source of the post collection shown on the index page.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::Post;

/// Any failure to obtain the post collection.
///
/// Callers treat every variant the same way; the variants only enrich the log line.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to posts API failed: {message}")]
    Transport { message: String },
    #[error("posts API request timed out")]
    Timeout,
    #[error("posts API responded with status {status}")]
    Status { status: u16 },
    #[error("posts API returned an unreadable body: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError>;
}

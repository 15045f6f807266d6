//! `reqwest` adapter that reads the post collection from the posts API.

use async_trait::async_trait;
use postboard_api_types::PostList;
use reqwest::{Client, Url, header::ACCEPT};

use crate::{
    application::loader::{FetchError, PostSource},
    config::UpstreamSettings,
    domain::posts::Post,
    infra::error::InfraError,
};

#[derive(Clone, Debug)]
pub struct HttpPostSource {
    client: Client,
    posts_url: Url,
}

impl HttpPostSource {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            posts_url: settings.posts_url.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("postboard/", env!("CARGO_PKG_VERSION"))
    }

    pub fn posts_url(&self) -> &Url {
        &self.posts_url
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        let resp = self
            .client
            .get(self.posts_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(map_transport_error)?;
        let posts: PostList = serde_json::from_slice(&bytes).map_err(FetchError::decode)?;
        Ok(posts)
    }
}

fn map_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::transport(err)
    }
}

use std::time::Duration;

use log::error;
use reqwest::{header, Response};
use reqwest_middleware::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
    fanbox::{FollowingCreator, Post, PostListItem, SupportingCreator},
};

use super::ArchiveClient;

const API_BASE: &str = "https://api.fanbox.cc";
const ORIGIN: &str = "https://www.fanbox.cc";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0";

const API_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct FanboxClient {
    inner: ArchiveClient,
    session: String,
    base: String,
}

impl FanboxClient {
    pub fn new(config: &Config) -> Self {
        Self {
            inner: ArchiveClient::new(),
            session: config.session(),
            base: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(session: String, base: String) -> Self {
        Self {
            inner: ArchiveClient::new(),
            session,
            base,
        }
    }

    fn wrap_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(header::COOKIE, &self.session)
            // FANBOX rejects requests without an Origin header.
            .header(header::ORIGIN, ORIGIN)
            .header(header::USER_AGENT, USER_AGENT)
    }

    /// Fetch a JSON endpoint and unwrap the `{"body": …}` envelope.
    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let client = self.inner.json_client();
        let request = self.wrap_request(client.get(url)).timeout(API_TIMEOUT);
        let response = request.send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        match serde_json::from_slice::<FanboxResponse<T>>(&bytes) {
            Ok(response) => Ok(response.body),
            Err(decode_error) => match serde_json::from_slice::<FanboxErrorResponse>(&bytes) {
                Ok(response) => {
                    if response.error == "general_error" {
                        error!("The session is invalid or expired, or the API has changed");
                    }
                    Err(Error::Api(response.error))
                }
                Err(_) => Err(Error::Decode(decode_error)),
            },
        }
    }

    /// One request returning the full ordered list of page URLs for the
    /// creator's post listing.
    pub async fn paginate_creator(&self, creator_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/post.paginateCreator?creatorId={}", self.base, creator_id);
        self.fetch(&url).await
    }

    /// Post summaries of one listing page, in server-declared order.
    pub async fn list_page(&self, url: &str) -> Result<Vec<PostListItem>> {
        self.fetch(url).await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        let url = format!("{}/post.info?postId={}", self.base, post_id);
        self.fetch(&url).await
    }

    pub async fn get_supporting_creators(&self) -> Result<Vec<SupportingCreator>> {
        let url = format!("{}/plan.listSupporting", self.base);
        self.fetch(&url).await
    }

    pub async fn get_following_creators(&self) -> Result<Vec<FollowingCreator>> {
        let url = format!("{}/creator.listFollowing", self.base);
        self.fetch(&url).await
    }

    /// Authenticated GET of an asset URL. Status handling is left to the
    /// caller so the thumbnail fallback can inspect it.
    pub async fn fetch_asset(&self, url: &str) -> Result<Response> {
        let request = self
            .inner
            .raw()
            .get(url)
            .header(header::COOKIE, &self.session)
            .header(header::ORIGIN, ORIGIN)
            .header(header::USER_AGENT, USER_AGENT);
        Ok(request.send().await?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FanboxResponse<T> {
    pub body: T,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FanboxErrorResponse {
    error: String,
}

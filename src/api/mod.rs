pub mod fanbox;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

pub use fanbox::FanboxClient;

const RETRY_LIMIT: u32 = 3;

/// Shared transport. JSON API calls go through the transient-retry
/// middleware; asset transfers use the bare client so the download retry
/// policy owns their retries.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
}

impl ArchiveClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn json_client(&self) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(RETRY_LIMIT);

        ClientBuilder::new(self.client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    pub fn raw(&self) -> &Client {
        &self.client
    }
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::new()
    }
}

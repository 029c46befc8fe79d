pub mod retry;

use std::path::Path;

use log::warn;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::{
    api::FanboxClient,
    error::{Error, Result},
    post::Asset,
    storage::LocalStorage,
};

pub use retry::RetryPolicy;

/// Detects the platform's "original is too large to serve" marker. The
/// exact trigger has varied, so it is injectable rather than inlined.
#[derive(Debug, Clone)]
pub struct ThumbnailFallback {
    trigger: StatusCode,
}

impl Default for ThumbnailFallback {
    fn default() -> Self {
        Self {
            trigger: StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl ThumbnailFallback {
    pub fn with_trigger(trigger: StatusCode) -> Self {
        Self { trigger }
    }

    pub fn applies(&self, status: StatusCode) -> bool {
        status == self.trigger
    }
}

/// Retry-wrapped fetch of a single asset, streamed to its destination path.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    client: FanboxClient,
    storage: LocalStorage,
    policy: RetryPolicy,
    fallback: ThumbnailFallback,
}

impl AssetFetcher {
    pub fn new(client: FanboxClient, storage: LocalStorage) -> Self {
        Self {
            client,
            storage,
            policy: RetryPolicy::default(),
            fallback: ThumbnailFallback::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn fetch_and_save(
        &self,
        asset: &Asset,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.policy
            .run(cancel, || self.attempt(asset, path))
            .await
    }

    async fn attempt(&self, asset: &Asset, path: &Path) -> Result<()> {
        let mut response = self.client.fetch_asset(asset.url()).await?;

        if self.fallback.applies(response.status()) {
            if let Some(thumbnail) = asset.thumbnail_url() {
                warn!(
                    "Original of {} is too large to serve, downloading the thumbnail instead",
                    asset.id()
                );
                response = self.client.fetch_asset(thumbnail).await?;
            }
        }

        if response.status() != StatusCode::OK {
            return Err(Error::Status {
                url: asset.url().to_string(),
                status: response.status(),
            });
        }

        self.storage.save(path, response.bytes_stream()).await
    }
}

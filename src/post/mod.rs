pub mod body;

use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::{
    api::FanboxClient,
    config::DownloadOptions,
    download::AssetFetcher,
    error::{Error, Result},
    fanbox::PostListItem,
    storage::LocalStorage,
};

pub use body::{Asset, AssetKind};

/// Whether the creator traversal keeps going after a post. `Stop` is the
/// deliberate end of an incremental sync, not a failure.
enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Fetch,
    Skip(SkipReason),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    EmptyId,
    ExcludedKind,
    AlreadyDownloaded,
    DryRun,
}

/// Per-asset decision, evaluated in extraction order.
pub(crate) fn decide(asset: &Asset, exists: bool, options: &DownloadOptions) -> Action {
    if asset.id().is_empty() {
        return Action::Skip(SkipReason::EmptyId);
    }

    let excluded = match asset.kind() {
        AssetKind::Image => options.skip_images,
        AssetKind::File => options.skip_files,
    };
    if excluded {
        return Action::Skip(SkipReason::ExcludedKind);
    }

    if exists {
        // Posts arrive newest first, so the first hit means everything
        // older is already on disk unless a full check was requested.
        return if options.check_all_posts {
            Action::Skip(SkipReason::AlreadyDownloaded)
        } else {
            Action::Stop
        };
    }

    if options.dry_run {
        return Action::Skip(SkipReason::DryRun);
    }

    Action::Fetch
}

/// Images and files keep independent zero-based counters within a post so
/// their names stay compatible with earlier layouts and never collide.
pub(crate) fn with_ordinals(assets: Vec<Asset>) -> Vec<(usize, Asset)> {
    let mut images = 0usize;
    let mut files = 0usize;
    assets
        .into_iter()
        .map(|asset| {
            let order = match asset.kind() {
                AssetKind::Image => {
                    images += 1;
                    images - 1
                }
                AssetKind::File => {
                    files += 1;
                    files - 1
                }
            };
            (order, asset)
        })
        .collect()
}

/// Walks one creator's paginated post listing and downloads every asset
/// not yet on disk, strictly sequentially.
pub struct Archiver {
    client: FanboxClient,
    storage: LocalStorage,
    fetcher: AssetFetcher,
    options: DownloadOptions,
    cancel: CancellationToken,
}

impl Archiver {
    pub fn new(
        client: FanboxClient,
        storage: LocalStorage,
        options: DownloadOptions,
        cancel: CancellationToken,
    ) -> Self {
        let fetcher = AssetFetcher::new(client.clone(), storage.clone());
        Self {
            client,
            storage,
            fetcher,
            options,
            cancel,
        }
    }

    pub async fn archive_creator(&self, creator_id: &str) -> Result<()> {
        let pages = self.client.paginate_creator(creator_id).await?;
        info!("{} pages of posts", pages.len());

        'pages: for url in pages {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let items = match self.client.list_page(&url).await {
                Ok(items) => items,
                Err(e) if self.options.skip_on_error && !matches!(e, Error::Cancelled) => {
                    error!("Failed to fetch page {url}: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for item in items {
                match self.process_post(&item).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Stop) => break 'pages,
                    Err(e) if self.options.skip_on_error && !matches!(e, Error::Cancelled) => {
                        error!("Failed to archive post {:?}: {e}", item.title);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    async fn process_post(&self, item: &PostListItem) -> Result<Flow> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if item.is_restricted {
            debug!("Skipping a restricted post: {:?}", item.title);
            return Ok(Flow::Continue);
        }

        let post = self.client.get_post(&item.id).await?;
        let assets = post.assets();
        if assets.is_empty() {
            debug!("No downloadable assets in {:?}", post.title);
            return Ok(Flow::Continue);
        }

        for (order, asset) in with_ordinals(assets) {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let path = self.storage.asset_path(&post, order, &asset);
            let exists = self.storage.exists(&path)?;

            match decide(&asset, exists, &self.options) {
                Action::Fetch => {
                    info!("Downloading {order}th asset of {:?}", post.title);
                    self.fetcher
                        .fetch_and_save(&asset, &path, &self.cancel)
                        .await?;
                }
                Action::Skip(SkipReason::AlreadyDownloaded) => {
                    info!("Already downloaded {order}th asset of {:?}", post.title);
                }
                Action::Skip(SkipReason::DryRun) => {
                    info!("[dry-run] Would download {order}th asset of {:?}", post.title);
                }
                Action::Skip(SkipReason::EmptyId) => {
                    debug!("Skipping an unreferenced asset in {:?}", post.title);
                }
                Action::Skip(SkipReason::ExcludedKind) => {
                    debug!("Skipping an excluded asset kind in {:?}", post.title);
                }
                Action::Stop => {
                    info!("Already downloaded {order}th asset of {:?}", post.title);
                    info!("No more new assets.");
                    return Ok(Flow::Stop);
                }
            }
        }

        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::fanbox::{PostFile, PostImage};

    fn image(id: &str) -> Asset {
        Asset::Image(PostImage {
            id: id.to_string(),
            extension: "png".to_string(),
            width: 100,
            height: 100,
            original_url: String::new(),
            thumbnail_url: String::new(),
        })
    }

    fn file(id: &str) -> Asset {
        Asset::File(PostFile {
            id: id.to_string(),
            name: "archive".to_string(),
            extension: "zip".to_string(),
            size: 1,
            url: String::new(),
        })
    }

    #[test]
    fn ordinals_are_independent_per_kind() {
        let ordered = with_ordinals(vec![image("i0"), file("f0"), image("i1"), file("f1")]);
        let orders: Vec<(usize, &str)> = ordered
            .iter()
            .map(|(order, asset)| (*order, asset.id()))
            .collect();
        assert_eq!(
            orders,
            vec![(0, "i0"), (0, "f0"), (1, "i1"), (1, "f1")]
        );
    }

    #[test]
    fn empty_id_is_skipped_before_anything_else() {
        let options = DownloadOptions::default();
        let asset = Asset::Image(PostImage::default());
        assert_eq!(decide(&asset, true, &options), Action::Skip(SkipReason::EmptyId));
    }

    #[test]
    fn excluded_kinds_are_skipped() {
        let options = DownloadOptions {
            skip_files: true,
            ..DownloadOptions::default()
        };
        assert_eq!(
            decide(&file("f"), false, &options),
            Action::Skip(SkipReason::ExcludedKind)
        );
        assert_eq!(decide(&image("i"), false, &options), Action::Fetch);
    }

    #[test]
    fn existing_asset_stops_the_creator_by_default() {
        let options = DownloadOptions::default();
        assert_eq!(decide(&image("i"), true, &options), Action::Stop);
    }

    #[test]
    fn existing_asset_is_skipped_when_checking_all_posts() {
        let options = DownloadOptions {
            check_all_posts: true,
            ..DownloadOptions::default()
        };
        assert_eq!(
            decide(&image("i"), true, &options),
            Action::Skip(SkipReason::AlreadyDownloaded)
        );
    }

    #[test]
    fn dry_run_never_fetches() {
        let options = DownloadOptions {
            dry_run: true,
            ..DownloadOptions::default()
        };
        assert_eq!(decide(&image("i"), false, &options), Action::Skip(SkipReason::DryRun));
    }

    fn post_body_json(server_uri: &str) -> serde_json::Value {
        json!({
            "images": [
                {
                    "id": "img1",
                    "extension": "png",
                    "width": 1200,
                    "height": 675,
                    "originalUrl": format!("{server_uri}/original/img1.png"),
                    "thumbnailUrl": format!("{server_uri}/thumb/img1.png"),
                },
                {
                    "id": "img2",
                    "extension": "png",
                    "width": 1200,
                    "height": 675,
                    "originalUrl": format!("{server_uri}/original/img2.png"),
                    "thumbnailUrl": format!("{server_uri}/thumb/img2.png"),
                }
            ]
        })
    }

    async fn mount_creator(server: &MockServer) {
        let uri = server.uri();
        Mock::given(method("GET"))
            .and(url_path("/post.paginateCreator"))
            .and(query_param("creatorId", "alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [format!("{uri}/post.listCreator?creatorId=alice&page=1")]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/post.listCreator"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [{
                    "id": "100",
                    "title": "Sketches",
                    "feeRequired": 500,
                    "publishedDatetime": "2024-03-09T12:00:00+00:00",
                    "updatedDatetime": "2024-03-09T12:00:00+00:00",
                    "isRestricted": false,
                    "creatorId": "alice",
                }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/post.info"))
            .and(query_param("postId", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": {
                    "id": "100",
                    "title": "Sketches",
                    "feeRequired": 500,
                    "publishedDatetime": "2024-03-09T12:00:00+00:00",
                    "updatedDatetime": "2024-03-09T12:00:00+00:00",
                    "isRestricted": false,
                    "creatorId": "alice",
                    "body": post_body_json(&uri),
                }
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/original/img1.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one".to_vec()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/original/img2.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"two".to_vec()))
            .mount(server)
            .await;
    }

    fn archiver(
        server: &MockServer,
        dir: &tempfile::TempDir,
        options: DownloadOptions,
    ) -> Archiver {
        let client =
            FanboxClient::with_base_url("FANBOXSESSID=test".to_string(), server.uri());
        let storage = LocalStorage {
            save_dir: dir.path().to_path_buf(),
            dir_by_post: false,
            dir_by_plan: false,
        };
        Archiver::new(client, storage, options, CancellationToken::new())
    }

    async fn asset_request_count(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|request| request.url.path().starts_with("/original/"))
            .count()
    }

    #[tokio::test]
    async fn downloads_every_asset_then_stops_short_on_rerun() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_creator(&server).await;

        let archiver = archiver(&server, &dir, DownloadOptions::default());
        archiver.archive_creator("alice").await.unwrap();

        let first = dir
            .path()
            .join("alice/2024-03-09-Sketches-0-img1.png");
        let second = dir
            .path()
            .join("alice/2024-03-09-Sketches-1-img2.png");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(asset_request_count(&server).await, 2);

        // Second run over identical upstream content: the first existing
        // asset ends the traversal, so no asset is fetched again.
        archiver.archive_creator("alice").await.unwrap();
        assert_eq!(asset_request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn dry_run_makes_no_asset_requests_and_writes_nothing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_creator(&server).await;

        let options = DownloadOptions {
            dry_run: true,
            ..DownloadOptions::default()
        };
        archiver(&server, &dir, options)
            .archive_creator("alice")
            .await
            .unwrap();

        assert_eq!(asset_request_count(&server).await, 0);
        assert!(!dir.path().join("alice").exists());
    }

    #[tokio::test]
    async fn restricted_posts_are_skipped_without_a_detail_fetch() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let uri = server.uri();
        Mock::given(method("GET"))
            .and(url_path("/post.paginateCreator"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [format!("{uri}/post.listCreator?creatorId=alice&page=1")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/post.listCreator"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [{
                    "id": "100",
                    "title": "Locked",
                    "feeRequired": 10000,
                    "publishedDatetime": "2024-03-09T12:00:00+00:00",
                    "updatedDatetime": "2024-03-09T12:00:00+00:00",
                    "isRestricted": true,
                    "creatorId": "alice",
                }]
            })))
            .mount(&server)
            .await;

        archiver(&server, &dir, DownloadOptions::default())
            .archive_creator("alice")
            .await
            .unwrap();

        let detail_requests = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|request| request.url.path() == "/post.info")
            .count();
        assert_eq!(detail_requests, 0);
    }

    #[tokio::test]
    async fn page_failure_aborts_unless_skip_on_error() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let uri = server.uri();
        Mock::given(method("GET"))
            .and(url_path("/post.paginateCreator"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [format!("{uri}/post.listCreator?creatorId=alice&page=1")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/post.listCreator"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = archiver(&server, &dir, DownloadOptions::default())
            .archive_creator("alice")
            .await;
        assert!(matches!(result, Err(Error::Status { .. })));

        let options = DownloadOptions {
            skip_on_error: true,
            ..DownloadOptions::default()
        };
        archiver(&server, &dir, options)
            .archive_creator("alice")
            .await
            .unwrap();
    }
}

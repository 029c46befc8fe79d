use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use log::warn;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::{
    config::Config,
    error::{Error, Result},
    fanbox::Post,
    post::{Asset, AssetKind},
};

// Path stems longer than this are truncated so the OS accepts the name.
const MAX_STEM_BYTES: usize = 250;

/// Destination tree for downloaded assets. Disk presence under the derived
/// paths is the only record of what has been downloaded.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pub save_dir: PathBuf,
    pub dir_by_post: bool,
    pub dir_by_plan: bool,
}

impl LocalStorage {
    pub fn new(config: &Config) -> Self {
        Self {
            save_dir: config.output().clone(),
            dir_by_post: config.dir_by_post(),
            dir_by_plan: config.dir_by_plan(),
        }
    }

    /// Deterministic destination path for an asset. `order` is the asset's
    /// zero-based position among assets of the same kind in its post; files
    /// carry a `file-` tag so the two counters never collide.
    pub fn asset_path(&self, post: &Post, order: usize, asset: &Asset) -> PathBuf {
        let date = post.published_datetime.format("%Y-%m-%d");
        let title = escape_title(&post.title);

        let tag = match asset.kind() {
            AssetKind::Image => "",
            AssetKind::File => "file-",
        };

        let mut dir = self.save_dir.join(&post.creator_id);
        if self.dir_by_plan {
            dir = dir.join(format!("{}yen", post.fee_required));
        }

        if self.dir_by_post {
            // [save]/[creator]/[plan]/[date]-[title]/[file-][order]-[id].[ext]
            dir.join(limit_stem(&format!("{date}-{title}")))
                .join(format!("{tag}{order}-{}.{}", asset.id(), asset.extension()))
        } else {
            // [save]/[creator]/[plan]/[date]-[title]-[file-][order]-[id].[ext]
            dir.join(format!(
                "{}.{}",
                limit_stem(&format!("{date}-{title}-{tag}{order}-{}", asset.id())),
                asset.extension()
            ))
        }
    }

    pub fn exists(&self, path: &Path) -> Result<bool> {
        match std::fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Filesystem(e)),
        }
    }

    /// Stream a response body to `path`, creating parent directories as
    /// needed. A failure mid-stream removes the partial file before the
    /// error is returned; if even that removal fails the orphan is reported
    /// distinctly.
    pub async fn save<S, E>(&self, path: &Path, mut stream: S) -> Result<()>
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
        E: Into<Error>,
    {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(Error::Filesystem)?;
        }

        let mut file = File::create(path).await.map_err(Error::Filesystem)?;

        let result = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(Into::into)?;
                file.write_all(&chunk).await.map_err(Error::Filesystem)?;
            }
            file.flush().await.map_err(Error::Filesystem)
        }
        .await;

        if let Err(error) = result {
            drop(file);
            warn!("Removing partial file {}", path.display());
            if let Err(remove) = tokio::fs::remove_file(path).await {
                return Err(Error::Cleanup {
                    path: path.to_path_buf(),
                    write: error.to_string(),
                    remove,
                });
            }
            return Err(error);
        }

        Ok(())
    }
}

fn escape_title(title: &str) -> String {
    let escaped: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    escaped.trim().to_string()
}

fn limit_stem(stem: &str) -> String {
    if stem.len() <= MAX_STEM_BYTES {
        return stem.to_string();
    }
    let mut end = MAX_STEM_BYTES - 3;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &stem[..end])
}

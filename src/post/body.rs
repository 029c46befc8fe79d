use crate::fanbox::{Post, PostBlock, PostBody, PostFile, PostImage};

/// A downloadable unit of a post body.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Image(PostImage),
    File(PostFile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    File,
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Image(_) => AssetKind::Image,
            Asset::File(_) => AssetKind::File,
        }
    }
    pub fn id(&self) -> &str {
        match self {
            Asset::Image(image) => &image.id,
            Asset::File(file) => &file.id,
        }
    }
    pub fn url(&self) -> &str {
        match self {
            Asset::Image(image) => &image.original_url,
            Asset::File(file) => &file.url,
        }
    }
    pub fn extension(&self) -> &str {
        match self {
            Asset::Image(image) => &image.extension,
            Asset::File(file) => &file.extension,
        }
    }
    /// Only images carry a degraded-quality fallback.
    pub fn thumbnail_url(&self) -> Option<&str> {
        match self {
            Asset::Image(image) => Some(&image.thumbnail_url),
            Asset::File(_) => None,
        }
    }
}

impl Post {
    /// Assets of the post in first-appearance order. Restricted posts and
    /// posts whose body was withheld yield nothing.
    pub fn assets(&self) -> Vec<Asset> {
        if self.is_restricted {
            return Vec::new();
        }
        match &self.body {
            Some(body) => body.assets(),
            None => Vec::new(),
        }
    }
}

impl PostBody {
    /// The first populated shape wins: flat images, then flat files, then
    /// blocks. Shapes are never merged.
    pub fn assets(&self) -> Vec<Asset> {
        if let Some(images) = &self.images {
            return images.iter().cloned().map(Asset::Image).collect();
        }

        if let Some(files) = &self.files {
            return files.iter().cloned().map(Asset::File).collect();
        }

        if let Some(blocks) = &self.blocks {
            let mut assets = Vec::new();
            for block in blocks {
                match block {
                    // A reference missing from the side-table is a defect in
                    // the payload; keep a placeholder with an empty id so
                    // ordinals stay stable and the decision engine skips it.
                    PostBlock::Image { image_id } => {
                        let image = self
                            .image_map
                            .as_ref()
                            .and_then(|map| map.get(image_id))
                            .cloned()
                            .unwrap_or_default();
                        assets.push(Asset::Image(image));
                    }
                    PostBlock::File { file_id } => {
                        let file = self
                            .file_map
                            .as_ref()
                            .and_then(|map| map.get(file_id))
                            .cloned()
                            .unwrap_or_default();
                        assets.push(Asset::File(file));
                    }
                    _ => {}
                }
            }
            return assets;
        }

        Vec::new()
    }
}

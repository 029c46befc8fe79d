use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exactly one of the flat lists or the block representation is populated,
/// depending on how the post was authored.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    pub text: Option<String>,
    pub blocks: Option<Vec<PostBlock>>,
    pub images: Option<Vec<PostImage>>,
    pub files: Option<Vec<PostFile>>,
    pub image_map: Option<BTreeMap<String, PostImage>>,
    pub file_map: Option<BTreeMap<String, PostFile>>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PostBlock {
    P {
        text: String,
    },
    Header {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image { image_id: String },
    #[serde(rename_all = "camelCase")]
    File { file_id: String },
    #[serde(rename_all = "camelCase")]
    Embed { embed_id: String },
    #[serde(rename_all = "camelCase")]
    UrlEmbed { url_embed_id: String },
    #[serde(rename_all = "camelCase")]
    Video { video_id: String },
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub id: String,
    pub extension: String,
    pub width: u32,
    pub height: u32,
    pub original_url: String,
    pub thumbnail_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostFile {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub size: u64,
    pub url: String,
}

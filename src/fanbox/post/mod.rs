pub mod body;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use body::*;

/// A post summary as it appears on a listing page.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    pub id: String,
    pub title: String,
    pub fee_required: u32,
    pub published_datetime: DateTime<Utc>,
    pub updated_datetime: DateTime<Utc>,
    pub is_restricted: bool,
    pub creator_id: String,
}

/// A full post as returned by the detail endpoint. `body` is absent when
/// the platform withholds the content from the viewer.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub fee_required: u32,
    pub published_datetime: DateTime<Utc>,
    pub updated_datetime: DateTime<Utc>,
    pub is_restricted: bool,
    pub creator_id: String,
    pub body: Option<PostBody>,
}

use std::{hash::Hash, ops::Deref};

use serde::{Deserialize, Serialize};

use super::common::User;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Creator {
    pub creator_id: String,
    pub user: User,
    pub fee: u32,
}

impl Creator {
    pub fn id(&self) -> &str {
        &self.creator_id
    }

    /// A creator requested explicitly by id, without list metadata.
    pub fn from_id(creator_id: String) -> Self {
        Creator {
            user: User {
                icon_url: None,
                name: creator_id.clone(),
                user_id: String::new(),
            },
            creator_id,
            fee: 0,
        }
    }
}

impl Deref for Creator {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl Hash for Creator {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.creator_id.hash(state);
    }
}

impl PartialEq for Creator {
    fn eq(&self, other: &Self) -> bool {
        self.creator_id == other.creator_id
    }
}

impl Eq for Creator {}

#[derive(Deserialize, Serialize, Debug, Clone, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SupportingCreator {
    pub id: String,
    pub title: String,
    pub fee: u32,
    pub user: User,
    pub creator_id: String,
}

impl From<SupportingCreator> for Creator {
    fn from(creator: SupportingCreator) -> Self {
        Creator {
            creator_id: creator.creator_id,
            user: creator.user,
            fee: creator.fee,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FollowingCreator {
    pub user: User,
    pub creator_id: String,
}

impl From<FollowingCreator> for Creator {
    fn from(creator: FollowingCreator) -> Self {
        Creator {
            creator_id: creator.creator_id,
            user: creator.user,
            fee: 0,
        }
    }
}

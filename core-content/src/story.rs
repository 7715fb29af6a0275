//! Actuals (story collections) and the stories they group.
//!
//! Banners are stories flagged with `isBanner`; they share the story
//! collection rather than having one of their own.

use crate::exercise::MediaFile;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position_text: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub is_released: bool,
    #[serde(default)]
    pub is_banner: bool,
    #[serde(default)]
    pub preview_id: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub file: Option<MediaFile>,
    #[serde(default)]
    pub preview: Option<MediaFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actuals {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub preview: Option<MediaFile>,
}

impl Actuals {
    /// Stories in display order.
    pub fn ordered_stories(&self) -> Vec<&Story> {
        let mut stories: Vec<&Story> = self.stories.iter().collect();
        stories.sort_by_key(|story| story.order);
        stories
    }

    pub fn banners(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter().filter(|story| story.is_banner)
    }
}

pub struct ActualsResource;

impl Resource for ActualsResource {
    const PATH: &'static str = "/actuals";

    type Id = i64;
    type Item = Actuals;
    type Create = Value;
    type Update = Value;
}

pub struct StoryResource;

impl Resource for StoryResource {
    const PATH: &'static str = "/story";

    type Id = i64;
    type Item = Story;
    type Create = Value;
    type Update = Value;
}

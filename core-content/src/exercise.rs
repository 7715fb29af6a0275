//! Exercise records and their request bodies.

use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseType {
    pub id: i64,
    pub name: String,
    pub code: String,
}

/// Uploaded media file referenced by exercises and stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub uuid_name: String,
    pub path: String,
    pub created_by_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Duration in seconds.
    #[serde(default)]
    pub time_count: i64,
    #[serde(default)]
    pub main_photo_id: Option<i64>,
    #[serde(default)]
    pub main_video_id: Option<i64>,
    pub type_id: i64,
    #[serde(default)]
    pub is_marathon: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub content_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub exercise_type: Option<ExerciseType>,
    #[serde(default)]
    pub main_photo: Option<MediaFile>,
    #[serde(default)]
    pub main_video: Option<MediaFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    pub title: String,
    pub description: String,
    pub type_id: i64,
    pub time_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_photo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_video_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_marathon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
}

impl CreateExerciseRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        type_id: i64,
        time_count: i64,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            type_id,
            time_count,
            main_photo_id: None,
            main_video_id: None,
            is_marathon: None,
            is_shared: None,
        }
    }
}

/// Partial update; unset fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExerciseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_photo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_video_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_marathon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
}

/// Query for the exercise list screen. Unset filters are not sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub type_id: Option<i64>,
    pub is_marathon: Option<bool>,
}

impl Default for ExerciseFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            type_id: None,
            is_marathon: None,
        }
    }
}

pub struct ExerciseResource;

impl Resource for ExerciseResource {
    const PATH: &'static str = "/exercise";

    type Id = i64;
    type Item = Exercise;
    type Create = CreateExerciseRequest;
    type Update = UpdateExerciseRequest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn media(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-01T10:00:00.000Z",
            "deletedAt": null,
            "name": "cover.jpg",
            "uuidName": "0f7c.jpg",
            "path": "/uploads/0f7c.jpg",
            "createdById": 1
        })
    }

    #[test]
    fn test_decode_full_exercise() {
        let exercise: Exercise = serde_json::from_value(json!({
            "id": 5,
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-02T08:30:00.000Z",
            "deletedAt": null,
            "title": "Plank",
            "description": "Hold still",
            "timeCount": 60,
            "mainPhotoId": 12,
            "mainVideoId": null,
            "typeId": 2,
            "isMarathon": false,
            "isShared": true,
            "contentId": 9,
            "type": { "id": 2, "name": "Video", "code": "video" },
            "mainPhoto": media(12),
            "mainVideo": null
        }))
        .unwrap();

        assert_eq!(exercise.title, "Plank");
        assert_eq!(exercise.exercise_type.unwrap().code, "video");
        assert_eq!(exercise.main_photo.unwrap().uuid_name, "0f7c.jpg");
        assert!(exercise.main_video.is_none());
        assert!(exercise.is_shared);
    }

    #[test]
    fn test_create_request_omits_unset_optionals() {
        let mut body = CreateExerciseRequest::new("Plank", "Hold still", 2, 60);
        body.is_shared = Some(true);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "title": "Plank",
                "description": "Hold still",
                "typeId": 2,
                "timeCount": 60,
                "isShared": true
            })
        );
    }

    #[test]
    fn test_update_request_is_partial() {
        let body = UpdateExerciseRequest {
            title: Some("Side plank".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "title": "Side plank" })
        );
    }

    #[test]
    fn test_filter_drops_unset_fields() {
        let filter = ExerciseFilter {
            search: Some("plank".to_string()),
            ..Default::default()
        };
        let query = core_api::QueryParams::from_serialize(&filter).unwrap();

        let mut pairs = query.pairs().to_vec();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("page".to_string(), "1".to_string()),
                ("search".to_string(), "plank".to_string()),
            ]
        );
    }
}

//! # Content Resources
//!
//! Typed CRUD clients for the console's REST collections.
//!
//! Exercises, actuals and stories are typed; modules, marathons and marathon categories
//! exchange free-form JSON since their schema is owned by the backend.
//!
//! ```ignore
//! let content = ContentClient::new(context.client().clone());
//!
//! let page = content.exercises().list(1, 20).await?;
//! let module = content.modules().get(&3).await?;
//! ```

pub mod error;
pub mod exercise;
pub mod page;
pub mod resource;
pub mod story;

pub use error::{ContentError, Result};
pub use exercise::{
    CreateExerciseRequest, Exercise, ExerciseFilter, ExerciseResource, ExerciseType, MediaFile,
    UpdateExerciseRequest,
};
pub use page::{Page, Pagination};
pub use resource::{Resource, ResourceClient};
pub use story::{Actuals, ActualsResource, Story, StoryResource};

use core_api::{ApiClient, QueryParams};
use serde_json::Value;
use std::sync::Arc;

macro_rules! json_resource {
    ($(#[$meta:meta])* $name:ident, $path:literal) => {
        $(#[$meta])*
        pub struct $name;

        impl Resource for $name {
            const PATH: &'static str = $path;

            type Id = i64;
            type Item = Value;
            type Create = Value;
            type Update = Value;
        }
    };
}

json_resource!(
    /// Training modules.
    ModuleResource,
    "/module"
);
json_resource!(
    /// Marathons (multi-day programs).
    MarathonResource,
    "/marathon"
);
json_resource!(MarathonCategoryResource, "/marathon-category");

/// One entry point for every collection, sharing a single client.
#[derive(Debug, Clone)]
pub struct ContentClient {
    client: Arc<ApiClient>,
}

impl ContentClient {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn exercises(&self) -> ResourceClient<ExerciseResource> {
        ResourceClient::new(self.client.clone())
    }

    pub fn modules(&self) -> ResourceClient<ModuleResource> {
        ResourceClient::new(self.client.clone())
    }

    pub fn marathons(&self) -> ResourceClient<MarathonResource> {
        ResourceClient::new(self.client.clone())
    }

    pub fn marathon_categories(&self) -> ResourceClient<MarathonCategoryResource> {
        ResourceClient::new(self.client.clone())
    }

    pub fn actuals(&self) -> ResourceClient<ActualsResource> {
        ResourceClient::new(self.client.clone())
    }

    /// Stories, banners included.
    pub fn stories(&self) -> ResourceClient<StoryResource> {
        ResourceClient::new(self.client.clone())
    }

    /// Exercise list with search and type filters.
    pub async fn search_exercises(&self, filter: &ExerciseFilter) -> Result<Page<Exercise>> {
        if filter.page == 0 || filter.limit == 0 {
            return Err(ContentError::InvalidPage {
                page: filter.page,
                limit: filter.limit,
            });
        }
        let query = QueryParams::from_serialize(filter)?;
        self.exercises().list_with(query).await
    }
}

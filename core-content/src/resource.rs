//! Generic CRUD client over one REST collection.
//!
//! Every collection follows the same layout:
//!
//! | Operation | Request                         |
//! |-----------|---------------------------------|
//! | list      | `GET /<path>?page=&limit=`      |
//! | get       | `GET /<path>/:id`               |
//! | create    | `POST /<path>`                  |
//! | update    | `PATCH /<path>/:id`             |
//! | delete    | `DELETE /<path>/:id`            |
//!
//! Requests go through the shared [`ApiClient`], so bearer injection and
//! refresh-on-401 apply unchanged.

use crate::error::{ContentError, Result};
use crate::page::Page;
use core_api::{decode, ApiClient, QueryParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A REST collection and the bodies it exchanges.
pub trait Resource: Send + Sync + 'static {
    /// Collection path, e.g. `/exercise`.
    const PATH: &'static str;

    type Id: Display + Send + Sync;
    type Item: DeserializeOwned + Send;
    type Create: Serialize + Send + Sync + ?Sized;
    type Update: Serialize + Send + Sync + ?Sized;
}

pub struct ResourceClient<R: Resource> {
    client: Arc<ApiClient>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("path", &R::PATH)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &R::Id) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// Lists one page. `page` and `limit` start at 1.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<R::Item>> {
        if page == 0 || limit == 0 {
            return Err(ContentError::InvalidPage { page, limit });
        }
        self.list_with(QueryParams::page(page, limit)).await
    }

    /// Lists with arbitrary query parameters (filters, search, paging).
    #[instrument(skip(self, query), fields(resource = R::PATH))]
    pub async fn list_with(&self, query: QueryParams) -> Result<Page<R::Item>> {
        let page: Page<R::Item> = self.client.get_json(R::PATH, Some(query)).await?;
        debug!(items = page.len(), total = page.total, "Listed");
        Ok(page)
    }

    #[instrument(skip(self, id), fields(resource = R::PATH, id = %id))]
    pub async fn get(&self, id: &R::Id) -> Result<R::Item> {
        Ok(self.client.get_json(&Self::item_path(id), None).await?)
    }

    #[instrument(skip(self, body), fields(resource = R::PATH))]
    pub async fn create(&self, body: &R::Create) -> Result<R::Item> {
        let item = self.client.post_json(R::PATH, body).await?;
        debug!("Created");
        Ok(item)
    }

    /// Partial update; only the fields present in `body` change.
    #[instrument(skip(self, id, body), fields(resource = R::PATH, id = %id))]
    pub async fn update(&self, id: &R::Id, body: &R::Update) -> Result<R::Item> {
        let item = self.client.patch_json(&Self::item_path(id), body).await?;
        debug!("Updated");
        Ok(item)
    }

    /// Deletes one item. The backend's response body, if any, is returned
    /// as JSON (`Null` when empty).
    #[instrument(skip(self, id), fields(resource = R::PATH, id = %id))]
    pub async fn delete(&self, id: &R::Id) -> Result<serde_json::Value> {
        let response = self.client.delete(&Self::item_path(id)).await?;
        debug!("Deleted");

        if response.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(decode(&response)?)
    }
}

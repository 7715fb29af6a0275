//! Paginated list responses.
//!
//! List endpoints answer either
//! `{data: [...], pagination: {totalElements, perPage, page}}`, `{data, total}`
//! or a bare array. All three decode into [`Page`].

use serde::{Deserialize, Deserializer, Serialize};

/// Pagination block returned next to `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_elements: u64,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole collection; the page length when the backend
    /// did not say.
    pub total: u64,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether pages after this one exist, when the backend reported enough
    /// to tell.
    pub fn has_more(&self) -> Option<bool> {
        let page = u64::from(self.page?);
        let per_page = u64::from(self.per_page?);
        Some(page * per_page < self.total)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Wrapped {
        data: Vec<T>,
        #[serde(default)]
        pagination: Option<Pagination>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPage::deserialize(deserializer)? {
            RawPage::Wrapped {
                data,
                pagination,
                total,
            } => {
                let total = pagination
                    .map(|p| p.total_elements)
                    .or(total)
                    .unwrap_or(data.len() as u64);
                Page {
                    total,
                    page: pagination.and_then(|p| p.page),
                    per_page: pagination.and_then(|p| p.per_page),
                    items: data,
                }
            }
            RawPage::Bare(items) => Page {
                total: items.len() as u64,
                page: None,
                per_page: None,
                items,
            },
        })
    }
}

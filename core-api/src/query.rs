//! Query-string encoding.
//!
//! Arrays are flattened into repeated keys (`tags=a&tags=b`), never
//! `tags[]=a` or `tags[0]=a`. `null` values are dropped.

use crate::error::{ApiError, Result};
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

/// Ordered list of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single `key=value` pair.
    pub fn push(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Appends `key=value` only when `value` is present.
    pub fn push_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Appends one `key=value` pair per item.
    pub fn push_all<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let key = key.into();
        for value in values {
            self.pairs.push((key.clone(), value.to_string()));
        }
        self
    }

    /// Pagination parameters used by every list endpoint.
    pub fn page(page: u32, limit: u32) -> Self {
        Self::new().push("page", page).push("limit", limit)
    }

    /// Builds parameters from any value serializing to a JSON object.
    ///
    /// ```
    /// use core_api::QueryParams;
    /// use serde_json::json;
    ///
    /// let query = QueryParams::from_serialize(&json!({
    ///     "tags": ["a", "b"],
    ///     "typeId": null,
    ///     "isShared": true,
    /// }))
    /// .unwrap();
    ///
    /// let encoded = query.encode();
    /// assert!(encoded.contains("tags=a&tags=b"));
    /// assert!(encoded.contains("isShared=true"));
    /// assert!(!encoded.contains("typeId"));
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let object = match serde_json::to_value(value)? {
            Value::Object(object) => object,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(ApiError::Serialization(format!(
                    "query parameters must serialize to an object, got {}",
                    other
                )))
            }
        };

        let mut query = Self::new();
        for (key, value) in object {
            query.extend_value(&key, value)?;
        }
        Ok(query)
    }

    fn extend_value(&mut self, key: &str, value: Value) -> Result<()> {
        match value {
            Value::Null => {}
            Value::Bool(flag) => self.pairs.push((key.to_string(), flag.to_string())),
            Value::Number(number) => self.pairs.push((key.to_string(), number.to_string())),
            Value::String(text) => self.pairs.push((key.to_string(), text)),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Array(_) | Value::Object(_) => {
                            return Err(ApiError::Serialization(format!(
                                "nested value in query parameter '{}'",
                                key
                            )))
                        }
                        scalar => self.extend_value(key, scalar)?,
                    }
                }
            }
            Value::Object(_) => {
                return Err(ApiError::Serialization(format!(
                    "object value in query parameter '{}'",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Appends every pair of `other`.
    pub fn merge(mut self, other: QueryParams) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Form-urlencoded string without the leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.to_string()))
                .collect(),
        }
    }
}

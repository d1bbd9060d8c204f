//! Pagination envelope
//!
//! List endpoints answer with `{ "<collection>": [...], "meta": {...} }`,
//! where the collection key differs per resource. [`Page::from_envelope`]
//! peels that key off so every list call yields the same `(items, meta)`
//! shape. Following `meta.links.next` is left to the caller.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Pagination metadata of one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Total number of items across all pages
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
}

/// Cursors to neighbouring pages. The API sends `""` when there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub next: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub prev: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Meta,
}

impl<T: DeserializeOwned> Page<T> {
    /// Decode a list response whose items sit under `collection`.
    ///
    /// A missing collection key is a decode error, `null` is an empty list
    /// and a missing `meta` yields [`Meta::default`].
    pub fn from_envelope(body: Value, collection: &str) -> Result<Self> {
        let mut envelope = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::Decode {
                    message: format!("expected an object holding {:?}", collection),
                    body: crate::http::sanitize_for_log(&other.to_string()),
                })
            }
        };

        let items = match envelope.remove(collection) {
            Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value(raw).map_err(|e| Error::Decode {
                message: format!("invalid {:?} array: {}", collection, e),
                body: String::new(),
            })?,
            None => {
                let keys: Vec<&str> = envelope.keys().map(String::as_str).collect();
                return Err(Error::Decode {
                    message: format!("missing {:?} in list response", collection),
                    body: format!("keys: {:?}", keys),
                });
            }
        };

        let meta = match envelope.remove("meta") {
            None | Some(Value::Null) => Meta::default(),
            Some(raw) => serde_json::from_value(raw).map_err(|e| Error::Decode {
                message: format!("invalid meta: {}", e),
                body: String::new(),
            })?,
        };

        Ok(Self { items, meta })
    }
}

impl<T> Page<T> {
    /// Cursor of the following page, if any
    pub fn next_cursor(&self) -> Option<&str> {
        self.meta.links.next.as_deref()
    }

    /// Cursor of the preceding page, if any
    pub fn prev_cursor(&self) -> Option<&str> {
        self.meta.links.prev.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.meta.links.next.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, Meta) {
        (self.items, self.meta)
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

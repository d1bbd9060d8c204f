//! Query encoding
//!
//! Turns option structs into URL query strings. Each present field becomes
//! one `key=value` pair in declaration order; absent fields are left out.

use crate::pagination::Meta;

/// Options that contribute query parameters to a request
pub trait QueryParams {
    /// Pairs for every present field, in a stable order
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

impl<T: QueryParams + ?Sized> QueryParams for &T {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        (**self).query_pairs()
    }
}

impl<T: QueryParams> QueryParams for Option<T> {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.as_ref().map(T::query_pairs).unwrap_or_default()
    }
}

/// Encode pairs as `k=v&k=v`, percent-encoding keys and values.
/// Repeated keys are emitted as given.
pub fn encode_query(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append encoded options to `path`. No `?` is added when nothing is set.
pub fn with_query(path: &str, params: &impl QueryParams) -> String {
    let query = encode_query(&params.query_pairs());
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

/// Cursor pagination options for list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page size requested from the server
    pub per_page: Option<u32>,
    /// Opaque cursor taken from a previous page's links
    pub cursor: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Options for the page after `meta`, or `None` on the last page.
    /// The page size is carried over.
    pub fn next_page(&self, meta: &Meta) -> Option<Self> {
        meta.links.next.as_ref().map(|cursor| Self {
            per_page: self.per_page,
            cursor: Some(cursor.clone()),
        })
    }
}

impl QueryParams for ListOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.clone()));
        }
        pairs
    }
}

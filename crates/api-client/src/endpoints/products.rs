//! Products collection endpoints
//!
//! Thin facade over the client core for the CMS `/items/<collection>`
//! surface: list/detail/query operations plus the option-to-query-map
//! translation. Records come back as raw JSON values; field normalization
//! into a public product shape belongs to the consuming layer.

use crate::client::ShopfrontClient;
use crate::error::{ApiError, ApiResult, Envelope};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Default CMS collection name
const DEFAULT_COLLECTION: &str = "Products";

/// Path-segment encoding: everything but RFC 3986 unreserved characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Options for collection queries
///
/// `filter` is passed through untouched and is assumed to already be in the
/// CMS filter grammar; the remaining fields are flattened into query
/// parameters only when present.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// CMS filter object, e.g. `{"status": {"_eq": "published"}}`
    pub filter: Option<Value>,
    /// Field projection
    pub fields: Option<Vec<String>>,
    /// Sort keys, e.g. `["-date_created", "name"]`
    pub sort: Option<Vec<String>>,
    /// Page size
    pub limit: Option<u32>,
    /// 1-based page number
    pub page: Option<u32>,
    /// Full-text search term
    pub search: Option<String>,
}

impl ProductQuery {
    /// Create empty query options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CMS filter object (passed through untouched)
    #[must_use]
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the field projection
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the sort keys
    #[must_use]
    pub fn with_sort<I, S>(mut self, sort: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = Some(sort.into_iter().map(Into::into).collect());
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the full-text search term
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Flatten the recognized options into a query map, in the parameter
    /// order the CMS documents: filter, fields, sort, limit, page, search.
    pub(crate) fn to_query(&self) -> Map<String, Value> {
        let mut query = Map::new();

        if let Some(filter) = &self.filter {
            query.insert("filter".to_string(), filter.clone());
        }
        if let Some(fields) = &self.fields {
            if !fields.is_empty() {
                query.insert("fields".to_string(), Value::String(fields.join(",")));
            }
        }
        if let Some(sort) = &self.sort {
            if !sort.is_empty() {
                query.insert("sort".to_string(), Value::String(sort.join(",")));
            }
        }
        if let Some(limit) = self.limit {
            query.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(page) = self.page {
            query.insert("page".to_string(), Value::from(page));
        }
        if let Some(search) = &self.search {
            if !search.is_empty() {
                query.insert("search".to_string(), Value::String(search.clone()));
            }
        }

        query
    }
}

/// Products API interface
#[derive(Clone)]
pub struct ProductsApi {
    client: ShopfrontClient,
    collection_path: String,
}

impl ProductsApi {
    /// Create a products interface over the default collection
    pub(crate) fn new(client: ShopfrontClient) -> Self {
        Self::with_collection(client, DEFAULT_COLLECTION)
    }

    /// Create a products interface over a specific collection
    #[must_use]
    pub fn with_collection(client: ShopfrontClient, collection: &str) -> Self {
        Self {
            client,
            collection_path: format!("/items/{collection}"),
        }
    }

    /// List products matching the given options
    ///
    /// The returned `data` is always an array: a successful non-array
    /// payload coerces to an empty list so callers can iterate blindly.
    pub async fn list(&self, options: &ProductQuery) -> ApiResult<Vec<Value>> {
        let envelope = self
            .client
            .get(&self.collection_path, options.to_query())
            .await?;

        let items = match envelope.data {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        Ok(Envelope::with_meta(items, envelope.meta))
    }

    /// Alias for [`ProductsApi::list`], kept for call-site clarity
    pub async fn query(&self, options: &ProductQuery) -> ApiResult<Vec<Value>> {
        self.list(options).await
    }

    /// Fetch a single record by id, with an optional field projection
    ///
    /// An empty or blank id fails with a validation error before any
    /// transport activity.
    pub async fn detail(&self, id: &str, fields: &[String]) -> ApiResult<Value> {
        if id.trim().is_empty() {
            return Err(ApiError::validation("product id must not be empty"));
        }

        let mut query = Map::new();
        if !fields.is_empty() {
            query.insert("fields".to_string(), Value::String(fields.join(",")));
        }

        let encoded = utf8_percent_encode(id, PATH_SEGMENT).to_string();
        let path = format!("{}/{encoded}", self.collection_path);
        self.client.get(&path, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::serialize_query;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let options = ProductQuery::new()
            .with_filter(json!({"status": {"_eq": "published"}}))
            .with_fields(["id", "slug"])
            .with_limit(20)
            .with_page(2)
            .with_search("bread");

        assert_eq!(options.limit, Some(20));
        assert_eq!(options.page, Some(2));
        assert_eq!(options.fields, Some(vec!["id".to_string(), "slug".to_string()]));
    }

    #[test]
    fn test_to_query_parameter_order() {
        let options = ProductQuery::new()
            .with_search("jam")
            .with_limit(5)
            .with_filter(json!({"status": {"_eq": "published"}}));

        // Parameter order is fixed regardless of builder call order.
        assert_eq!(
            serialize_query(&options.to_query()),
            "filter%5Bstatus%5D%5B_eq%5D=published&limit=5&search=jam"
        );
    }

    #[test]
    fn test_to_query_skips_empty_options() {
        let options = ProductQuery::new()
            .with_fields(Vec::<String>::new())
            .with_sort(Vec::<String>::new())
            .with_search("");
        assert!(options.to_query().is_empty());
    }

    #[test]
    fn test_to_query_joins_fields_and_sort() {
        let options = ProductQuery::new()
            .with_fields(["id", "name"])
            .with_sort(["-date_created", "name"]);
        let query = options.to_query();
        assert_eq!(query["fields"], json!("id,name"));
        assert_eq!(query["sort"], json!("-date_created,name"));
    }
}

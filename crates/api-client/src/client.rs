//! Main API client implementation
//!
//! Builds requests (URL, query string, auth headers, body encoding),
//! dispatches them through the injected [`Transport`] and classifies every
//! outcome into the uniform [`ApiResult`] envelope. The client performs
//! local classification only: no retries, no timeouts of its own, and no
//! failure ever escapes as a panic. `retryable` on returned errors is
//! advisory metadata for caller-side policy.

use crate::config::ClientConfig;
use crate::endpoints::ProductsApi;
use crate::error::{ApiError, ApiResult, Envelope};
use crate::query::serialize_query;
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Fixed path of the CMS GraphQL endpoint
const GRAPHQL_PATH: &str = "/graphql";

/// Request body passed to [`ShopfrontClient::request`]
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// JSON-encoded on dispatch; sets `Content-Type: application/json`
    /// unless the caller supplied its own content type
    Json(Value),
    /// Pre-encoded bytes passed through untouched (uploads, multipart);
    /// no content type is injected
    Raw(Vec<u8>),
}

/// Per-request options for [`ShopfrontClient::request`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query map, serialized in insertion order
    pub query: Map<String, Value>,
    /// Caller header overrides, merged over the defaults
    pub headers: HeaderMap,
    /// Optional request body
    pub body: Option<RequestBody>,
}

/// GraphQL request envelope posted to `/graphql`
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphqlRequest {
    /// The GraphQL document
    pub query: String,
    /// Optional variables object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    /// Optional operation name
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

/// Shopfront CMS API client
///
/// Immutable after construction (configuration and transport live behind
/// `Arc`s), so clones are cheap and arbitrarily many requests may be in
/// flight concurrently without coordination.
#[derive(Clone)]
pub struct ShopfrontClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl ShopfrontClient {
    /// Create a client with the default reqwest-backed transport
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.timeout)
            .map_err(|err| ApiError::config(format!("failed to build HTTP transport: {err}")))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client with an injected transport
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Access product collection endpoints
    #[must_use]
    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Verb helpers
    // -------------------------------------------------------------------------

    /// Perform a GET request with a query map
    pub async fn get(&self, path: &str, query: Map<String, Value>) -> ApiResult<Value> {
        let options = RequestOptions {
            query,
            ..Default::default()
        };
        self.request(Method::GET, path, options).await
    }

    /// Perform a POST request with a JSON body
    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        let options = RequestOptions {
            body: Some(RequestBody::Json(body)),
            ..Default::default()
        };
        self.request(Method::POST, path, options).await
    }

    /// Perform a PATCH request with a JSON body
    pub async fn patch(&self, path: &str, body: Value) -> ApiResult<Value> {
        let options = RequestOptions {
            body: Some(RequestBody::Json(body)),
            ..Default::default()
        };
        self.request(Method::PATCH, path, options).await
    }

    /// Perform a DELETE request
    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, path, RequestOptions::default())
            .await
    }

    /// Issue a GraphQL request through the regular pipeline
    ///
    /// Classification considers only the HTTP status; a GraphQL error array
    /// inside a 200 response is returned as-is in the unwrapped payload, and
    /// callers that need to detect in-band errors must inspect it themselves.
    pub async fn graphql(&self, request: GraphqlRequest) -> ApiResult<Value> {
        let body = serde_json::to_value(&request)
            .map_err(|err| ApiError::validation(format!("graphql request not encodable: {err}")))?;
        self.post(GRAPHQL_PATH, body).await
    }

    // -------------------------------------------------------------------------
    // Central request pipeline
    // -------------------------------------------------------------------------

    /// Build, dispatch and classify one request
    ///
    /// Every verb helper and the GraphQL helper delegates here. The only
    /// suspension points are token resolution and the transport call; between
    /// them execution is synchronous and no shared state is mutated.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        // Config short-circuit: no base URL means no network activity at all.
        let Some(base_url) = self.config.base_url() else {
            return Err(ApiError::config("no base URL configured"));
        };

        let token = match &self.config.token {
            Some(source) => source.resolve().await,
            None => None,
        };

        let request_id = Uuid::new_v4().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
        headers.extend(options.headers);

        let body = match options.body {
            Some(RequestBody::Json(value)) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                let encoded = serde_json::to_vec(&value).map_err(|err| {
                    ApiError::validation(format!("request body not encodable: {err}"))
                })?;
                Some(encoded)
            }
            Some(RequestBody::Raw(bytes)) => Some(bytes),
            None => None,
        };

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::config("token is not a valid header value"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut url = if path.starts_with('/') {
            format!("{base_url}{path}")
        } else {
            format!("{base_url}/{path}")
        };
        let query_string = serialize_query(&options.query);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            "dispatching request"
        );

        let outcome = self
            .transport
            .send(TransportRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    url = %url,
                    error = %err,
                    "transport call failed"
                );
                return Err(ApiError::network(
                    err.message.clone(),
                    Some(Value::String(err.message)),
                ));
            }
        };

        classify_response(response)
    }
}

/// Decode and classify a raw response
fn classify_response(response: TransportResponse) -> ApiResult<Value> {
    let status = response.status;
    let payload = decode_body(&response).map_err(|err| {
        ApiError::parse(status, Some(Value::String(err.to_string())))
    })?;

    if (200..300).contains(&status) {
        return Ok(unwrap_payload(payload));
    }
    Err(classify_failure(status, payload))
}

/// Decode the body by content-type sniff: JSON media types parse as JSON,
/// everything else is carried as `{"raw": text}` (empty text becomes `{}`).
fn decode_body(response: &TransportResponse) -> Result<Value, serde_json::Error> {
    let is_json = response
        .content_type()
        .is_some_and(|content_type| content_type.contains("json"));

    if is_json {
        return serde_json::from_slice(&response.body);
    }

    let text = String::from_utf8_lossy(&response.body);
    if text.is_empty() {
        Ok(json!({}))
    } else {
        Ok(json!({ "raw": text }))
    }
}

/// Unwrap the CMS `{data, meta}` envelope; payloads without a `data` key are
/// carried whole.
fn unwrap_payload(payload: Value) -> Envelope<Value> {
    match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            let data = map.remove("data").unwrap_or(Value::Null);
            let meta = map.remove("meta").filter(|meta| !meta.is_null());
            Envelope::with_meta(data, meta)
        }
        other => Envelope::new(other),
    }
}

/// Classify a non-2xx response: a structured `errors` array or `error` field
/// means the CMS spoke, otherwise it is a bare HTTP failure.
fn classify_failure(status: u16, payload: Value) -> ApiError {
    let entry = payload
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .cloned()
        .or_else(|| payload.get("error").cloned());

    match entry {
        Some(entry) => {
            let message = entry
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            let code = entry
                .pointer("/extensions/code")
                .or_else(|| entry.get("code"))
                .and_then(Value::as_str)
                .map(str::to_string);
            ApiError::api(status, message, code, Some(entry))
        }
        None => ApiError::http(status, Some(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_unwrap_payload_with_data_and_meta() {
        let envelope = unwrap_payload(json!({
            "data": [{"id": 1}],
            "meta": {"filter_count": 1}
        }));
        assert_eq!(envelope.data, json!([{"id": 1}]));
        assert_eq!(envelope.meta, Some(json!({"filter_count": 1})));
    }

    #[test]
    fn test_unwrap_payload_without_data_key() {
        let envelope = unwrap_payload(json!({"status": "ok"}));
        assert_eq!(envelope.data, json!({"status": "ok"}));
        assert_eq!(envelope.meta, None);
    }

    #[test]
    fn test_unwrap_payload_null_meta_dropped() {
        let envelope = unwrap_payload(json!({"data": {"id": 7}, "meta": null}));
        assert_eq!(envelope.meta, None);
    }

    #[test]
    fn test_classify_failure_structured_errors_array() {
        let err = classify_failure(
            400,
            json!({"errors": [{"message": "bad filter", "extensions": {"code": "INVALID_QUERY"}}]}),
        );
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "bad filter");
        assert_eq!(err.code.as_deref(), Some("INVALID_QUERY"));
        assert!(!err.retryable);
    }

    #[test]
    fn test_classify_failure_error_field_with_code() {
        let err = classify_failure(
            422,
            json!({"error": {"message": "nope", "code": "UNPROCESSABLE"}}),
        );
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.code.as_deref(), Some("UNPROCESSABLE"));
    }

    #[test]
    fn test_classify_failure_unstructured_payload() {
        let err = classify_failure(400, json!({"raw": "Bad Request"}));
        assert_eq!(err.kind, ErrorKind::Http);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "request failed with status 400");
    }

    #[test]
    fn test_classify_failure_5xx_is_retryable() {
        let err = classify_failure(503, json!({"errors": [{"message": "down"}]}));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(err.retryable);

        let err = classify_failure(502, json!({}));
        assert_eq!(err.kind, ErrorKind::Http);
        assert!(err.retryable);
    }

    #[test]
    fn test_classify_failure_empty_errors_array_is_http() {
        let err = classify_failure(400, json!({"errors": []}));
        assert_eq!(err.kind, ErrorKind::Http);
    }

    #[test]
    fn test_decode_body_non_json_wrapped_as_raw() {
        let response = TransportResponse::text(200, "text/html", "<h1>hi</h1>");
        let payload = decode_body(&response).expect("decodes");
        assert_eq!(payload, json!({"raw": "<h1>hi</h1>"}));
    }

    #[test]
    fn test_decode_body_empty_non_json_is_empty_object() {
        let response = TransportResponse::text(204, "text/plain", "");
        let payload = decode_body(&response).expect("decodes");
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn test_decode_body_invalid_json_fails() {
        let response = TransportResponse::text(200, "application/json", "{not json");
        assert!(decode_body(&response).is_err());
    }

    #[test]
    fn test_graphql_request_serialization() {
        let request = GraphqlRequest {
            query: "{ products { id } }".to_string(),
            variables: Some(json!({"limit": 3})),
            operation_name: Some("Products".to_string()),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["query"], "{ products { id } }");
        assert_eq!(value["variables"], json!({"limit": 3}));
        assert_eq!(value["operationName"], "Products");

        let bare = GraphqlRequest {
            query: "{ ping }".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&bare).expect("serialize");
        assert!(value.get("variables").is_none());
        assert!(value.get("operationName").is_none());
    }
}

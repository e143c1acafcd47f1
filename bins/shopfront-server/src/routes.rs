//! HTTP surface and status-code mapping
//!
//! The public contract stays envelope-shaped: success bodies are
//! `{"data": ..., "meta": ...}`, failures are `{"error": ApiError}` with the
//! HTTP status derived from the error kind. The CMS client never produces
//! `not_found`; the slug route is the one place that raises it.

use crate::mapping::{self, Product};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use shopfront_api_client::{ApiError, ErrorKind, ProductQuery};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(list_products))
        .route("/api/products/:slug", get(product_by_slug))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

/// Query parameters accepted by `GET /api/products`
///
/// `filter` arrives as a JSON-encoded string because nested objects do not
/// survive flat query strings on this side of the boundary.
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    filter: Option<String>,
    fields: Option<String>,
    sort: Option<String>,
    limit: Option<u32>,
    page: Option<u32>,
    search: Option<String>,
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let query = match build_query(&params) {
        Ok(query) => query,
        Err(error) => return error_response(&error),
    };

    match state.products.list(&query).await {
        Ok(page) => {
            let products: Vec<Product> = page
                .data
                .iter()
                .map(|record| mapping::map_product(record, state.asset_base.as_deref()))
                .collect();
            debug!(count = products.len(), "serving product list");
            success_response(json!(products), page.meta)
        }
        Err(error) => error_response(&error),
    }
}

async fn product_by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let query = ProductQuery::new()
        .with_filter(json!({"slug": {"_eq": slug}}))
        .with_limit(1);

    match state.products.list(&query).await {
        Ok(page) => match page.data.first() {
            Some(record) => {
                let product = mapping::map_product(record, state.asset_base.as_deref());
                success_response(json!(product), None)
            }
            // An empty result is this layer's not-found, not a CMS error.
            None => error_response(&ApiError::not_found(format!(
                "no product with slug '{slug}'"
            ))),
        },
        Err(error) => error_response(&error),
    }
}

fn build_query(params: &ListParams) -> Result<ProductQuery, ApiError> {
    let mut query = ProductQuery::new();

    if let Some(raw) = &params.filter {
        let filter: Value = serde_json::from_str(raw)
            .map_err(|err| ApiError::validation(format!("filter must be valid JSON: {err}")))?;
        query = query.with_filter(filter);
    }
    if let Some(fields) = &params.fields {
        query = query.with_fields(split_csv(fields));
    }
    if let Some(sort) = &params.sort {
        query = query.with_sort(split_csv(sort));
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }
    if let Some(page) = params.page {
        query = query.with_page(page);
    }
    if let Some(search) = &params.search {
        query = query.with_search(search.clone());
    }

    Ok(query)
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn success_response(data: Value, meta: Option<Value>) -> Response {
    (StatusCode::OK, Json(json!({"data": data, "meta": meta}))).into_response()
}

fn error_response(error: &ApiError) -> Response {
    (status_for(error), Json(json!({"error": error}))).into_response()
}

/// Map the error taxonomy onto HTTP statuses; kinds carrying a remote status
/// pass it through, everything else degrades to 502.
fn status_for(error: &ApiError) -> StatusCode {
    match error.kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Network => StatusCode::BAD_GATEWAY,
        ErrorKind::Api | ErrorKind::Http | ErrorKind::Parse => error
            .status
            .and_then(|status| StatusCode::from_u16(status).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
    }
}

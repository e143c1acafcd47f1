//! Field normalization from raw CMS records to the public product shape
//!
//! CMS collections accumulate heterogeneous field names over time; this
//! module is the one place that knows the fallback chains. Everything here
//! is pure: a record in, a [`Product`] out, no I/O.

use serde::Serialize;
use serde_json::Value;

/// Public product shape exposed by the storefront API
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Stable record identifier
    pub id: String,
    /// URL slug; falls back to the id when the record carries none
    pub slug: String,
    /// Display name
    pub name: String,
    /// Long description, if any
    pub description: Option<String>,
    /// Unit price; `None` when the record has no parseable price
    pub price: Option<f64>,
    /// Availability label as the CMS reports it
    pub availability: Option<String>,
    /// Absolute image URLs, original order preserved
    pub images: Vec<String>,
}

/// Normalize one raw CMS record into the public product shape
///
/// `asset_base` resolves relative image references (bare asset ids or
/// paths); entries that resolve to nothing are dropped.
pub fn map_product(record: &Value, asset_base: Option<&str>) -> Product {
    let id = first_string(record, &["id", "uuid"]).unwrap_or_default();
    let slug = first_string(record, &["slug", "handle"]).unwrap_or_else(|| id.clone());
    let name = first_string(record, &["name", "title", "product_name"]).unwrap_or_default();
    let description = first_string(record, &["description", "summary"]);
    let availability = first_string(record, &["availability", "status", "stock_status"]);

    Product {
        id,
        slug,
        name,
        description,
        price: extract_price(record),
        availability,
        images: extract_images(record, asset_base),
    }
}

/// First non-empty string (or stringified number) among the given keys
fn first_string(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Price fallback chain: `price`, `amount`, then `price_cents` divided by 100.
/// Numbers and numeric strings both count; anything else is `None`.
fn extract_price(record: &Value) -> Option<f64> {
    for key in ["price", "amount"] {
        if let Some(price) = numeric(record.get(key)) {
            return Some(price);
        }
    }
    numeric(record.get("price_cents")).map(|cents| cents / 100.0)
}

fn numeric(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Collect image URLs from `images` or `gallery`, keeping order
///
/// Entries may be plain strings or objects carrying `url`, `src` or `image`.
/// Relative references resolve against `asset_base`; without one they drop.
fn extract_images(record: &Value, asset_base: Option<&str>) -> Vec<String> {
    let entries = ["images", "gallery"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_array));

    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| image_reference(entry))
        .filter_map(|reference| resolve_url(&reference, asset_base))
        .collect()
}

fn image_reference(entry: &Value) -> Option<String> {
    match entry {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Object(_) => ["url", "src", "image"].iter().find_map(|key| {
            entry
                .get(*key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        }),
        _ => None,
    }
}

fn resolve_url(reference: &str, asset_base: Option<&str>) -> Option<String> {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(reference.to_string());
    }
    asset_base.map(|base| {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            reference.trim_start_matches('/')
        )
    })
}

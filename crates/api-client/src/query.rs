//! Query-string serialization for CMS collection endpoints
//!
//! The CMS filter grammar uses bracket notation (`filter[status][_eq]`),
//! arrays are flattened to comma-joined values (`fields=id,slug,name`) and
//! parameter order follows the insertion order of the input map. `serde_json`
//! is built with `preserve_order` so `Map` iteration is insertion-ordered.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Serialize a query map to a URL-encoded query string (no leading `?`).
///
/// Null values are skipped, empty arrays are skipped entirely, non-empty
/// arrays serialize as a single comma-joined parameter, and nested objects
/// flatten to bracket-notation keys to arbitrary depth. Always succeeds;
/// an empty map yields `""`.
#[must_use]
pub fn serialize_query(query: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    collect_pairs(query, None, &mut pairs);

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn collect_pairs(map: &Map<String, Value>, prefix: Option<&str>, pairs: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let composite = match prefix {
            Some(prefix) => format!("{prefix}[{key}]"),
            None => key.clone(),
        };

        match value {
            Value::Null => {}
            Value::Array(items) => {
                if items.is_empty() {
                    continue;
                }
                let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(",");
                pairs.push((composite, joined));
            }
            Value::Object(nested) => collect_pairs(nested, Some(&composite), pairs),
            scalar => pairs.push((composite, scalar_text(scalar))),
        }
    }
}

/// Render a scalar the way it appears on the wire: strings without JSON
/// quotes, everything else via its JSON representation.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query_of(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(serialize_query(&Map::new()), "");
    }

    #[test]
    fn test_scalars_in_insertion_order() {
        let query = query_of(json!({"limit": 10, "page": 2, "search": "bread"}));
        assert_eq!(serialize_query(&query), "limit=10&page=2&search=bread");
    }

    #[test]
    fn test_null_values_skipped() {
        let query = query_of(json!({"limit": 1, "search": null}));
        assert_eq!(serialize_query(&query), "limit=1");
    }

    #[test]
    fn test_arrays_comma_joined() {
        let query = query_of(json!({"fields": ["id", "slug", "name"]}));
        assert_eq!(serialize_query(&query), "fields=id%2Cslug%2Cname");
    }

    #[test]
    fn test_empty_array_skipped_entirely() {
        let query = query_of(json!({"fields": [], "limit": 5}));
        assert_eq!(serialize_query(&query), "limit=5");
    }

    #[test]
    fn test_nested_filter_bracket_notation() {
        let query = query_of(json!({"filter": {"status": {"_eq": "published"}}, "limit": 1}));
        assert_eq!(
            serialize_query(&query),
            "filter%5Bstatus%5D%5B_eq%5D=published&limit=1"
        );
    }

    #[test]
    fn test_deep_nesting() {
        let query = query_of(json!({"filter": {"_and": {"price": {"_gte": 10}}}}));
        assert_eq!(
            serialize_query(&query),
            "filter%5B_and%5D%5Bprice%5D%5B_gte%5D=10"
        );
    }

    #[test]
    fn test_percent_encoding_of_values() {
        let query = query_of(json!({"search": "fresh bread & jam"}));
        assert_eq!(serialize_query(&query), "search=fresh+bread+%26+jam");
    }

    #[test]
    fn test_booleans_and_numbers_stringified() {
        let query = query_of(json!({"deep": {"archived": false}, "limit": 2.5}));
        assert_eq!(serialize_query(&query), "deep%5Barchived%5D=false&limit=2.5");
    }

    #[test]
    fn test_array_inside_nested_object() {
        let query = query_of(json!({"filter": {"status": {"_in": ["published", "draft"]}}}));
        assert_eq!(
            serialize_query(&query),
            "filter%5Bstatus%5D%5B_in%5D=published%2Cdraft"
        );
    }
}

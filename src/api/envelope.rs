//! Response envelope normalization
//!
//! The backend wraps payloads as `{ success, data?, message? }`, and list
//! payloads arrive in several shapes. Every shape is resolved here so callers
//! only ever see `T` or `Page<T>`.

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            pagination: None,
        }
    }
}

/// `message` (or `error`) from an error body
pub fn server_message(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}

/// Strip the envelope. Bodies without a `success` flag are taken as data.
pub fn unwrap_data(body: Value, url: &str) -> Result<Value, ApiError> {
    match body {
        Value::Object(mut obj) if obj.get("success").map_or(false, Value::is_boolean) => {
            if obj.get("success") == Some(&Value::Bool(false)) {
                let message = server_message(&Value::Object(obj));
                return Err(ApiError {
                    kind: crate::error::ErrorKind::Generic,
                    status: None,
                    message: message
                        .unwrap_or_else(|| "The server reported a failure".to_string()),
                    url: url.to_string(),
                });
            }
            Ok(obj.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

pub fn decode_item<T: DeserializeOwned>(body: Value, url: &str) -> Result<T, ApiError> {
    let data = unwrap_data(body, url)?;
    serde_json::from_value(data).map_err(|e| ApiError::malformed(url, e))
}

pub fn decode_page<T: DeserializeOwned>(body: Value, url: &str) -> Result<Page<T>, ApiError> {
    let data = unwrap_data(body, url)?;
    let (items, pagination) = split_list(data, url)?;
    let items = serde_json::from_value(Value::Array(items)).map_err(|e| ApiError::malformed(url, e))?;
    Ok(Page { items, pagination })
}

fn split_list(data: Value, url: &str) -> Result<(Vec<Value>, Option<Pagination>), ApiError> {
    match data {
        Value::Array(items) => Ok((items, None)),
        Value::Null => Ok((Vec::new(), None)),
        Value::Object(mut obj) => {
            let items = ["data", "items", "results"]
                .iter()
                .find_map(|key| match obj.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    Some(other) => {
                        obj.insert(key.to_string(), other);
                        None
                    }
                    None => None,
                })
                .ok_or_else(|| ApiError::malformed(url, "list payload has no item array"))?;

            let pagination = match obj.get("pagination") {
                Some(Value::Object(inner)) => pagination_from(inner),
                _ => pagination_from(&obj),
            };
            Ok((items, pagination))
        }
        other => Err(ApiError::malformed(
            url,
            format!("expected a list, got {}", type_name(&other)),
        )),
    }
}

fn pagination_from(obj: &Map<String, Value>) -> Option<Pagination> {
    let number = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_u64));
    // Out-of-range counts are treated as absent rather than truncated
    let small = |keys: &[&str]| number(keys).and_then(|n| u32::try_from(n).ok());

    let page = small(&["page", "currentPage"]);
    let limit = small(&["limit", "perPage", "pageSize"]);
    let total = number(&["total", "totalItems", "count"]);
    let total_pages = small(&["totalPages", "pages", "total_pages"]);

    if page.is_none() && limit.is_none() && total.is_none() && total_pages.is_none() {
        return None;
    }

    let limit = limit.unwrap_or(0);
    let total = total.unwrap_or(0);
    let total_pages = total_pages.unwrap_or_else(|| {
        if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        }
    });

    Some(Pagination {
        page: page.unwrap_or(1),
        limit,
        total,
        total_pages,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Blog {
        id: String,
    }

    #[test]
    fn test_plain_envelope() {
        let blog: Blog = decode_item(json!({"success": true, "data": {"id": "b1"}}), "/blogs/b1").unwrap();
        assert_eq!(blog, Blog { id: "b1".to_string() });
    }

    #[test]
    fn test_failed_envelope_carries_message() {
        let err = unwrap_data(json!({"success": false, "message": "Slug taken"}), "/blogs").unwrap_err();
        assert_eq!(err.message, "Slug taken");
        assert_eq!(err.url, "/blogs");
    }

    #[test]
    fn test_list_shapes_normalize() {
        let shapes = [
            json!({"success": true, "data": [{"id": "1"}, {"id": "2"}]}),
            json!([{"id": "1"}, {"id": "2"}]),
            json!({"success": true, "data": {"data": [{"id": "1"}, {"id": "2"}], "page": 1, "limit": 2, "total": 4}}),
            json!({"success": true, "data": {"items": [{"id": "1"}, {"id": "2"}], "pagination": {"page": 1, "limit": 2, "total": 4, "totalPages": 2}}}),
        ];

        for shape in shapes {
            let page: Page<Blog> = decode_page(shape, "/blogs").unwrap();
            assert_eq!(page.items.len(), 2);
            assert_eq!(page.items[1].id, "2");
        }
    }

    #[test]
    fn test_pagination_total_pages_derived() {
        let page: Page<Blog> = decode_page(
            json!({"success": true, "data": {"data": [], "page": 2, "limit": 10, "total": 25}}),
            "/blogs",
        )
        .unwrap();
        assert_eq!(
            page.pagination,
            Some(Pagination {
                page: 2,
                limit: 10,
                total: 25,
                total_pages: 3
            })
        );
    }

    #[test]
    fn test_oversized_page_numbers_are_not_truncated() {
        let page: Page<Blog> = decode_page(
            json!({"data": [], "page": 4_294_967_297u64, "limit": 10, "total": 30}),
            "/blogs",
        )
        .unwrap();
        let pagination = page.pagination.unwrap();
        // 2^32 + 1 would wrap to 1; it is ignored and the default applies
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.total_pages, 3);

        let page: Page<Blog> = decode_page(
            json!({"data": [], "limit": 1, "total": 5_000_000_000u64}),
            "/blogs",
        )
        .unwrap();
        assert_eq!(page.pagination.unwrap().total_pages, u32::MAX);
    }

    #[test]
    fn test_unrecognized_list_shape() {
        let err = decode_page::<Blog>(json!({"success": true, "data": "nope"}), "/blogs").unwrap_err();
        assert!(err.message.contains("expected a list"));
    }

    #[test]
    fn test_server_message_nested_error() {
        assert_eq!(
            server_message(&json!({"error": {"message": "Token expired"}})),
            Some("Token expired".to_string())
        );
        assert_eq!(server_message(&json!([1, 2])), None);
    }
}

//! Stateless request building and response parsing.
//!
//! # Design
//! `build_request` and `parse_response` are pure: the first turns a path and
//! `RequestOptions` into an `HttpRequest`, the second turns an `HttpResponse`
//! into a parsed body or an `ApiError`. The caller (usually the facade, via a
//! `Transport`) executes the round-trip in between.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestOptions};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Join `base_url` and `path`, adding a leading slash when `path` lacks one.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Build an absolute request from a server-relative `path`.
///
/// `content-type: application/json` is always present. Caller headers are
/// appended; one named `content-type` replaces the default.
pub fn build_request(
    base_url: &str,
    path: &str,
    options: &RequestOptions,
) -> Result<HttpRequest, ApiError> {
    let mut url = join_url(base_url, path);
    let query = options.params.encode();
    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query);
    }

    let mut headers = vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())];
    for (name, value) in &options.headers {
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(existing) => *existing = (name.clone(), value.clone()),
            None => headers.push((name.clone(), value.clone())),
        }
    }

    let body = options
        .body
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ApiError::Serialization(e.to_string()))?;

    Ok(HttpRequest {
        method: options.method,
        url,
        headers,
        body,
    })
}

/// Parse a response body according to its content-type.
///
/// JSON bodies that fail to parse degrade to `None`; everything else is
/// returned as a JSON string. Non-2xx statuses become `ApiError::Http`.
pub fn parse_response(response: HttpResponse) -> Result<Option<Value>, ApiError> {
    let is_json = response
        .header("content-type")
        .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));

    let data = if is_json {
        serde_json::from_str(&response.body).ok()
    } else {
        Some(Value::String(response.body))
    };

    if !(200..300).contains(&response.status) {
        return Err(ApiError::from_status(response.status, data));
    }
    Ok(data)
}

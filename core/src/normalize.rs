//! Reconciles inconsistent backend response shapes into canonical values.
//!
//! # Design
//! List endpoints answer either with a bare array or with the array wrapped
//! under a key. Instead of sniffing at each call site, every endpoint names a
//! `ListRule` and `ListEnvelope::classify` performs one explicit
//! discriminated parse against it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::HealthStatus;

/// Wrap keys under which an endpoint may nest its list.
#[derive(Debug, Clone, Copy)]
pub struct ListRule {
    pub endpoint: &'static str,
    pub wrap_keys: &'static [&'static str],
}

pub const USERS: ListRule = ListRule {
    endpoint: "users",
    wrap_keys: &["users", "data"],
};

pub const ATTENDANCE: ListRule = ListRule {
    endpoint: "attendance",
    wrap_keys: &["attendance", "data"],
};

/// The shape a list response arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEnvelope {
    /// A bare JSON array.
    Bare(Vec<Value>),
    /// An object holding the array under one of the rule's wrap keys.
    Wrapped { key: &'static str, items: Vec<Value> },
    /// Anything else, including a missing body.
    Absent,
}

impl ListEnvelope {
    pub fn classify(body: Option<Value>, rule: &ListRule) -> Self {
        match body {
            Some(Value::Array(items)) => ListEnvelope::Bare(items),
            Some(Value::Object(mut map)) => rule
                .wrap_keys
                .iter()
                .find_map(|&key| match map.remove(key) {
                    Some(Value::Array(items)) => Some(ListEnvelope::Wrapped { key, items }),
                    _ => None,
                })
                .unwrap_or(ListEnvelope::Absent),
            _ => ListEnvelope::Absent,
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            ListEnvelope::Bare(items) | ListEnvelope::Wrapped { items, .. } => items,
            ListEnvelope::Absent => Vec::new(),
        }
    }
}

/// Classify a list body and decode each item, skipping items that do not
/// fit the canonical type.
pub fn decode_list<T: DeserializeOwned>(body: Option<Value>, rule: &ListRule) -> Vec<T> {
    let envelope = ListEnvelope::classify(body, rule);
    if envelope == ListEnvelope::Absent {
        tracing::debug!(endpoint = rule.endpoint, "list response had no recognizable shape");
    }
    envelope
        .into_items()
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(endpoint = rule.endpoint, error = %e, "skipping malformed list item");
                None
            }
        })
        .collect()
}

fn unwrap_entity(body: Value, wrap_key: &str) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(wrap_key) => {
            map.remove(wrap_key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a single entity, accepting it bare or wrapped under `wrap_key`.
///
/// For reads, where a body that is not the entity is a failure.
pub fn decode_entity<T: DeserializeOwned>(body: Option<Value>, wrap_key: &str) -> Result<T, ApiError> {
    let body = body.ok_or_else(|| ApiError::Decode(format!("empty {wrap_key} response")))?;
    serde_json::from_value(unwrap_entity(body, wrap_key))
        .map_err(|e| ApiError::Decode(format!("{wrap_key}: {e}")))
}

/// Decode the echo of a successful mutation.
///
/// The backend has already committed the change, so an empty or unexpected
/// body yields `None` rather than an error.
pub fn decode_echo<T: DeserializeOwned>(body: Option<Value>, wrap_key: &str) -> Option<T> {
    let Some(body) = body else {
        tracing::debug!(entity = wrap_key, "mutation succeeded without a response body");
        return None;
    };
    match serde_json::from_value(unwrap_entity(body, wrap_key)) {
        Ok(entity) => Some(entity),
        Err(e) => {
            tracing::warn!(entity = wrap_key, error = %e, "mutation succeeded with an unrecognized body");
            None
        }
    }
}

/// Map the outcome of a health request onto `HealthStatus`.
///
/// Any failure is `Unreachable`. A `message` containing "healthy" (any case)
/// or a `status` of `"ok"` is `Healthy`; another `status` string is kept raw.
pub fn normalize_health(outcome: Result<Option<Value>, ApiError>) -> HealthStatus {
    let body = match outcome {
        Ok(body) => body,
        Err(_) => return HealthStatus::Unreachable,
    };
    let mentions_healthy = |s: &str| s.to_ascii_lowercase().contains("healthy");

    match body {
        Some(Value::Object(map)) => {
            if map
                .get("message")
                .and_then(Value::as_str)
                .is_some_and(mentions_healthy)
            {
                return HealthStatus::Healthy;
            }
            match map.get("status").and_then(Value::as_str) {
                Some("ok") => HealthStatus::Healthy,
                Some(raw) if !raw.is_empty() => HealthStatus::Other(raw.to_string()),
                _ => HealthStatus::Unknown,
            }
        }
        Some(Value::String(text)) if mentions_healthy(&text) => HealthStatus::Healthy,
        _ => HealthStatus::Unknown,
    }
}

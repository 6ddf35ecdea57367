//! Verify request building, response parsing and normalization against JSON
//! test vectors stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field ordering
//! never causes false negatives.

use attendance_core::normalize::{self, decode_list, normalize_health};
use attendance_core::request::{build_request, parse_response};
use attendance_core::{
    ApiError, AttendanceRecord, EntityId, HttpMethod, HttpResponse, NewAttendance, ParamValue,
    QueryParams, RequestOptions, User,
};
use serde_json::Value;

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn param_value(value: &Value) -> Option<ParamValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(ParamValue::Text(s.clone())),
        Value::Bool(b) => Some(ParamValue::Bool(*b)),
        Value::Number(n) => Some(ParamValue::Int(n.as_i64().unwrap())),
        other => panic!("non-scalar param in vector: {other}"),
    }
}

fn simulated(sim: &Value) -> HttpResponse {
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: vec![(
            "content-type".to_string(),
            sim["content_type"].as_str().unwrap().to_string(),
        )],
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let mut params = QueryParams::new();
        for entry in case["params"].as_array().unwrap() {
            params = params.with_opt(entry[0].as_str().unwrap(), param_value(&entry[1]));
        }
        let mut options = RequestOptions::method(parse_method(case["method"].as_str().unwrap()))
            .with_params(params);
        for (k, v) in pairs(&case["headers"]) {
            options = options.with_header(&k, &v);
        }
        if let Some(body) = case.get("body") {
            options = options.with_body(body.clone());
        }

        let req = build_request(base_url, case["path"].as_str().unwrap(), &options).unwrap();
        let expected = &case["expected_request"];

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");

        let body: Value = req
            .body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap())
            .unwrap_or(Value::Null);
        assert_eq!(body, expected["body"], "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = parse_response(simulated(&case["simulated_response"]));

        if let Some(expected) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.status(), expected["status"].as_u64().map(|s| s as u16), "{name}: status");
            assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
        } else {
            let data = result.unwrap().unwrap_or(Value::Null);
            assert_eq!(data, case["expected_result"], "{name}: parsed body");
        }
    }
}

// ---------------------------------------------------------------------------
// List normalization
// ---------------------------------------------------------------------------

fn expected_ids(case: &Value) -> Vec<EntityId> {
    serde_json::from_value(case["expected_ids"].clone()).unwrap()
}

#[test]
fn list_shape_test_vectors() {
    let raw = include_str!("../../test-vectors/list_shapes.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = Some(case["body"].clone());

        let ids: Vec<EntityId> = match case["endpoint"].as_str().unwrap() {
            "users" => decode_list::<User>(body, &normalize::USERS)
                .into_iter()
                .map(|u| u.id)
                .collect(),
            "attendance" => decode_list::<AttendanceRecord>(body, &normalize::ATTENDANCE)
                .into_iter()
                .map(|r| r.id)
                .collect(),
            other => panic!("{name}: unknown endpoint {other}"),
        };
        assert_eq!(ids, expected_ids(case), "{name}: ids");
    }
}

// ---------------------------------------------------------------------------
// Attendance payload shaping
// ---------------------------------------------------------------------------

#[test]
fn create_attendance_test_vectors() {
    let raw = include_str!("../../test-vectors/create_attendance.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: NewAttendance = serde_json::from_value(case["input"].clone()).unwrap();
        let result = input.into_payload();

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "InvalidInput" => {
                    assert!(matches!(err, ApiError::InvalidInput(_)), "{name}: expected InvalidInput")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let body = serde_json::to_value(result.unwrap()).unwrap();
            assert_eq!(body, case["expected_body"], "{name}: body");
        }
    }
}

// ---------------------------------------------------------------------------
// Health normalization
// ---------------------------------------------------------------------------

#[test]
fn health_test_vectors() {
    let raw = include_str!("../../test-vectors/health.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let outcome = match case.get("error").and_then(Value::as_str) {
            Some("transport") => Err(ApiError::Transport("connection refused".into())),
            Some("http") => Err(ApiError::from_status(500, None)),
            Some(other) => panic!("{name}: unknown error kind {other}"),
            None => Ok(match &case["body"] {
                Value::Null => None,
                body => Some(body.clone()),
            }),
        };
        let status = normalize_health(outcome);
        assert_eq!(status.as_str(), case["expected"].as_str().unwrap(), "{name}: status");
    }
}

//! In-memory `Transport` double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

pub(crate) const BASE_URL: &str = "http://backend.test";

enum Canned {
    Response(HttpResponse),
    Unreachable,
}

/// Replies with canned responses keyed by method and path, and records
/// every request it sees. Unknown routes answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<(HttpMethod, String), Canned>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn json(self, method: HttpMethod, path: &str, status: u16, body: Value) -> Self {
        let response = HttpResponse {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.to_string(),
        };
        self.insert(method, path, Canned::Response(response))
    }

    pub(crate) fn text(self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        let response = HttpResponse {
            status,
            headers: vec![("content-type".into(), "text/plain".into())],
            body: body.to_string(),
        };
        self.insert(method, path, Canned::Response(response))
    }

    pub(crate) fn unreachable(self, method: HttpMethod, path: &str) -> Self {
        self.insert(method, path, Canned::Unreachable)
    }

    fn insert(self, method: HttpMethod, path: &str, canned: Canned) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), canned);
        self
    }

    pub(crate) fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.calls.lock().unwrap().push(request.clone());
        let relative = request.url.trim_start_matches(BASE_URL);
        let path = relative.split('?').next().unwrap_or_default().to_string();

        match self.routes.lock().unwrap().get(&(request.method, path)) {
            Some(Canned::Response(resp)) => Ok(resp.clone()),
            Some(Canned::Unreachable) => Err(ApiError::Transport("connection refused".into())),
            None => Ok(HttpResponse {
                status: 404,
                headers: vec![("content-type".into(), "application/json".into())],
                body: r#"{"error":"not found"}"#.into(),
            }),
        }
    }
}

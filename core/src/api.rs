//! The facade every caller uses to reach the backend.
//!
//! # Design
//! `AttendanceApi` composes the request wrapper, a `Transport` and the
//! normalizer. Operations the configured backend lacks are stubs: they
//! return an already-failed future and never build a request, so the
//! rejection is observable without polling the runtime.

use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, QueryParams, RequestOptions};
use crate::normalize::{self, decode_echo, decode_entity, decode_list, normalize_health};
use crate::request::{build_request, parse_response};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    AttendanceQuery, AttendanceRecord, EntityId, HealthStatus, NewAttendance, NewUser, Summary,
    User, UserUpdate,
};

#[derive(Clone)]
pub struct AttendanceApi {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for AttendanceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceApi")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn unsupported<'a, T: Send + 'a>(operation: &'static str) -> BoxFuture<'a, Result<T, ApiError>> {
    tracing::debug!(operation, "rejecting call to unsupported operation");
    future::ready(Err(ApiError::Unsupported { operation })).boxed()
}

/// Percent-encode an id for use as a single path segment.
fn segment(id: &EntityId) -> String {
    form_urlencoded::byte_serialize(id.to_string().as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

impl AttendanceApi {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build, execute and parse one request.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Option<Value>, ApiError> {
        let request = build_request(&self.config.base_url, path, &options)?;
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, "received response");
        parse_response(response)
    }

    /// Backend health; never fails.
    pub async fn health(&self) -> HealthStatus {
        let outcome = self.request(&self.config.health_path, RequestOptions::get()).await;
        normalize_health(outcome)
    }

    // --- users ---

    pub async fn get_users(&self, params: QueryParams) -> Result<Vec<User>, ApiError> {
        let body = self
            .request("/api/users", RequestOptions::get().with_params(params))
            .await?;
        Ok(decode_list(body, &normalize::USERS))
    }

    pub async fn get_user(&self, id: &EntityId) -> Result<User, ApiError> {
        let body = self
            .request(&format!("/api/users/{}", segment(id)), RequestOptions::get())
            .await?;
        decode_entity(body, "user")
    }

    /// Create a user. `Ok(None)` means the backend accepted it but did not
    /// echo the created user back.
    pub async fn create_user(&self, input: &NewUser) -> Result<Option<User>, ApiError> {
        let options = RequestOptions::method(HttpMethod::Post).with_body(to_body(input)?);
        let body = self.request("/api/users", options).await?;
        Ok(decode_echo(body, "user"))
    }

    pub fn update_user<'a>(
        &'a self,
        id: &EntityId,
        input: &UserUpdate,
    ) -> BoxFuture<'a, Result<Option<User>, ApiError>> {
        if !self.config.capabilities.update_user {
            return unsupported("update_user");
        }
        let path = format!("/api/users/{}", segment(id));
        let body = to_body(input);
        async move {
            let options = RequestOptions::method(HttpMethod::Put).with_body(body?);
            Ok(decode_echo(self.request(&path, options).await?, "user"))
        }
        .boxed()
    }

    pub fn delete_user<'a>(&'a self, id: &EntityId) -> BoxFuture<'a, Result<(), ApiError>> {
        if !self.config.capabilities.delete_user {
            return unsupported("delete_user");
        }
        let path = format!("/api/users/{}", segment(id));
        async move {
            self.request(&path, RequestOptions::method(HttpMethod::Delete))
                .await
                .map(|_| ())
        }
        .boxed()
    }

    // --- attendance ---

    pub async fn get_attendance(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRecord>, ApiError> {
        let body = self
            .request("/api/attendance", RequestOptions::get().with_params(query.to_params()))
            .await?;
        Ok(decode_list(body, &normalize::ATTENDANCE))
    }

    pub async fn get_attendance_by_id(&self, id: &EntityId) -> Result<AttendanceRecord, ApiError> {
        let body = self
            .request(&format!("/api/attendance/{}", segment(id)), RequestOptions::get())
            .await?;
        decode_entity(body, "attendance")
    }

    /// Shape `input` (see [`NewAttendance::into_payload`]) and submit it.
    ///
    /// Any 2xx is success; the created record is returned when the backend
    /// echoes one.
    pub async fn create_attendance(
        &self,
        input: NewAttendance,
    ) -> Result<Option<AttendanceRecord>, ApiError> {
        let payload = input.into_payload()?;
        let options = RequestOptions::method(HttpMethod::Post).with_body(to_body(&payload)?);
        let body = self.request("/api/attendance", options).await?;
        Ok(decode_echo(body, "attendance"))
    }

    pub fn update_attendance<'a>(
        &'a self,
        id: &EntityId,
        input: NewAttendance,
    ) -> BoxFuture<'a, Result<Option<AttendanceRecord>, ApiError>> {
        if !self.config.capabilities.update_attendance {
            return unsupported("update_attendance");
        }
        let path = format!("/api/attendance/{}", segment(id));
        async move {
            let payload = input.into_payload()?;
            let options = RequestOptions::method(HttpMethod::Put).with_body(to_body(&payload)?);
            Ok(decode_echo(self.request(&path, options).await?, "attendance"))
        }
        .boxed()
    }

    pub fn delete_attendance<'a>(&'a self, id: &EntityId) -> BoxFuture<'a, Result<(), ApiError>> {
        if !self.config.capabilities.delete_attendance {
            return unsupported("delete_attendance");
        }
        let path = format!("/api/attendance/{}", segment(id));
        async move {
            self.request(&path, RequestOptions::method(HttpMethod::Delete))
                .await
                .map(|_| ())
        }
        .boxed()
    }

    /// Optional summary; any failure, including a missing endpoint, is `None`.
    pub async fn summary(&self) -> Option<Summary> {
        match self.request("/api/summary", RequestOptions::get()).await {
            Ok(Some(body @ Value::Object(_))) => serde_json::from_value(body).ok(),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "summary unavailable");
                None
            }
        }
    }
}

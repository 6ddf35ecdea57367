//! Typed client for the attendance-tracking REST backend.
//!
//! # Overview
//! `AttendanceApi` is the single entry point: it builds requests, executes
//! them through a `Transport`, and normalizes whatever shape the backend
//! answers with into the canonical types in [`types`]. The [`screens`]
//! module layers the Dashboard, Users and Attendance load routines on top.
//!
//! # Design
//! - Building (`request::build_request`) and parsing
//!   (`request::parse_response`) are pure; only `Transport` does I/O.
//! - Configuration is an explicit `ClientConfig` value passed in at startup.
//! - Operations the backend lacks are fail-fast stubs, gated by
//!   `BackendCapabilities`.
//! - Non-critical reads degrade through [`fallback::try_default`].

pub mod api;
pub mod config;
pub mod error;
pub mod fallback;
pub mod forms;
pub mod http;
pub mod normalize;
pub mod request;
pub mod screens;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::AttendanceApi;
pub use config::{BackendCapabilities, ClientConfig};
pub use error::ApiError;
pub use fallback::try_default;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ParamValue, QueryParams, RequestOptions};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    AttendanceQuery, AttendanceRecord, AttendanceStatus, EntityId, HealthStatus, NewAttendance,
    NewUser, Summary, User, UserUpdate,
};

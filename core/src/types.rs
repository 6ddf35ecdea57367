//! Canonical domain types for the attendance API.
//!
//! # Design
//! Backend revisions disagree on field names (`userId` vs `user_id`, `id` vs
//! `_id`) and on whether a record carries `date` or only `timestamp`. The
//! deserializers here accept every known variant and always produce one
//! canonical shape; serialization always emits the camelCase contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ApiError;
use crate::http::QueryParams;

/// Backend identity: some revisions use integers, others strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(EntityId::Number)
            .unwrap_or_else(|_| EntityId::Text(s.to_string())))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Body of `PUT /api/users/{id}`. Omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Attendance status.
///
/// Writes are restricted to `Present`, `Absent` and `Late`; reads keep any
/// other backend value in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
    Other(String),
}

impl AttendanceStatus {
    /// Statuses the backend accepts on create.
    pub const ALLOWED: [AttendanceStatus; 3] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Other(s) => s,
        }
    }

    /// Map a caller-supplied status onto the allow-list, defaulting to `Present`.
    pub fn coerce(raw: Option<&str>) -> Self {
        raw.map(AttendanceStatus::from)
            .filter(|status| Self::ALLOWED.contains(status))
            .unwrap_or_default()
    }
}

impl From<&str> for AttendanceStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => AttendanceStatus::Present,
            "absent" => AttendanceStatus::Absent,
            "late" => AttendanceStatus::Late,
            _ => AttendanceStatus::Other(s.to_string()),
        }
    }
}

impl From<String> for AttendanceStatus {
    fn from(s: String) -> Self {
        AttendanceStatus::from(s.as_str())
    }
}

impl From<AttendanceStatus> for String {
    fn from(status: AttendanceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First ten characters of an ISO-8601 timestamp (`YYYY-MM-DD`).
pub fn date_prefix(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

/// A canonical attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawAttendanceRecord")]
pub struct AttendanceRecord {
    pub id: EntityId,
    pub user_id: EntityId,
    pub status: AttendanceStatus,
    /// Always set when the backend sent either `date` or `timestamp`.
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttendanceRecord {
    #[serde(alias = "_id")]
    id: EntityId,
    #[serde(alias = "user_id")]
    user_id: EntityId,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<RawAttendanceRecord> for AttendanceRecord {
    fn from(raw: RawAttendanceRecord) -> Self {
        let date = raw
            .date
            .filter(|d| !d.is_empty())
            .or_else(|| raw.timestamp.as_deref().map(date_prefix));
        Self {
            id: raw.id,
            user_id: raw.user_id,
            status: raw
                .status
                .map(AttendanceStatus::from)
                .unwrap_or_default(),
            date,
            timestamp: raw.timestamp,
            notes: raw.notes,
        }
    }
}

/// Caller input for creating (or replacing) an attendance record.
///
/// Accepts either `date` or `timestamp`, and either `userId` or `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    #[serde(alias = "user_id")]
    pub user_id: EntityId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAttendance {
    pub fn new(user_id: impl Into<EntityId>) -> Self {
        Self {
            user_id: user_id.into(),
            status: None,
            date: None,
            timestamp: None,
            notes: None,
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Shape into the body the backend expects.
    ///
    /// `date` wins over `timestamp`; a status outside the allow-list becomes
    /// `present`; blank notes are dropped.
    pub fn into_payload(self) -> Result<AttendancePayload, ApiError> {
        let date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .or_else(|| {
                self.timestamp
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .map(date_prefix)
            })
            .ok_or_else(|| ApiError::InvalidInput("either date or timestamp is required".into()))?;

        Ok(AttendancePayload {
            user_id: self.user_id,
            date,
            status: AttendanceStatus::coerce(self.status.as_deref()),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Body of `POST /api/attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    pub user_id: EntityId,
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Filter for `GET /api/attendance`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    #[serde(default, alias = "user_id")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<String>,
}

impl AttendanceQuery {
    pub fn for_user(user_id: impl Into<EntityId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn on_date(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            ..Self::default()
        }
    }

    /// Emit exactly the backend's query keys; unset fields are omitted.
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("userId", self.user_id.clone())
            .with_opt("date", self.date.clone())
            .with_opt("startDate", self.start_date.clone())
            .with_opt("endDate", self.end_date.clone())
    }
}

/// Response of the optional `GET /api/summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, alias = "totalUsers")]
    pub total_users: u64,
    #[serde(default, alias = "todayRecords")]
    pub today_records: u64,
}

/// Normalized backend health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unreachable,
    Unknown,
    /// Any other `status` string reported by the backend.
    Other(String),
}

impl HealthStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unreachable => "unreachable",
            HealthStatus::Unknown => "unknown",
            HealthStatus::Other(s) => s,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            status: &'a str,
        }
        Body {
            status: self.as_str(),
        }
        .serialize(serializer)
    }
}

//! In-memory attendance backend used by the client's integration tests.
//!
//! Users are wrapped (`{"users": [...]}`) and carry integer ids; attendance
//! records come back as a bare array with UUID ids. Attendance cannot be
//! updated or deleted.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const STATUSES: [&str; 3] = ["present", "absent", "late"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user_id: i64,
    pub status: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttendance {
    pub user_id: i64,
    pub date: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    pub user_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Default)]
pub struct Store {
    next_user_id: i64,
    users: BTreeMap<i64, User>,
    attendance: Vec<AttendanceRecord>,
}

pub type Db = Arc<RwLock<Store>>;

/// Which optional endpoints the backend exposes.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    pub summary: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { summary: true }
    }
}

pub enum MockError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MockError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            MockError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            MockError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn app() -> Router {
    app_with(Options::default())
}

pub fn app_with(options: Options) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let mut router = Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/api/attendance", get(list_attendance).post(create_attendance))
        .route("/api/attendance/{id}", get(get_attendance));
    if options.summary {
        router = router.route("/api/summary", get(summary));
    }
    router.with_state(db)
}

pub async fn run_with(listener: TcpListener, options: Options) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "message": "Healthy" }))
}

async fn list_users(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let users: Vec<&User> = store.users.values().collect();
    Json(json!({ "users": users }))
}

fn validate_user_fields(name: &str, email: &str) -> Result<(), MockError> {
    if name.trim().is_empty() {
        return Err(MockError::BadRequest("name is required".into()));
    }
    if !email.contains('@') {
        return Err(MockError::BadRequest("email is invalid".into()));
    }
    Ok(())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), MockError> {
    validate_user_fields(&input.name, &input.email)?;
    let mut store = db.write().await;
    if store.users.values().any(|u| u.email == input.email) {
        return Err(MockError::Conflict("email already exists".into()));
    }
    store.next_user_id += 1;
    let user = User {
        id: store.next_user_id,
        name: input.name,
        email: input.email,
    };
    store.users.insert(user.id, user.clone());
    tracing::info!(id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<User>, MockError> {
    let store = db.read().await;
    store
        .users
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| MockError::NotFound("user not found".into()))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, MockError> {
    let mut store = db.write().await;
    let user = store
        .users
        .get_mut(&id)
        .ok_or_else(|| MockError::NotFound("user not found".into()))?;
    let name = input.name.unwrap_or_else(|| user.name.clone());
    let email = input.email.unwrap_or_else(|| user.email.clone());
    validate_user_fields(&name, &email)?;
    user.name = name;
    user.email = email;
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, MockError> {
    let mut store = db.write().await;
    store
        .users
        .remove(&id)
        .ok_or_else(|| MockError::NotFound("user not found".into()))?;
    store.attendance.retain(|r| r.user_id != id);
    Ok(StatusCode::NO_CONTENT)
}

fn record_date(record: &AttendanceRecord) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").ok()
}

async fn list_attendance(
    State(db): State<Db>,
    Query(filter): Query<AttendanceFilter>,
) -> Json<Vec<AttendanceRecord>> {
    let store = db.read().await;
    let records = store
        .attendance
        .iter()
        .filter(|r| filter.user_id.map_or(true, |id| r.user_id == id))
        .filter(|r| {
            let date = record_date(r);
            filter.date.map_or(true, |d| date == Some(d))
                && filter.start_date.map_or(true, |d| date.is_some_and(|rd| rd >= d))
                && filter.end_date.map_or(true, |d| date.is_some_and(|rd| rd <= d))
        })
        .cloned()
        .collect();
    Json(records)
}

async fn create_attendance(
    State(db): State<Db>,
    Json(input): Json<CreateAttendance>,
) -> Result<(StatusCode, Json<AttendanceRecord>), MockError> {
    if !STATUSES.contains(&input.status.as_str()) {
        return Err(MockError::BadRequest(format!("invalid status: {}", input.status)));
    }
    NaiveDate::parse_from_str(&input.date, "%Y-%m-%d")
        .map_err(|_| MockError::BadRequest("date must be YYYY-MM-DD".into()))?;

    let mut store = db.write().await;
    if !store.users.contains_key(&input.user_id) {
        return Err(MockError::BadRequest("unknown userId".into()));
    }
    let record = AttendanceRecord {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        status: input.status,
        date: input.date,
        notes: input.notes.filter(|n| !n.is_empty()),
    };
    store.attendance.push(record.clone());
    tracing::info!(id = %record.id, user_id = record.user_id, "attendance logged");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_attendance(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceRecord>, MockError> {
    let store = db.read().await;
    store
        .attendance
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| MockError::NotFound("attendance record not found".into()))
}

async fn summary(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let today = Local::now().date_naive();
    let today_records = store
        .attendance
        .iter()
        .filter(|r| record_date(r) == Some(today))
        .count();
    Json(json!({
        "total_users": store.users.len(),
        "today_records": today_records,
    }))
}

//! Load and submit routines for the Dashboard, Users and Attendance screens.
//!
//! # Design
//! Each screen owns its state exclusively inside a `Screen<S>`. Loads run
//! independent reads concurrently and degrade non-critical ones through
//! `try_default`. In-flight requests are never cancelled; instead a
//! `Liveness` flag, cleared when the screen goes away, makes late results
//! a no-op.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::api::AttendanceApi;
use crate::error::ApiError;
use crate::fallback::try_default;
use crate::http::QueryParams;
use crate::types::{
    AttendanceQuery, AttendanceRecord, EntityId, HealthStatus, NewAttendance, NewUser, User,
    UserUpdate,
};

/// Shared flag marking whether a screen is still displayed.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the screen as gone. Results arriving afterwards are dropped.
    pub fn retire(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState<S> {
    Loading,
    Ready(S),
    Failed(String),
}

impl<S> ScreenState<S> {
    pub fn ready(&self) -> Option<&S> {
        match self {
            ScreenState::Ready(s) => Some(s),
            _ => None,
        }
    }
}

/// State holder for one screen.
#[derive(Debug)]
pub struct Screen<S> {
    state: RwLock<ScreenState<S>>,
    liveness: Liveness,
}

impl<S> Default for Screen<S> {
    fn default() -> Self {
        Self {
            state: RwLock::new(ScreenState::Loading),
            liveness: Liveness::new(),
        }
    }
}

impl<S: Clone> Screen<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub async fn state(&self) -> ScreenState<S> {
        self.state.read().await.clone()
    }

    /// Run `load` and store its outcome while the screen is live.
    ///
    /// A failure is stored as `Failed(message)`. Returns `false` when the
    /// screen was retired before the result arrived.
    pub async fn load<F>(&self, load: F) -> bool
    where
        F: Future<Output = Result<S, ApiError>>,
    {
        if self.liveness.is_live() {
            *self.state.write().await = ScreenState::Loading;
        }
        let outcome = load.await;
        if !self.liveness.is_live() {
            tracing::debug!("discarding result for retired screen");
            return false;
        }
        *self.state.write().await = match outcome {
            Ok(data) => ScreenState::Ready(data),
            Err(e) => ScreenState::Failed(e.to_string()),
        };
        true
    }
}

// --- dashboard ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardData {
    pub api_base: String,
    pub health: HealthStatus,
    pub total_users: u64,
    pub today_records: u64,
}

/// Health and counts for the dashboard. Never fails.
///
/// Uses `/api/summary` when the backend has it, otherwise counts users and
/// `today`'s attendance records.
pub async fn load_dashboard(api: &AttendanceApi, today: NaiveDate) -> DashboardData {
    let (health, summary) = tokio::join!(api.health(), api.summary());

    let (total_users, today_records) = match summary {
        Some(summary) => (summary.total_users, summary.today_records),
        None => {
            let today_query = AttendanceQuery::on_date(&today.format("%Y-%m-%d").to_string());
            let (users, records) = tokio::join!(
                try_default("get_users", api.get_users(QueryParams::new()), Vec::new()),
                try_default("get_attendance", api.get_attendance(&today_query), Vec::new()),
            );
            (users.len() as u64, records.len() as u64)
        }
    };

    DashboardData {
        api_base: api.base_url().to_string(),
        health,
        total_users,
        today_records,
    }
}

pub type DashboardScreen = Screen<DashboardData>;

impl DashboardScreen {
    pub async fn refresh(&self, api: &AttendanceApi) -> bool {
        let today = Local::now().date_naive();
        self.load(async { Ok(load_dashboard(api, today).await) }).await
    }
}

// --- users ---

/// Case-insensitive substring search on name or email. An empty query
/// matches everything.
pub fn filter_users<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
    let query = query.trim().to_lowercase();
    users
        .iter()
        .filter(|u| {
            query.is_empty()
                || u.name.to_lowercase().contains(&query)
                || u.email.to_lowercase().contains(&query)
        })
        .collect()
}

pub type UsersScreen = Screen<Vec<User>>;

impl UsersScreen {
    pub async fn refresh(&self, api: &AttendanceApi) -> bool {
        self.load(api.get_users(QueryParams::new())).await
    }

    /// Create, then reload. On error the current state is left untouched.
    pub async fn create(
        &self,
        api: &AttendanceApi,
        input: &NewUser,
    ) -> Result<Option<User>, ApiError> {
        let user = api.create_user(input).await?;
        self.refresh(api).await;
        Ok(user)
    }

    pub async fn update(
        &self,
        api: &AttendanceApi,
        id: &EntityId,
        input: &UserUpdate,
    ) -> Result<Option<User>, ApiError> {
        let user = api.update_user(id, input).await?;
        self.refresh(api).await;
        Ok(user)
    }

    pub async fn delete(&self, api: &AttendanceApi, id: &EntityId) -> Result<(), ApiError> {
        api.delete_user(id).await?;
        self.refresh(api).await;
        Ok(())
    }
}

// --- attendance ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceData {
    pub users: Vec<User>,
    pub records: Vec<AttendanceRecord>,
}

/// Users and filtered records, fetched concurrently.
///
/// A users failure degrades to an empty list; an attendance failure fails
/// the whole load.
pub async fn load_attendance(
    api: &AttendanceApi,
    filter: &AttendanceQuery,
) -> Result<AttendanceData, ApiError> {
    let (users, records) = tokio::join!(
        try_default("get_users", api.get_users(QueryParams::new()), Vec::new()),
        api.get_attendance(filter),
    );
    Ok(AttendanceData {
        users,
        records: records?,
    })
}

pub type AttendanceScreen = Screen<AttendanceData>;

impl AttendanceScreen {
    pub async fn refresh(&self, api: &AttendanceApi, filter: &AttendanceQuery) -> bool {
        self.load(load_attendance(api, filter)).await
    }

    /// Log a record, then reload with `filter`.
    pub async fn log(
        &self,
        api: &AttendanceApi,
        input: NewAttendance,
        filter: &AttendanceQuery,
    ) -> Result<Option<AttendanceRecord>, ApiError> {
        let record = api.create_attendance(input).await?;
        self.refresh(api, filter).await;
        Ok(record)
    }
}

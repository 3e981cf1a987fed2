//! API request and response structures

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    calc::{leaderboard_title, rank_for_level, xp_progress_percent, Class, GeoPoint},
    error::AppError,
    services::{Profile, Role, RunRecord, Session, StoreError},
    state::{SignedInUser, TimerView},
    timer::TimerKind,
};

/// Body of POST /timer, validated by the host before a controller exists
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimerRequest {
    pub kind: TimerKind,
    pub round_duration: i64,
    pub rounds: i64,
    #[serde(default)]
    pub rest_duration: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub class: Option<Class>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
}

/// Body of POST /runs: the sampled track and how long it took
#[derive(Debug, Clone, Deserialize)]
pub struct LogRunRequest {
    pub positions: Vec<GeoPoint>,
    pub duration_seconds: u64,
}

fn default_max_participants() -> u32 {
    10
}

/// Body of POST /sessions
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date_time: DateTime<Utc>,
    #[serde(default = "default_max_participants")]
    pub max_participants: u32,
    #[serde(default)]
    pub link: Option<String>,
}

/// Response for timer endpoints
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl TimerResponse {
    pub fn new(status: &str, timer: TimerView) -> Self {
        Self {
            status: status.to_string(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    pub fn new(status: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn ok(message: String) -> Self {
        Self::new("ok", message)
    }

    pub fn error(message: String) -> Self {
        Self::new("error", message)
    }
}

/// Profile with the derived progression fields the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub class: Option<Class>,
    pub anime: Option<String>,
    pub xp_total: u32,
    pub level: u32,
    pub rank: &'static str,
    pub xp_progress_percent: f64,
    pub runs: Vec<RunRecord>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            rank: rank_for_level(profile.class, profile.level),
            xp_progress_percent: xp_progress_percent(profile.xp_total),
            user_id: profile.user_id,
            display_name: profile.display_name,
            role: profile.role,
            class: profile.class,
            anime: profile.anime,
            xp_total: profile.xp_total,
            level: profile.level,
            runs: profile.runs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub status: String,
    pub distance_m: f64,
    pub xp_gained: u32,
    pub xp_total: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub display_name: String,
    pub class: Option<Class>,
    pub level: u32,
    pub xp_total: u32,
    pub title: String,
}

impl LeaderboardEntry {
    pub fn ranked(position: usize, profile: &Profile) -> Self {
        Self {
            position,
            display_name: profile.display_name.clone(),
            class: profile.class,
            level: profile.level,
            xp_total: profile.xp_total,
            title: leaderboard_title(profile.class, profile.xp_total).to_string(),
        }
    }
}

/// A session with its booking counters
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub participant_count: usize,
    pub seats_left: u32,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let participant_count = session.participants.len();
        Self {
            seats_left: session
                .max_participants
                .saturating_sub(u32::try_from(participant_count).unwrap_or(u32::MAX)),
            participant_count,
            session,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachEntry {
    pub user_id: String,
    pub display_name: String,
}

impl From<Profile> for CoachEntry {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
        }
    }
}

/// Server status with the active timer, if any
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub signed_in: Option<SignedInUser>,
    pub timer: Option<TimerView>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub tick_ms: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NoTimer => StatusCode::NOT_FOUND,
            AppError::NotSignedIn => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Store(StoreError::NotFound(_) | StoreError::SessionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Store(StoreError::AlreadyExists(_) | StoreError::SessionFull(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Store(StoreError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Poisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection);
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

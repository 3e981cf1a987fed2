//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    calc::{run_xp, track_distance},
    error::AppError,
    services::{live_window, NewSession, Profile, ProfileUpdate, Role, RunRecord},
    state::{AppState, SignedInUser},
    timer::TimerConfig,
};
use super::responses::{
    ApiResponse, CoachEntry, CreateSessionRequest, CreateTimerRequest, HealthResponse,
    LeaderboardEntry, LogRunRequest, ProfileResponse, RunResponse, SessionResponse,
    SignInRequest, SignUpRequest, StatusResponse, TimerResponse,
};

/// Load the signed-in profile, failing unless it has `role`
async fn signed_in_with_role(state: &AppState, role: Role, action: &str) -> Result<Profile, AppError> {
    let user = state.auth.current().ok_or(AppError::NotSignedIn)?;
    let profile = state.store.load_profile(&user.user_id).await?;
    if profile.role != role {
        warn!("{} tried to {} without the {} role", profile.user_id, action, role);
        return Err(AppError::Forbidden(format!("only {} accounts can {}", role, action)));
    }
    Ok(profile)
}

/// Handle POST /timer - Create a timer, replacing any active one
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTimerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TimerResponse>), AppError> {
    let Json(request) = payload?;
    let config = TimerConfig::from_raw(
        request.kind,
        request.round_duration,
        request.rounds,
        request.rest_duration,
    )
    .map_err(|e| {
        warn!("Rejected {} timer configuration: {}", request.kind, e);
        e
    })?;

    let view = state.create_timer(config)?;
    Ok((StatusCode::CREATED, Json(TimerResponse::new("created", view))))
}

/// Handle GET /timer - Current timer snapshot and reward
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let view = state.timer_view()?;
    let status = if view.snapshot.complete {
        "complete"
    } else if view.snapshot.running {
        "running"
    } else {
        "stopped"
    };
    Ok(Json(TimerResponse::new(status, view)))
}

/// Handle POST /timer/start - Start or resume the timer
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let view = state.start_timer()?;
    Ok(Json(TimerResponse::new("running", view)))
}

/// Handle POST /timer/pause - Pause the timer
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let view = state.pause_timer()?;
    Ok(Json(TimerResponse::new("paused", view)))
}

/// Handle POST /timer/reset - Reset the timer to round one
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let view = state.reset_timer()?;
    Ok(Json(TimerResponse::new("stopped", view)))
}

/// Handle DELETE /timer - Discard the active timer
pub async fn discard_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, AppError> {
    match state.discard_timer()? {
        Some(run_id) => Ok(Json(ApiResponse::ok(format!("Run {} discarded", run_id)))),
        None => Err(AppError::NoTimer),
    }
}

/// Handle POST /auth/sign-up - Create a profile and sign in
pub async fn sign_up_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let Json(request) = payload?;
    let user_id = request.user_id.trim().to_string();
    let display_name = request.display_name.trim().to_string();
    if user_id.is_empty() || display_name.is_empty() {
        return Err(AppError::InvalidInput(
            "user_id and display_name must not be empty".to_string(),
        ));
    }

    let profile = state
        .store
        .create_profile(Profile::new(user_id, display_name, request.role, request.class))
        .await?;

    state.auth.sign_in(SignedInUser {
        user_id: profile.user_id.clone(),
        display_name: profile.display_name.clone(),
    });
    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// Handle POST /auth/sign-in - Sign in with an existing profile
pub async fn sign_in_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Json(request) = payload?;
    let profile = state.store.load_profile(request.user_id.trim()).await?;
    state.auth.sign_in(SignedInUser {
        user_id: profile.user_id.clone(),
        display_name: profile.display_name.clone(),
    });
    Ok(Json(profile.into()))
}

/// Handle POST /auth/sign-out - Clear the signed-in identity
pub async fn sign_out_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    match state.auth.sign_out() {
        Some(user) => Json(ApiResponse::ok(format!("{} signed out", user.user_id))),
        None => Json(ApiResponse::ok("Nobody was signed in".to_string())),
    }
}

/// Handle GET /profile - Signed-in profile with level and rank
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state.auth.current().ok_or(AppError::NotSignedIn)?;
    let profile = state.store.load_profile(&user.user_id).await?;
    Ok(Json(profile.into()))
}

/// Handle PATCH /profile - Edit display name, anime or class
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Json(mut update) = payload?;
    let user = state.auth.current().ok_or(AppError::NotSignedIn)?;

    if let Some(display_name) = update.display_name.take() {
        let display_name = display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AppError::InvalidInput(
                "display_name must not be empty".to_string(),
            ));
        }
        update.display_name = Some(display_name);
    }
    if update.class.is_some() {
        let profile = state.store.load_profile(&user.user_id).await?;
        if profile.role == Role::Coach {
            return Err(AppError::InvalidInput(
                "coaches do not pick a class".to_string(),
            ));
        }
    }

    let profile = state.store.update_profile(&user.user_id, update).await?;
    state.auth.rename(&profile.display_name);
    Ok(Json(profile.into()))
}

/// Handle GET /coaches - Every coach account
pub async fn coaches_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CoachEntry>>, AppError> {
    let coaches = state.store.coaches().await?;
    Ok(Json(coaches.into_iter().map(CoachEntry::from).collect()))
}

/// Handle POST /sessions - A coach publishes a live session
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let Json(request) = payload?;
    let coach = signed_in_with_role(&state, Role::Coach, "create sessions").await?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }
    if request.max_participants == 0 {
        return Err(AppError::InvalidInput(
            "max_participants must be at least 1".to_string(),
        ));
    }

    let session = state
        .sessions
        .create_session(NewSession {
            coach_id: coach.user_id,
            coach_name: coach.display_name,
            title,
            description: request.description,
            date_time: request.date_time,
            max_participants: request.max_participants,
            link: request.link.filter(|link| !link.trim().is_empty()),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Handle GET /sessions - Every session, earliest first
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = state.sessions.sessions().await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Handle GET /sessions/live - Sessions starting around now
pub async fn live_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let (from, to) = live_window(Utc::now());
    let sessions = state.sessions.sessions_between(from, to).await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Handle GET /sessions/mine - Sessions of the signed-in coach
pub async fn coach_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let coach = signed_in_with_role(&state, Role::Coach, "list their sessions").await?;
    let sessions = state.sessions.sessions_by_coach(&coach.user_id).await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Handle POST /sessions/:session_id/book - A student takes a seat
pub async fn book_session_handler(
    State(state): State<Arc<AppState>>,
    session_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Path(session_id) = session_id?;
    let student = signed_in_with_role(&state, Role::Student, "book sessions").await?;
    let session = state
        .sessions
        .book_session(session_id, &student.user_id)
        .await?;
    Ok(Json(session.into()))
}

/// Handle POST /runs - Log a GPS run and credit its XP
pub async fn log_run_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LogRunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, AppError> {
    let Json(request) = payload?;
    let user = state.auth.current().ok_or(AppError::NotSignedIn)?;
    if request.positions.len() < 2 {
        return Err(AppError::InvalidInput(
            "a run needs at least two recorded positions".to_string(),
        ));
    }
    if let Some(bad) = request.positions.iter().find(|point| !point.is_valid()) {
        return Err(AppError::InvalidInput(format!(
            "position [{}, {}] is out of range",
            bad.lat(),
            bad.lon()
        )));
    }

    let distance_m = track_distance(&request.positions);
    let xp = run_xp(distance_m);
    let run = RunRecord {
        date: Utc::now(),
        duration_seconds: request.duration_seconds,
        distance_m,
        xp,
    };

    let profile = state.store.record_run(&user.user_id, run).await?;
    info!(
        "{} logged a {:.0}m run for {} XP",
        user.user_id, distance_m, xp
    );
    Ok(Json(RunResponse {
        status: "saved".to_string(),
        distance_m,
        xp_gained: xp,
        xp_total: profile.xp_total,
        level: profile.level,
    }))
}

/// Handle GET /leaderboard - Profiles ranked by level then XP
pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let ranked = state.store.leaderboard().await?;
    Ok(Json(
        ranked
            .iter()
            .enumerate()
            .map(|(index, profile)| LeaderboardEntry::ranked(index + 1, profile))
            .collect(),
    ))
}

/// Handle GET /status - Return current server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let timer = match state.timer_view() {
        Ok(view) => Some(view),
        Err(AppError::NoTimer) => None,
        Err(e) => return Err(e),
    };

    Ok(Json(StatusResponse {
        signed_in: state.auth.current(),
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        tick_ms: u64::try_from(state.tick_period.as_millis()).unwrap_or(u64::MAX),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

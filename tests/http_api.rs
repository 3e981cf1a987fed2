use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fit_timer::{
    calc::RewardPolicy,
    create_router,
    services::{
        InMemoryProfileStore, InMemorySessionStore, Profile, ProfileStore, ProfileUpdate,
        RunRecord, StoreError,
    },
    state::AppState,
    tasks::reward_award_task,
};

/// Profile backend that is always down
struct OfflineProfileStore;

fn offline() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl ProfileStore for OfflineProfileStore {
    async fn create_profile(&self, _profile: Profile) -> Result<Profile, StoreError> {
        Err(offline())
    }

    async fn load_profile(&self, _user_id: &str) -> Result<Profile, StoreError> {
        Err(offline())
    }

    async fn award_xp(&self, _user_id: &str, _xp: u32) -> Result<Profile, StoreError> {
        Err(offline())
    }

    async fn update_profile(&self, _user_id: &str, _update: ProfileUpdate) -> Result<Profile, StoreError> {
        Err(offline())
    }

    async fn record_run(&self, _user_id: &str, _run: RunRecord) -> Result<Profile, StoreError> {
        Err(offline())
    }

    async fn coaches(&self) -> Result<Vec<Profile>, StoreError> {
        Err(offline())
    }

    async fn leaderboard(&self) -> Result<Vec<Profile>, StoreError> {
        Err(offline())
    }
}

fn app_with_store(store: Arc<dyn ProfileStore>) -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::new(
        20553,
        "127.0.0.1".to_string(),
        Duration::from_secs(1),
        RewardPolicy::default(),
        store,
        Arc::new(InMemorySessionStore::new()),
    ));
    let router = create_router(Arc::clone(&state));
    (state, router)
}

fn app() -> (Arc<AppState>, Router) {
    app_with_store(Arc::new(InMemoryProfileStore::new()))
}

async fn sign_up(router: &Router, id: &str, role: &str, class: Option<&str>) {
    let (status, _) = call(
        router,
        Method::POST,
        "/auth/sign-up",
        Some(json!({ "user_id": id, "display_name": id, "role": role, "class": class })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, router) = app();
    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn invalid_configurations_are_rejected() {
    let (state, router) = app();

    let (status, body) = call(
        &router,
        Method::POST,
        "/timer",
        Some(json!({ "kind": "emom", "round_duration": 0, "rounds": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = call(
        &router,
        Method::POST,
        "/timer",
        Some(json!({ "kind": "tabata", "round_duration": 20, "rest_duration": -1, "rounds": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.timer_view().is_err());
}

#[tokio::test]
async fn timer_commands_need_a_timer() {
    let (_, router) = app();
    let (status, _) = call(&router, Method::POST, "/timer/start", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&router, Method::DELETE, "/timer", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn tabata_runs_on_the_virtual_clock() {
    let (_, router) = app();

    let (status, body) = call(
        &router,
        Method::POST,
        "/timer",
        Some(json!({ "kind": "tabata", "round_duration": 20, "rest_duration": 10, "rounds": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["timer"]["seconds_left"], 20);
    assert_eq!(body["timer"]["phase"], "work");

    let (status, _) = call(&router, Method::POST, "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(25_500)).await;
    let (_, body) = call(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["timer"]["phase"], "rest");
    assert_eq!(body["timer"]["current_round"], 1);
    assert_eq!(body["timer"]["clock"], "00:05");

    tokio::time::sleep(Duration::from_secs(5)).await;
    let (_, body) = call(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["timer"]["phase"], "work");
    assert_eq!(body["timer"]["current_round"], 2);

    let (_, paused) = call(&router, Method::POST, "/timer/pause", None).await;
    assert_eq!(paused["status"], "paused");
    tokio::time::sleep(Duration::from_secs(120)).await;
    let (_, body) = call(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["timer"]["seconds_left"], paused["timer"]["seconds_left"]);
    assert_eq!(body["status"], "stopped");

    let (_, body) = call(&router, Method::POST, "/timer/reset", None).await;
    assert_eq!(body["timer"]["current_round"], 1);
    assert_eq!(body["timer"]["seconds_left"], 20);
    assert_eq!(body["timer"]["running"], false);
}

#[tokio::test(start_paused = true)]
async fn completed_emom_credits_the_signed_in_student() {
    let (state, router) = app();
    tokio::spawn(reward_award_task(Arc::clone(&state)));

    let (status, _) = call(
        &router,
        Method::POST,
        "/auth/sign-up",
        Some(json!({
            "user_id": "ichigo",
            "display_name": "Ichigo",
            "role": "student",
            "class": "Shinigami"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    call(
        &router,
        Method::POST,
        "/timer",
        Some(json!({ "kind": "emom", "round_duration": 60, "rounds": 10 })),
    )
    .await;
    call(&router, Method::POST, "/timer/start", None).await;
    tokio::time::sleep(Duration::from_millis(600_500)).await;

    let (_, body) = call(&router, Method::GET, "/timer", None).await;
    assert_eq!(body["status"], "complete");
    assert_eq!(body["timer"]["effort"], 9000);
    assert_eq!(body["timer"]["reward"]["status"], "awarded");
    assert_eq!(body["timer"]["reward"]["xp"], 10);

    let (status, profile) = call(&router, Method::GET, "/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["xp_total"], 10);
    assert_eq!(profile["rank"], "Academy Student");
}

#[tokio::test]
async fn runs_require_identity_and_two_points() {
    let (_, router) = app();
    let track = json!({ "positions": [[0.0, 0.0], [0.0, 0.01]], "duration_seconds": 600 });

    let (status, _) = call(&router, Method::POST, "/runs", Some(track.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    call(
        &router,
        Method::POST,
        "/auth/sign-up",
        Some(json!({ "user_id": "uryu", "display_name": "Uryu", "role": "student", "class": "Quincy" })),
    )
    .await;

    let (status, _) = call(
        &router,
        Method::POST,
        "/runs",
        Some(json!({ "positions": [[0.0, 0.0]], "duration_seconds": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&router, Method::POST, "/runs", Some(track)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["xp_gained"], 11);
    assert_eq!(body["xp_total"], 11);
}

#[tokio::test]
async fn leaderboard_ranks_by_level_then_xp() {
    let (state, router) = app();
    for (id, class) in [("uryu", "Quincy"), ("ichigo", "Shinigami")] {
        call(
            &router,
            Method::POST,
            "/auth/sign-up",
            Some(json!({ "user_id": id, "display_name": id, "role": "student", "class": class })),
        )
        .await;
    }
    state.store.award_xp("ichigo", 150).await.unwrap();
    state.store.award_xp("uryu", 20).await.unwrap();

    let (status, body) = call(&router, Method::GET, "/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["display_name"], "ichigo");
    assert_eq!(body[0]["level"], 2);
    assert_eq!(body[0]["title"], "Officer");
    assert_eq!(body[1]["display_name"], "uryu");
    assert_eq!(body[1]["title"], "Echt");
}

#[tokio::test]
async fn duplicate_sign_up_conflicts() {
    let (_, router) = app();
    let body = json!({ "user_id": "urahara", "display_name": "Kisuke", "role": "coach" });
    let (status, _) = call(&router, Method::POST, "/auth/sign-up", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&router, Method::POST, "/auth/sign-up", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_bodies_are_json_bad_requests() {
    let (state, router) = app();
    for body in [
        json!({ "kind": "emom", "round_duration": 60 }),
        json!({ "kind": "amrap", "round_duration": 60, "rounds": 10 }),
        json!({ "kind": "emom", "round_duration": "sixty", "rounds": 10 }),
    ] {
        let (status, response) = call(&router, Method::POST, "/timer", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], "error");
        assert!(response["message"].as_str().unwrap().starts_with("invalid request"));
    }
    assert!(state.timer_view().is_err());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/sign-in")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");
}

#[tokio::test]
async fn unavailable_backend_is_a_bad_gateway() {
    let (state, router) = app_with_store(Arc::new(OfflineProfileStore));

    let (status, body) = call(&router, Method::POST, "/auth/sign-in", Some(json!({ "user_id": "ichigo" }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "backend unavailable: connection refused");
    assert!(state.auth.current().is_none());

    let (status, _) = call(&router, Method::GET, "/leaderboard", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn coach_publishes_and_students_book_seats() {
    let (_, router) = app();
    let starts_at = chrono::Utc::now() + chrono::Duration::minutes(30);

    sign_up(&router, "urahara", "coach", None).await;
    let (status, session) = call(
        &router,
        Method::POST,
        "/sessions",
        Some(json!({ "title": "Flash step", "date_time": starts_at, "max_participants": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["session_id"], 1);
    assert_eq!(session["coach_id"], "urahara");
    assert_eq!(session["seats_left"], 2);

    let (_, mine) = call(&router, Method::GET, "/sessions/mine", None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (status, _) = call(&router, Method::POST, "/sessions/1/book", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    sign_up(&router, "ichigo", "student", Some("Shinigami")).await;
    let (status, _) = call(
        &router,
        Method::POST,
        "/sessions",
        Some(json!({ "title": "Bankai", "date_time": starts_at })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, booked) = call(&router, Method::POST, "/sessions/1/book", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booked["participants"], json!(["ichigo"]));
    let (_, booked) = call(&router, Method::POST, "/sessions/1/book", None).await;
    assert_eq!(booked["participant_count"], 1);

    sign_up(&router, "uryu", "student", Some("Quincy")).await;
    let (_, booked) = call(&router, Method::POST, "/sessions/1/book", None).await;
    assert_eq!(booked["seats_left"], 0);

    sign_up(&router, "chad", "student", None).await;
    let (status, _) = call(&router, Method::POST, "/sessions/1/book", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(&router, Method::POST, "/sessions/99/book", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&router, Method::POST, "/sessions/first/book", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (_, live) = call(&router, Method::GET, "/sessions/live", None).await;
    assert_eq!(live[0]["title"], "Flash step");
    let (_, all) = call(&router, Method::GET, "/sessions", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sessions_need_a_signed_in_coach_and_a_title() {
    let (_, router) = app();
    let body = json!({ "title": " ", "date_time": chrono::Utc::now() });

    let (status, _) = call(&router, Method::POST, "/sessions", Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    sign_up(&router, "yoruichi", "coach", None).await;
    let (status, _) = call(&router, Method::POST, "/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(
        &router,
        Method::POST,
        "/sessions",
        Some(json!({ "title": "Shunko", "date_time": chrono::Utc::now(), "max_participants": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn coaches_are_listed_and_profiles_are_editable() {
    let (_, router) = app();
    sign_up(&router, "urahara", "coach", None).await;
    sign_up(&router, "ichigo", "student", Some("Shinigami")).await;

    let (_, coaches) = call(&router, Method::GET, "/coaches", None).await;
    assert_eq!(coaches, json!([{ "user_id": "urahara", "display_name": "urahara" }]));

    let (status, profile) = call(
        &router,
        Method::PATCH,
        "/profile",
        Some(json!({ "display_name": "Kurosaki", "anime": "Bleach", "class": "Quincy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["display_name"], "Kurosaki");
    assert_eq!(profile["anime"], "Bleach");
    assert_eq!(profile["class"], "Quincy");
    assert_eq!(profile["rank"], "Gemischt");

    let (_, status_body) = call(&router, Method::GET, "/status", None).await;
    assert_eq!(status_body["signed_in"]["display_name"], "Kurosaki");

    let (status, _) = call(&router, Method::PATCH, "/profile", Some(json!({ "display_name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(&router, Method::POST, "/auth/sign-in", Some(json!({ "user_id": "urahara" }))).await;
    let (status, _) = call(&router, Method::PATCH, "/profile", Some(json!({ "class": "Shinigami" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(&router, Method::POST, "/auth/sign-out", None).await;
    let (status, _) = call(&router, Method::PATCH, "/profile", Some(json!({ "anime": "Naruto" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

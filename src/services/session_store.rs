//! Live coaching sessions
//!
//! Coaches publish sessions with a date and a seat limit, students book a
//! seat. Like profiles, sessions live in the hosted backend behind
//! [`SessionStore`].

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::StoreError;

/// How long before its start a session counts as live
pub const LIVE_LEAD_MINUTES: i64 = 10;
/// How far ahead of now a session still counts as live
pub const LIVE_AHEAD_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: u64,
    pub coach_id: String,
    pub coach_name: String,
    pub title: String,
    pub description: String,
    pub date_time: DateTime<Utc>,
    pub max_participants: u32,
    /// Video call link, when the coach gave one
    pub link: Option<String>,
    /// User ids of students who booked, in booking order
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }
}

/// Everything a coach provides when publishing a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub coach_id: String,
    pub coach_name: String,
    pub title: String,
    pub description: String,
    pub date_time: DateTime<Utc>,
    pub max_participants: u32,
    pub link: Option<String>,
}

/// Window of start times considered live at `now`
pub fn live_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        now - Duration::minutes(LIVE_LEAD_MINUTES),
        now + Duration::minutes(LIVE_AHEAD_MINUTES),
    )
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: NewSession) -> Result<Session, StoreError>;

    async fn load_session(&self, session_id: u64) -> Result<Session, StoreError>;

    /// Add `user_id` to the participants. Booking twice keeps one seat.
    async fn book_session(&self, session_id: u64, user_id: &str) -> Result<Session, StoreError>;

    /// All sessions, earliest first
    async fn sessions(&self) -> Result<Vec<Session>, StoreError>;

    async fn sessions_by_coach(&self, coach_id: &str) -> Result<Vec<Session>, StoreError>;

    /// Sessions starting within `[from, to]`, earliest first
    async fn sessions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Session>, StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<u64, Session>>,
    last_id: AtomicU64,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, keep: impl Fn(&Session) -> bool + Send) -> Vec<Session> {
        let mut selected: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|&session| keep(session))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.session_id.cmp(&b.session_id)));
        selected
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: NewSession) -> Result<Session, StoreError> {
        let session_id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        let session = Session {
            session_id,
            coach_id: session.coach_id,
            coach_name: session.coach_name,
            title: session.title,
            description: session.description,
            date_time: session.date_time,
            max_participants: session.max_participants,
            link: session.link,
            participants: Vec::new(),
            created_at: Utc::now(),
        };
        info!(
            "Coach {} created session {} for {}",
            session.coach_id, session_id, session.date_time
        );
        self.sessions.write().await.insert(session_id, session.clone());
        Ok(session)
    }

    async fn load_session(&self, session_id: u64) -> Result<Session, StoreError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(StoreError::SessionNotFound(session_id))
    }

    async fn book_session(&self, session_id: u64, user_id: &str) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;

        if session.participants.iter().any(|participant| participant == user_id) {
            debug!("{} already booked session {}", user_id, session_id);
            return Ok(session.clone());
        }
        if session.is_full() {
            return Err(StoreError::SessionFull(session_id));
        }
        session.participants.push(user_id.to_string());
        info!(
            "{} booked session {} ({}/{})",
            user_id,
            session_id,
            session.participants.len(),
            session.max_participants
        );
        Ok(session.clone())
    }

    async fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.select(|_| true).await)
    }

    async fn sessions_by_coach(&self, coach_id: &str) -> Result<Vec<Session>, StoreError> {
        Ok(self.select(|session| session.coach_id == coach_id).await)
    }

    async fn sessions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .select(|session| session.date_time >= from && session.date_time <= to)
            .await)
    }
}

//! Profile persistence collaborator
//!
//! The hosted backend keeps one document per user with their XP, level and
//! run log. [`ProfileStore`] is the seam the server talks to; the in-memory
//! implementation backs a single process.

use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::StoreError;
use crate::calc::{level_for_xp, Class};

/// Account role chosen at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coach => write!(f, "coach"),
            Role::Student => write!(f, "student"),
        }
    }
}

/// One logged GPS run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub date: DateTime<Utc>,
    pub duration_seconds: u64,
    pub distance_m: f64,
    pub xp: u32,
}

/// Stored user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    /// Only students pick a class
    pub class: Option<Class>,
    /// Favourite series, free text
    pub anime: Option<String>,
    pub xp_total: u32,
    pub level: u32,
    pub runs: Vec<RunRecord>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile at level 1 with no XP
    pub fn new(user_id: String, display_name: String, role: Role, class: Option<Class>) -> Self {
        Self {
            user_id,
            display_name,
            class: match role {
                Role::Student => class,
                Role::Coach => None,
            },
            role,
            anime: None,
            xp_total: 0,
            level: 1,
            runs: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn add_xp(&mut self, xp: u32) {
        self.xp_total = self.xp_total.saturating_add(xp);
        self.level = level_for_xp(self.xp_total);
    }

    fn apply(&mut self, update: ProfileUpdate) {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(anime) = update.anime {
            self.anime = Some(anime).filter(|anime| !anime.is_empty());
        }
        if self.role == Role::Student && update.class.is_some() {
            self.class = update.class;
        }
    }
}

/// Editable profile fields; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub anime: Option<String>,
    pub class: Option<Class>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError>;

    async fn load_profile(&self, user_id: &str) -> Result<Profile, StoreError>;

    /// Add `xp` to a profile and return the updated document
    async fn award_xp(&self, user_id: &str, xp: u32) -> Result<Profile, StoreError>;

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile, StoreError>;

    /// Append a run and credit its XP
    async fn record_run(&self, user_id: &str, run: RunRecord) -> Result<Profile, StoreError>;

    /// Every profile with the coach role, by display name
    async fn coaches(&self) -> Result<Vec<Profile>, StoreError>;

    /// All profiles, highest level first, then highest XP
    async fn leaderboard(&self) -> Result<Vec<Profile>, StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.user_id) {
            return Err(StoreError::AlreadyExists(profile.user_id));
        }
        info!("Creating profile for {}", profile.user_id);
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }

    async fn load_profile(&self, user_id: &str) -> Result<Profile, StoreError> {
        self.profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    async fn award_xp(&self, user_id: &str, xp: u32) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        profile.add_xp(xp);
        debug!("Awarded {} XP to {} (total {})", xp, user_id, profile.xp_total);
        Ok(profile.clone())
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        profile.apply(update);
        info!("Updated profile of {}", user_id);
        Ok(profile.clone())
    }

    async fn record_run(&self, user_id: &str, run: RunRecord) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        profile.add_xp(run.xp);
        profile.runs.push(run);
        Ok(profile.clone())
    }

    async fn coaches(&self) -> Result<Vec<Profile>, StoreError> {
        let mut coaches: Vec<Profile> = self
            .profiles
            .read()
            .await
            .values()
            .filter(|profile| profile.role == Role::Coach)
            .cloned()
            .collect();
        coaches.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(coaches)
    }

    async fn leaderboard(&self) -> Result<Vec<Profile>, StoreError> {
        let mut ranked: Vec<Profile> = self.profiles.read().await.values().cloned().collect();
        ranked.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then(b.xp_total.cmp(&a.xp_total))
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        Ok(ranked)
    }
}

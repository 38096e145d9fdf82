//! crates/promptt_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or transport format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Represents a signed-in user - used throughout the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Shortest password the session provider accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a login session issued by the session provider
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The optional tag a user can attach to a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Writing,
    Marketing,
    Coding,
    Analysis,
    Creative,
    Business,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Writing,
        Category::Marketing,
        Category::Coding,
        Category::Analysis,
        Category::Creative,
        Category::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Writing => "writing",
            Category::Marketing => "marketing",
            Category::Coding => "coding",
            Category::Analysis => "analysis",
            Category::Creative => "creative",
            Category::Business => "business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One submission to the generation gateway. Built fresh per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub goal: String,
    pub category: Option<Category>,
}

impl GenerationRequest {
    /// Returns `None` when the goal is empty once trimmed.
    pub fn new(goal: &str, category: Option<Category>) -> Option<Self> {
        let goal = goal.trim();
        if goal.is_empty() {
            return None;
        }
        Some(Self {
            goal: goal.to_string(),
            category,
        })
    }
}

/// The text produced by the gateway, held in view state until saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
}

/// A generated prompt stored against its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub goal: String,
    pub generated_text: String,
    pub category: Option<Category>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// The insert payload for a new `PromptRecord`; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromptRecord {
    pub owner_id: Uuid,
    pub goal: String,
    pub generated_text: String,
    pub category: Option<Category>,
    pub is_favorite: bool,
}

/// The authoritative per-day usage the server keeps for an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyUsage {
    pub owner_id: Uuid,
    pub day: NaiveDate,
    pub used: u32,
    pub limit: u32,
}

impl DailyUsage {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// The UTC calendar day a usage entry is counted against.
pub fn usage_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

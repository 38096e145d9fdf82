//! crates/promptt_core/src/protocol.rs
//!
//! JSON bodies exchanged between the API and its clients. Field names are
//! camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, DailyUsage, PromptRecord, User};

//=========================================================================================
// Generation Gateway
//=========================================================================================

/// `POST /generate-prompt` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequestBody {
    #[serde(default)]
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Accepted only by deployments that allow caller-supplied keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponseBody {
    #[serde(default)]
    pub generated_prompt: Option<String>,
}

/// Every non-2xx JSON response carries this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

//=========================================================================================
// Record Store
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreatePromptBody {
    pub goal: String,
    pub generated_text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedBody {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FavoritePatchBody {
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PromptRecordBody {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub goal: String,
    pub generated_text: String,
    pub category: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PromptRecord> for PromptRecordBody {
    fn from(record: PromptRecord) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            goal: record.goal,
            generated_text: record.generated_text,
            category: record.category.map(|c| c.to_string()),
            is_favorite: record.is_favorite,
            created_at: record.created_at,
        }
    }
}

impl PromptRecordBody {
    /// Unknown category tags are dropped rather than failing the whole record.
    pub fn into_domain(self) -> PromptRecord {
        PromptRecord {
            id: self.id,
            owner_id: self.owner_id,
            goal: self.goal,
            generated_text: self.generated_text,
            category: self.category.and_then(|c| c.parse::<Category>().ok()),
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Usage and Auth
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UsageBody {
    pub day: NaiveDate,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

impl From<&DailyUsage> for UsageBody {
    fn from(usage: &DailyUsage) -> Self {
        Self {
            day: usage.day,
            used: usage.used,
            limit: usage.limit,
            remaining: usage.remaining(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

/// `POST /auth/password` body. The confirmation is checked when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeBody {
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseBody {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Present on signup and login; the same value is set as the `session` cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthResponseBody {
    pub fn user(&self) -> User {
        User {
            id: self.user_id,
            email: self.email.clone(),
        }
    }
}

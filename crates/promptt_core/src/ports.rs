//! crates/promptt_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    DailyUsage, GenerationRequest, NewPromptRecord, PromptRecord, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Daily prompt limit reached")]
    QuotaExceeded,
    /// The remote side answered with an error payload; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The hosted table of generated prompts. Every call is scoped by owner.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Persists a record and returns its assigned id.
    async fn insert_prompt(&self, record: NewPromptRecord) -> PortResult<Uuid>;

    /// All records for an owner, newest first.
    async fn list_prompts(&self, owner_id: Uuid) -> PortResult<Vec<PromptRecord>>;

    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, is_favorite: bool) -> PortResult<()>;

    async fn delete_prompt(&self, id: Uuid, owner_id: Uuid) -> PortResult<()>;
}

/// Server-side persistence for identities, login sessions and usage counting.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user id for a live (unexpired) session token.
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Usage Counting ---
    async fn get_daily_usage(&self, owner_id: Uuid, day: NaiveDate) -> PortResult<u32>;

    /// Atomically claims one generation for `day` if the owner is still under
    /// `limit`. Returns `false`, leaving the count untouched, once the limit is reached.
    async fn try_reserve_daily_usage(
        &self,
        owner_id: Uuid,
        day: NaiveDate,
        limit: u32,
    ) -> PortResult<bool>;

    /// Gives back a claim whose generation produced nothing.
    async fn release_daily_usage(&self, owner_id: Uuid, day: NaiveDate) -> PortResult<()>;

    async fn update_password(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()>;
}

/// The language-model backed generator that sits behind the gateway endpoint.
#[async_trait]
pub trait PromptGenerationService: Send + Sync {
    /// Turns a goal into an optimized prompt. `api_key` is a caller-supplied
    /// credential, used only when the deployment accepts one.
    async fn generate_prompt(
        &self,
        request: &GenerationRequest,
        api_key: Option<&str>,
    ) -> PortResult<String>;
}

/// What the gateway handed back on a 2xx response. The field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayReply {
    pub generated_prompt: Option<String>,
}

/// The client's view of the generation endpoint.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Non-2xx responses come back as `PortError::Rejected` carrying the payload's
    /// `error` text, or `PortError::QuotaExceeded` for a quota refusal.
    async fn generate(&self, request: &GenerationRequest) -> PortResult<GatewayReply>;
}

/// Read access to the server's authoritative daily usage.
#[async_trait]
pub trait UsageService: Send + Sync {
    async fn daily_usage(&self, owner_id: Uuid) -> PortResult<DailyUsage>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> PortResult<()>;
}

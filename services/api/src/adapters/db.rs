//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` and `PromptStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use promptt_core::domain::{Category, NewPromptRecord, PromptRecord, User, UserCredentials};
use promptt_core::ports::{DatabaseService, PortError, PortResult, PromptStore};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` and `PromptStore` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.user_id,
            email: Some(self.email),
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct PromptRow {
    id: Uuid,
    user_id: Uuid,
    goal: String,
    generated_prompt: String,
    category: Option<String>,
    is_favorite: bool,
    created_at: DateTime<Utc>,
}
impl PromptRow {
    fn to_domain(self) -> PromptRecord {
        let category = self.category.and_then(|raw| match raw.parse::<Category>() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Prompt {} has an unreadable category: {}", self.id, e);
                None
            }
        });
        PromptRecord {
            id: self.id,
            owner_id: self.user_id,
            goal: self.goal,
            generated_text: self.generated_prompt,
            category,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Rejected("Email already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT user_id, email FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        PortError::NotFound(format!("User {} not found", user_id))
                    }
                    _ => unexpected(e),
                })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_daily_usage(&self, owner_id: Uuid, day: NaiveDate) -> PortResult<u32> {
        let used: Option<i32> =
            sqlx::query_scalar("SELECT used FROM daily_usage WHERE user_id = $1 AND day = $2")
                .bind(owner_id)
                .bind(day)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(used.unwrap_or(0).max(0) as u32)
    }

    async fn try_reserve_daily_usage(
        &self,
        owner_id: Uuid,
        day: NaiveDate,
        limit: u32,
    ) -> PortResult<bool> {
        // Both the first insert and the increment are conditional on the limit,
        // so concurrent callers cannot push the count past it.
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let used: Option<i32> = sqlx::query_scalar(
            "INSERT INTO daily_usage (user_id, day, used) \
             SELECT $1, $2, 1 WHERE $3 > 0 \
             ON CONFLICT (user_id, day) DO UPDATE SET used = daily_usage.used + 1 \
             WHERE daily_usage.used < $3 \
             RETURNING used",
        )
        .bind(owner_id)
        .bind(day)
        .bind(limit)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(used.is_some())
    }

    async fn release_daily_usage(&self, owner_id: Uuid, day: NaiveDate) -> PortResult<()> {
        sqlx::query(
            "UPDATE daily_usage SET used = GREATEST(used - 1, 0) WHERE user_id = $1 AND day = $2",
        )
        .bind(owner_id)
        .bind(day)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET hashed_password = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(hashed_password)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `PromptStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PromptStore for DbAdapter {
    async fn insert_prompt(&self, record: NewPromptRecord) -> PortResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO prompts (id, user_id, goal, generated_prompt, category, is_favorite) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(record.owner_id)
        .bind(&record.goal)
        .bind(&record.generated_text)
        .bind(record.category.map(|c| c.as_str()))
        .bind(record.is_favorite)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn list_prompts(&self, owner_id: Uuid) -> PortResult<Vec<PromptRecord>> {
        let records = sqlx::query_as::<_, PromptRow>(
            "SELECT id, user_id, goal, generated_prompt, category, is_favorite, created_at \
             FROM prompts WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let prompts = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(prompts)
    }

    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, is_favorite: bool) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE prompts SET is_favorite = $1 WHERE id = $2 AND user_id = $3")
                .bind(is_favorite)
                .bind(id)
                .bind(owner_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Prompt {} not found", id)));
        }
        Ok(())
    }

    async fn delete_prompt(&self, id: Uuid, owner_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Prompt {} not found", id)));
        }
        Ok(())
    }
}

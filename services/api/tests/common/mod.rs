// In-memory adapters and request helpers for the router tests.

#![allow(dead_code)]

use api_lib::{
    config::Config,
    web::{router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use promptt_core::{
    domain::{GenerationRequest, NewPromptRecord, PromptRecord, User, UserCredentials},
    ports::{DatabaseService, PortError, PortResult, PromptGenerationService, PromptStore},
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// Fake Database
//=========================================================================================

#[derive(Default)]
pub struct MemoryDb {
    users: Mutex<HashMap<Uuid, UserCredentials>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
    usage: Mutex<HashMap<(Uuid, NaiveDate), u32>>,
    prompts: Mutex<Vec<PromptRecord>>,
}

impl MemoryDb {
    /// Registers a user with a live session and returns `(user_id, token)`.
    pub fn user_with_session(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            user_id,
            UserCredentials {
                user_id,
                email: format!("{user_id}@example.com"),
                hashed_password: String::new(),
            },
        );
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), (user_id, Utc::now() + chrono::Duration::days(1)));
        (user_id, token)
    }

    pub fn set_usage(&self, owner_id: Uuid, used: u32) {
        self.usage
            .lock()
            .unwrap()
            .insert((owner_id, Utc::now().date_naive()), used);
    }

    pub fn usage_today(&self, owner_id: Uuid) -> u32 {
        self.usage
            .lock()
            .unwrap()
            .get(&(owner_id, Utc::now().date_naive()))
            .copied()
            .unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<PromptRecord> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(PortError::Rejected("Email already registered".to_string()));
        }
        let user_id = Uuid::new_v4();
        users.insert(
            user_id,
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(User {
            id: user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|u| User {
                id: u.user_id,
                email: Some(u.email.clone()),
            })
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        match self.sessions.lock().unwrap().get(token) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    async fn get_daily_usage(&self, owner_id: Uuid, day: NaiveDate) -> PortResult<u32> {
        Ok(self
            .usage
            .lock()
            .unwrap()
            .get(&(owner_id, day))
            .copied()
            .unwrap_or(0))
    }

    async fn try_reserve_daily_usage(
        &self,
        owner_id: Uuid,
        day: NaiveDate,
        limit: u32,
    ) -> PortResult<bool> {
        let mut usage = self.usage.lock().unwrap();
        let used = usage.entry((owner_id, day)).or_insert(0);
        if *used >= limit {
            return Ok(false);
        }
        *used += 1;
        Ok(true)
    }

    async fn release_daily_usage(&self, owner_id: Uuid, day: NaiveDate) -> PortResult<()> {
        if let Some(used) = self.usage.lock().unwrap().get_mut(&(owner_id, day)) {
            *used = used.saturating_sub(1);
        }
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        user.hashed_password = hashed_password.to_string();
        Ok(())
    }
}

#[async_trait]
impl PromptStore for MemoryDb {
    async fn insert_prompt(&self, record: NewPromptRecord) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        self.prompts.lock().unwrap().push(PromptRecord {
            id,
            owner_id: record.owner_id,
            goal: record.goal,
            generated_text: record.generated_text,
            category: record.category,
            is_favorite: record.is_favorite,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_prompts(&self, owner_id: Uuid) -> PortResult<Vec<PromptRecord>> {
        Ok(self
            .prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, is_favorite: bool) -> PortResult<()> {
        let mut prompts = self.prompts.lock().unwrap();
        let record = prompts
            .iter_mut()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .ok_or_else(|| PortError::NotFound(format!("Prompt {id} not found")))?;
        record.is_favorite = is_favorite;
        Ok(())
    }

    async fn delete_prompt(&self, id: Uuid, owner_id: Uuid) -> PortResult<()> {
        let mut prompts = self.prompts.lock().unwrap();
        let before = prompts.len();
        prompts.retain(|r| !(r.id == id && r.owner_id == owner_id));
        if prompts.len() == before {
            return Err(PortError::NotFound(format!("Prompt {id} not found")));
        }
        Ok(())
    }
}

//=========================================================================================
// Fake Generator
//=========================================================================================

pub struct FakeGenerator {
    reply: PortResult<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(GenerationRequest, Option<String>)>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self::with(Ok(text.to_string()))
    }

    pub fn with(reply: PortResult<String>) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Holds every reply for `delay`, so overlapping requests stay in flight together.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(GenerationRequest, Option<String>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptGenerationService for FakeGenerator {
    async fn generate_prompt(
        &self,
        request: &GenerationRequest,
        api_key: Option<&str>,
    ) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((request.clone(), api_key.map(str::to_string)));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

//=========================================================================================
// App and Request Helpers
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        openai_api_base: None,
        allow_client_api_key: false,
        prompt_model: "gpt-4o-mini".to_string(),
        prompt_temperature: 0.7,
        prompt_max_tokens: 800,
        daily_prompt_limit: 5,
    }
}

pub fn test_app(db: &Arc<MemoryDb>, generator: &Arc<FakeGenerator>) -> Router {
    router(Arc::new(AppState {
        db: db.clone(),
        prompts: db.clone(),
        generator: generator.clone(),
        config: Arc::new(test_config()),
    }))
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn read_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub fn assert_status(response: &Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status");
}

//! In-memory port fakes shared by the unit tests of this crate.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

use crate::domain::{usage_day, DailyUsage, GenerationRequest, NewPromptRecord, PromptRecord, User};
use crate::ports::{
    Clipboard, GatewayReply, GenerationGateway, PortError, PortResult, PromptStore, UsageService,
};
use crate::session::SessionContext;

pub fn signed_in() -> SessionContext {
    SessionContext::signed_in(User {
        id: Uuid::new_v4(),
        email: Some("someone@example.com".to_string()),
    })
}

//=========================================================================================
// Gateway
//=========================================================================================

pub struct FakeGateway {
    reply: PortResult<GatewayReply>,
    calls: AtomicUsize,
    gate: Option<(Notify, Semaphore)>,
}

impl FakeGateway {
    pub fn replying(text: Option<&str>) -> Self {
        Self {
            reply: Ok(GatewayReply {
                generated_prompt: text.map(str::to_string),
            }),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            reply: Err(error),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Holds every call until `release` is invoked.
    pub fn gated(mut self) -> Self {
        self.gate = Some((Notify::new(), Semaphore::new(0)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_for_call(&self) {
        if let Some((started, _)) = &self.gate {
            started.notified().await;
        }
    }

    pub fn release(&self) {
        if let Some((_, permits)) = &self.gate {
            permits.add_permits(1);
        }
    }
}

#[async_trait]
impl GenerationGateway for FakeGateway {
    async fn generate(&self, _request: &GenerationRequest) -> PortResult<GatewayReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((started, permits)) = &self.gate {
            started.notify_one();
            let permit = permits
                .acquire()
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            permit.forget();
        }
        self.reply.clone()
    }
}

//=========================================================================================
// Record Store
//=========================================================================================

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<PromptRecord>>,
    inserts: Mutex<Vec<NewPromptRecord>>,
    favorite_updates: AtomicUsize,
    fail_inserts: AtomicBool,
    fail_updates: AtomicBool,
    fail_deletes: AtomicBool,
    fail_lists: AtomicBool,
}

impl MemoryStore {
    pub fn failing_inserts() -> Self {
        let store = Self::default();
        store.fail_inserts.store(true, Ordering::SeqCst);
        store
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn inserts(&self) -> Vec<NewPromptRecord> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn favorite_updates(&self) -> usize {
        self.favorite_updates.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<PromptRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Seeds a record created `age_minutes` ago.
    pub fn seed(&self, owner_id: Uuid, goal: &str, age_minutes: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.records.lock().unwrap().push(PromptRecord {
            id,
            owner_id,
            goal: goal.to_string(),
            generated_text: format!("prompt for {goal}"),
            category: None,
            is_favorite: false,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        });
        id
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn insert_prompt(&self, record: NewPromptRecord) -> PortResult<Uuid> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("insert failed".to_string()));
        }
        self.inserts.lock().unwrap().push(record.clone());
        let id = Uuid::new_v4();
        self.records.lock().unwrap().push(PromptRecord {
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
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("select failed".to_string()));
        }
        // Insertion order on purpose; callers must not rely on the store's ordering.
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, is_favorite: bool) -> PortResult<()> {
        self.favorite_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("update failed".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .ok_or_else(|| PortError::NotFound(format!("Prompt {id} not found")))?;
        record.is_favorite = is_favorite;
        Ok(())
    }

    async fn delete_prompt(&self, id: Uuid, owner_id: Uuid) -> PortResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("delete failed".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.owner_id == owner_id));
        if records.len() == before {
            return Err(PortError::NotFound(format!("Prompt {id} not found")));
        }
        Ok(())
    }
}

//=========================================================================================
// Clipboard and Usage
//=========================================================================================

#[derive(Default)]
pub struct FakeClipboard {
    contents: Mutex<Option<String>>,
}

impl FakeClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clipboard for FakeClipboard {
    async fn write_text(&self, text: &str) -> PortResult<()> {
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

pub struct FakeUsage {
    pub used: u32,
    pub limit: u32,
}

#[async_trait]
impl UsageService for FakeUsage {
    async fn daily_usage(&self, owner_id: Uuid) -> PortResult<DailyUsage> {
        Ok(DailyUsage {
            owner_id,
            day: usage_day(Utc::now()),
            used: self.used,
            limit: self.limit,
        })
    }
}

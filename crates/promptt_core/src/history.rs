//! crates/promptt_core/src/history.rs
//!
//! The History Viewer: lists, favorites, copies and deletes a signed-in
//! user's stored prompts. Every failure leaves the local list usable.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::PromptRecord;
use crate::error::{PromptError, PromptResult};
use crate::optimistic::OptimisticWrite;
use crate::ports::{Clipboard, PortError, PromptStore};
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// The user has no stored prompts yet.
    Empty,
    Entries(Vec<PromptRecord>),
}

pub struct HistoryViewer {
    store: Arc<dyn PromptStore>,
    clipboard: Arc<dyn Clipboard>,
    entries: Mutex<Vec<PromptRecord>>,
}

impl HistoryViewer {
    pub fn new(store: Arc<dyn PromptStore>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            store,
            clipboard,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// The locally held list, as of the last successful operation.
    pub async fn entries(&self) -> Vec<PromptRecord> {
        self.entries.lock().await.clone()
    }

    /// Fetches the caller's records, newest first.
    pub async fn list(&self, session: &SessionContext) -> PromptResult<HistoryView> {
        let owner_id = session.user_id().ok_or(PromptError::SignInRequired)?;
        let mut records = self.store.list_prompts(owner_id).await.map_err(|e| {
            error!("Failed to load prompt history for user {}: {}", owner_id, e);
            PromptError::Store(e)
        })?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut entries = self.entries.lock().await;
        *entries = records.clone();
        Ok(if records.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Entries(records)
        })
    }

    /// Flips one entry's favorite flag, reverting it if the store rejects the write.
    pub async fn toggle_favorite(&self, session: &SessionContext, id: Uuid) -> PromptResult<bool> {
        let owner_id = session.user_id().ok_or(PromptError::SignInRequired)?;

        let write = {
            let mut entries = self.entries.lock().await;
            let entry = entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| PortError::NotFound(format!("Prompt {} not in history", id)))?;
            let next = !entry.is_favorite;
            OptimisticWrite::apply(&mut entry.is_favorite, next)
        };

        let outcome = self.store.set_favorite(id, owner_id, *write.applied()).await;

        let mut entries = self.entries.lock().await;
        let slot = entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.is_favorite);
        let is_favorite = write.settle(outcome, slot).map_err(|e| {
            error!("Failed to update favorite status of prompt {}: {}", id, e);
            PromptError::Store(e)
        })?;
        info!("Prompt {} favorite set to {}", id, is_favorite);
        Ok(is_favorite)
    }

    /// Removes a record for good. There is no undo.
    pub async fn delete(&self, session: &SessionContext, id: Uuid) -> PromptResult<()> {
        let owner_id = session.user_id().ok_or(PromptError::SignInRequired)?;
        self.store.delete_prompt(id, owner_id).await.map_err(|e| {
            error!("Failed to delete prompt {}: {}", id, e);
            PromptError::Store(e)
        })?;
        self.entries.lock().await.retain(|e| e.id != id);
        info!("Deleted prompt {}", id);
        Ok(())
    }

    /// Copies one entry's generated text.
    pub async fn copy(&self, id: Uuid) -> PromptResult<()> {
        let text = self
            .entries
            .lock()
            .await
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.generated_text.clone())
            .ok_or_else(|| PromptError::Clipboard(format!("prompt {} not in history", id)))?;
        self.clipboard
            .write_text(&text)
            .await
            .map_err(|e| PromptError::Clipboard(e.to_string()))
    }
}

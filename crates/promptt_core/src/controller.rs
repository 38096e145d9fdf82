//! crates/promptt_core/src/controller.rs
//!
//! The Prompt Generation Controller: validates a goal, calls the gateway,
//! keeps the daily-use hint, and saves successful results for signed-in users.
//!
//! State is kept behind a mutex that is never held across a port call, so a
//! second `submit` issued while one is in flight sees `Pending` and is dropped.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Category, GenerationRequest, GenerationResult, NewPromptRecord};
use crate::error::{PromptError, PromptResult};
use crate::optimistic::OptimisticWrite;
use crate::ports::{Clipboard, GenerationGateway, PortError, PromptStore, UsageService};
use crate::session::{SessionContext, SessionEvent};
use crate::usage::UsageCounter;

const GENERIC_FAILURE: &str = "Failed to generate prompt";
const EMPTY_RESULT: &str = "no prompt generated";

//=========================================================================================
// View State
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Pending,
    Succeeded,
    Failed { message: String },
}

/// The prompt currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrompt {
    pub result: GenerationResult,
    /// Known only when the result was persisted.
    pub record_id: Option<Uuid>,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Generated(CurrentPrompt),
    /// A generation was already in flight.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Updated { is_favorite: bool },
    /// Nothing was saved for this result; the caller should prompt for sign in.
    SignInRequired,
}

struct ControllerState {
    phase: GenerationState,
    current: Option<CurrentPrompt>,
    usage: UsageCounter,
}

//=========================================================================================
// The Controller
//=========================================================================================

pub struct PromptGenerationController {
    gateway: Arc<dyn GenerationGateway>,
    store: Arc<dyn PromptStore>,
    clipboard: Arc<dyn Clipboard>,
    state: Mutex<ControllerState>,
}

impl PromptGenerationController {
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        store: Arc<dyn PromptStore>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self::with_usage(gateway, store, clipboard, UsageCounter::default())
    }

    pub fn with_usage(
        gateway: Arc<dyn GenerationGateway>,
        store: Arc<dyn PromptStore>,
        clipboard: Arc<dyn Clipboard>,
        usage: UsageCounter,
    ) -> Self {
        Self {
            gateway,
            store,
            clipboard,
            state: Mutex::new(ControllerState {
                phase: GenerationState::Idle,
                current: None,
                usage,
            }),
        }
    }

    pub async fn state(&self) -> GenerationState {
        self.state.lock().await.phase.clone()
    }

    pub async fn current(&self) -> Option<CurrentPrompt> {
        self.state.lock().await.current.clone()
    }

    pub async fn daily_uses_left(&self) -> u32 {
        self.state.lock().await.usage.daily_uses_left()
    }

    /// Runs one generation attempt and its side effects.
    pub async fn submit(
        &self,
        session: &SessionContext,
        goal: &str,
        category: Option<Category>,
    ) -> PromptResult<SubmitOutcome> {
        let request = GenerationRequest::new(goal, category).ok_or(PromptError::EmptyGoal)?;

        {
            let mut state = self.state.lock().await;
            if state.phase == GenerationState::Pending {
                return Ok(SubmitOutcome::Ignored);
            }
            if session.is_authenticated() && state.usage.is_exhausted() {
                return Err(PromptError::QuotaExceeded);
            }
            state.phase = GenerationState::Pending;
        }
        let _pending = PendingGuard { state: &self.state };

        let reply = self.gateway.generate(&request).await;

        let text = match reply {
            Ok(reply) => match reply.generated_prompt {
                Some(text) if !text.trim().is_empty() => text,
                _ => return Err(self.fail(PromptError::Gateway(EMPTY_RESULT.to_string())).await),
            },
            Err(e) => return Err(self.fail(gateway_failure(e)).await),
        };

        let mut current = CurrentPrompt {
            result: GenerationResult { text },
            record_id: None,
            is_favorite: false,
        };

        if let Some(owner_id) = session.user_id() {
            self.state.lock().await.usage.consume();
            current.record_id = self.save(owner_id, &request, &current.result).await;
        }

        let mut state = self.state.lock().await;
        state.phase = GenerationState::Succeeded;
        state.current = Some(current.clone());
        Ok(SubmitOutcome::Generated(current))
    }

    /// Best-effort save: the generation already succeeded, so a failure is only logged.
    async fn save(
        &self,
        owner_id: Uuid,
        request: &GenerationRequest,
        result: &GenerationResult,
    ) -> Option<Uuid> {
        let record = NewPromptRecord {
            owner_id,
            goal: request.goal.clone(),
            generated_text: result.text.clone(),
            category: request.category,
            is_favorite: false,
        };
        match self.store.insert_prompt(record).await {
            Ok(id) => {
                info!("Saved generated prompt {} for user {}", id, owner_id);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to save generated prompt for user {}: {}", owner_id, e);
                None
            }
        }
    }

    async fn fail(&self, error: PromptError) -> PromptError {
        let mut state = self.state.lock().await;
        state.phase = GenerationState::Failed {
            message: error.to_string(),
        };
        error
    }

    /// Copies arbitrary text to the clipboard.
    pub async fn copy(&self, text: &str) -> PromptResult<()> {
        self.clipboard
            .write_text(text)
            .await
            .map_err(|e| PromptError::Clipboard(e.to_string()))
    }

    /// Copies the prompt currently on screen.
    pub async fn copy_result(&self) -> PromptResult<()> {
        let text = self
            .current()
            .await
            .map(|c| c.result.text)
            .ok_or_else(|| PromptError::Clipboard("nothing to copy".to_string()))?;
        self.copy(&text).await
    }

    /// Flips the favorite flag of the prompt on screen, reverting on failure.
    pub async fn toggle_favorite(&self, session: &SessionContext) -> PromptResult<FavoriteOutcome> {
        let Some(owner_id) = session.user_id() else {
            return Ok(FavoriteOutcome::SignInRequired);
        };

        let (record_id, write) = {
            let mut state = self.state.lock().await;
            let Some(current) = state.current.as_mut() else {
                return Ok(FavoriteOutcome::SignInRequired);
            };
            let Some(record_id) = current.record_id else {
                return Ok(FavoriteOutcome::SignInRequired);
            };
            let next = !current.is_favorite;
            (record_id, OptimisticWrite::apply(&mut current.is_favorite, next))
        };

        let outcome = self
            .store
            .set_favorite(record_id, owner_id, *write.applied())
            .await;

        let mut state = self.state.lock().await;
        let slot = state
            .current
            .as_mut()
            .filter(|c| c.record_id == Some(record_id))
            .map(|c| &mut c.is_favorite);
        let is_favorite = write.settle(outcome, slot)?;
        Ok(FavoriteOutcome::Updated { is_favorite })
    }

    /// Replaces the local hint with the server's authoritative figure.
    pub async fn refresh_usage(
        &self,
        session: &SessionContext,
        source: &dyn UsageService,
    ) -> PromptResult<u32> {
        let owner_id = session.user_id().ok_or(PromptError::SignInRequired)?;
        let usage = source.daily_usage(owner_id).await?;
        let mut state = self.state.lock().await;
        state.usage.sync(&usage);
        Ok(state.usage.daily_uses_left())
    }

    pub async fn handle_session_event(&self, event: &SessionEvent) {
        let mut state = self.state.lock().await;
        match event {
            SessionEvent::SignedIn(_) => state.usage.reset(),
            SessionEvent::SignedOut => {
                if let Some(current) = state.current.as_mut() {
                    current.record_id = None;
                    current.is_favorite = false;
                }
            }
        }
    }
}

/// Returns the controller to `Idle` if a `submit` future is dropped while its
/// attempt is still `Pending`. Completed attempts have already left `Pending`.
struct PendingGuard<'a> {
    state: &'a Mutex<ControllerState>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        match self.state.try_lock() {
            Ok(mut state) if state.phase == GenerationState::Pending => {
                warn!("Prompt generation was cancelled before it finished");
                state.phase = GenerationState::Idle;
            }
            Ok(_) => {}
            Err(_) => warn!("Could not reset the generation state after cancellation"),
        }
    }
}

fn gateway_failure(error: PortError) -> PromptError {
    match error {
        PortError::QuotaExceeded => PromptError::QuotaExceeded,
        PortError::Rejected(message) if !message.trim().is_empty() => PromptError::Gateway(message),
        _ => PromptError::Gateway(GENERIC_FAILURE.to_string()),
    }
}

//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use promptt_core::ports::{DatabaseService, PromptGenerationService, PromptStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub prompts: Arc<dyn PromptStore>,
    pub generator: Arc<dyn PromptGenerationService>,
    pub config: Arc<Config>,
}

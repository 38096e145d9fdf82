//! crates/promptt_core/src/error.rs
//!
//! Errors surfaced by the generation and history flows.

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    /// The goal was empty or whitespace-only. No network call was made.
    #[error("goal required")]
    EmptyGoal,

    /// The signed-in user has no generations left today. Callers route to the upgrade flow.
    #[error("daily prompt limit reached")]
    QuotaExceeded,

    /// Transport failure, non-success response, or an empty success payload.
    #[error("{0}")]
    Gateway(String),

    #[error("storage error: {0}")]
    Store(#[from] PortError),

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error("sign in required")]
    SignInRequired,
}

pub type PromptResult<T> = Result<T, PromptError>;

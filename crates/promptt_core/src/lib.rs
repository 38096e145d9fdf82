pub mod controller;
pub mod domain;
pub mod error;
pub mod history;
pub mod optimistic;
pub mod ports;
pub mod protocol;
pub mod session;
pub mod usage;

#[cfg(test)]
mod testing;

pub use controller::{
    CurrentPrompt, FavoriteOutcome, GenerationState, PromptGenerationController, SubmitOutcome,
};
pub use domain::{
    AuthSession, Category, DailyUsage, GenerationRequest, GenerationResult, NewPromptRecord,
    PromptRecord, User, UserCredentials, MIN_PASSWORD_LEN,
};
pub use error::{PromptError, PromptResult};
pub use history::{HistoryView, HistoryViewer};
pub use ports::{
    Clipboard, DatabaseService, GatewayReply, GenerationGateway, PortError, PortResult,
    PromptGenerationService, PromptStore, UsageService,
};
pub use session::{SessionContext, SessionEvent};
pub use usage::{UsageCounter, FREE_DAILY_ALLOTMENT};

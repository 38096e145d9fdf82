//! crates/promptt_client/src/lib.rs
//!
//! Adapters that let the core flows talk to the Promptt API over HTTP, plus
//! the local pieces (session file, clipboard) the command-line front end needs.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod session;
pub mod store;

pub use clipboard::CommandClipboard;
pub use gateway::HttpGenerationGateway;
pub use http::ApiClient;
pub use session::{AuthClient, SessionFile, StoredSession};
pub use store::HttpPromptStore;

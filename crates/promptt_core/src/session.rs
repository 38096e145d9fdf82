//! crates/promptt_core/src/session.rs
//!
//! The explicit session handle threaded through every controller and history call.

use uuid::Uuid;

use crate::domain::User;

/// Sign-in transitions reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<User>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        self.user = match event {
            SessionEvent::SignedIn(user) => Some(user.clone()),
            SessionEvent::SignedOut => None,
        };
    }
}

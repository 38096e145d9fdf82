//! crates/promptt_client/src/session.rs
//!
//! Talks to the session provider routes and keeps the resulting token on disk
//! between invocations.

use promptt_core::{
    domain::{User, MIN_PASSWORD_LEN},
    protocol::{AuthResponseBody, CredentialsBody, PasswordChangeBody},
};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::http::{error_message, ApiClient};

/// What survives between runs: the bearer token and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl StoredSession {
    pub fn user(&self) -> User {
        User {
            id: self.user_id,
            email: self.email.clone(),
        }
    }
}

//=========================================================================================
// Session File
//=========================================================================================

pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub async fn load(&self) -> ClientResult<Option<StoredSession>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(session)?).await?;
        Ok(())
    }

    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

//=========================================================================================
// Auth Client
//=========================================================================================

pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn signup(&self, email: &str, password: &str) -> ClientResult<StoredSession> {
        self.open("/auth/signup", email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<StoredSession> {
        self.open("/auth/login", email, password).await
    }

    async fn open(&self, path: &str, email: &str, password: &str) -> ClientResult<StoredSession> {
        let response = self
            .api
            .request(Method::POST, path)
            .json(&CredentialsBody {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body: AuthResponseBody = response.json().await?;
        let token = body.token.ok_or_else(|| ClientError::Api {
            status: status.as_u16(),
            message: "response carried no session token".to_string(),
        })?;
        info!("Signed in as {}", body.user_id);
        Ok(StoredSession {
            token,
            user_id: body.user_id,
            email: body.email,
        })
    }

    /// Ends the session server-side. A session the server no longer knows is already over.
    pub async fn logout(&self) -> ClientResult<()> {
        if self.api.token().is_none() {
            return Err(ClientError::NotSignedIn);
        }
        let response = self.api.request(Method::POST, "/auth/logout").send().await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let message = error_message(response).await;
            warn!("Logout answered {}: {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Sets a new password for the signed-in user. Mismatched or short
    /// passwords are refused without a request.
    pub async fn change_password(&self, password: &str, confirmation: &str) -> ClientResult<()> {
        if self.api.token().is_none() {
            return Err(ClientError::NotSignedIn);
        }
        if password != confirmation {
            return Err(ClientError::InvalidPassword("Passwords do not match".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::InvalidPassword(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let response = self
            .api
            .request(Method::POST, "/auth/password")
            .json(&PasswordChangeBody {
                password: password.to_string(),
                confirm_password: Some(confirmation.to_string()),
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        info!("Password updated");
        Ok(())
    }

    /// The user behind the current token, or `None` when the server rejects it.
    pub async fn me(&self) -> ClientResult<Option<User>> {
        if self.api.token().is_none() {
            return Ok(None);
        }
        let response = self.api.request(Method::GET, "/auth/me").send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body: AuthResponseBody = response.json().await?;
        Ok(Some(body.user()))
    }
}

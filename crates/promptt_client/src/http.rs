//! crates/promptt_client/src/http.rs
//!
//! The shared HTTP plumbing behind every client adapter.

use promptt_core::{ports::PortError, protocol::ErrorBody};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

/// A base URL plus the optional session token sent as `Authorization: Bearer`.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// The `error` text of a non-success response, or an empty string when the
/// body is missing or not the expected shape.
pub(crate) async fn error_message(response: Response) -> String {
    response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_default()
}

pub(crate) fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Maps a response onto the port error vocabulary, passing 2xx through.
pub(crate) async fn check(response: Response) -> Result<Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response).await;
    Err(match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => PortError::QuotaExceeded,
        _ => PortError::Rejected(message),
    })
}

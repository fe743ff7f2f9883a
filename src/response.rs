//! Wrapper around raw responses from the Mattermost API.
//!
//! A response is inspected in two steps: first for an error (a structured
//! `AppError` body, or a failed HTTP exchange), then for its entity. The
//! two checks below offer the batch policy (`check_for_api_error`: report
//! and carry on) and the abort policy (`throw_on_api_error`).

use std::fmt;
use std::marker::PhantomData;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CommandResult, RemoteApiError, TransportError, API_ERROR_CONTEXT};
use crate::ui::Console;

/// Error payload returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub status_code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub detailed_error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl RemoteError {
    /// Error synthesized from a failed exchange whose body is not an `AppError`.
    fn from_status(status: u16, body: &str) -> Self {
        let message = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown status")
            .to_string();
        RemoteError {
            status_code: i32::from(status),
            message,
            detailed_error: body.trim().to_string(),
            id: None,
            request_id: None,
        }
    }
}

/// `"<context>: [<statusCode>] [<message>] (<detailedMessage>)"`
pub fn format_api_error_message(context: &str, error: &RemoteError) -> String {
    format!(
        "{}: [{}] [{}] ({})",
        context, error.status_code, error.message, error.detailed_error
    )
}

/// Which remote status codes count as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusPolicy {
    /// Anything strictly above 200, including 201 and 204.
    #[default]
    AboveOk,
    /// Only 4xx and 5xx.
    ClientOrServer,
}

impl StatusPolicy {
    pub fn is_error(self, status_code: i32) -> bool {
        match self {
            StatusPolicy::AboveOk => status_code > 200,
            StatusPolicy::ClientOrServer => status_code >= 400,
        }
    }
}

/// Raw response to a call whose successful payload is a `T`.
pub struct ApiResponse<T> {
    status: u16,
    body: String,
    policy: StatusPolicy,
    entity: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for ApiResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("status", &self.status)
            .field("body", &self.body)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
            policy: StatusPolicy::default(),
            entity: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// HTTP status of the exchange.
    pub fn status(&self) -> u16 {
        self.status
    }

    fn transport_failed(&self) -> bool {
        !(200..300).contains(&self.status)
    }

    /// The error carried by this response, if any.
    ///
    /// A body that deserializes as an `AppError` always wins; otherwise a
    /// failed exchange yields an error built from the HTTP status.
    pub fn read_error(&self) -> Option<RemoteError> {
        if let Ok(error) = serde_json::from_str::<RemoteError>(&self.body) {
            return Some(error);
        }
        if self.transport_failed() {
            return Some(RemoteError::from_status(self.status, &self.body));
        }
        None
    }

    pub fn has_error(&self) -> bool {
        self.flagged_error().is_some()
    }

    fn flagged_error(&self) -> Option<RemoteError> {
        self.read_error()
            .filter(|error| self.policy.is_error(error.status_code))
    }

    /// Raises the response's error, if any, as a typed failure.
    pub fn throw_on_api_error(&self) -> Result<(), RemoteApiError> {
        match self.flagged_error() {
            Some(error) => Err(RemoteApiError::new(error)),
            None => Ok(()),
        }
    }

    /// Reports the response's error, if any, and tells whether there was one.
    pub fn check_for_api_error(&self, console: &mut Console) -> bool {
        match self.flagged_error() {
            Some(error) => {
                tracing::debug!(status = error.status_code, "remote call rejected");
                console.error(format_api_error_message(API_ERROR_CONTEXT, &error));
                true
            }
            None => false,
        }
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    pub fn read_entity(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Throwing check followed by `read_entity`.
    pub fn entity(&self) -> CommandResult<T> {
        self.throw_on_api_error()?;
        Ok(self.read_entity()?)
    }
}

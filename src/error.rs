//! Error taxonomy shared by the client and every subcommand.

use std::path::PathBuf;

use thiserror::Error;

use crate::exitcode;
use crate::response::{format_api_error_message, RemoteError};

/// Context prefix used when a remote error is reported.
pub const API_ERROR_CONTEXT: &str = "Mattermost error";

/// The remote service answered with a structured error payload.
#[derive(Debug, Clone, Error)]
#[error("{}", format_api_error_message(.context, .error))]
pub struct RemoteApiError {
    pub context: String,
    pub error: RemoteError,
}

impl RemoteApiError {
    pub fn new(error: RemoteError) -> Self {
        Self::with_context(API_ERROR_CONTEXT, error)
    }

    pub fn with_context(context: impl Into<String>, error: RemoteError) -> Self {
        RemoteApiError {
            context: context.into(),
            error,
        }
    }

    pub fn status_code(&self) -> i32 {
        self.error.status_code
    }
}

/// Failure before a structured response could be obtained or read.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level outcome of a failed subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Result type for subcommand operations.
pub type CommandResult<T> = Result<T, CommandError>;

impl CommandError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CommandError::InvalidArgument(msg.into())
    }

    /// Exit code for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::RemoteApi(e) => e.status_code(),
            CommandError::Transport(_) => exitcode::TRANSPORT,
            CommandError::InvalidArgument(_) => exitcode::INVALID_ARGUMENT,
            CommandError::Unexpected(_) => exitcode::UNEXPECTED,
        }
    }

    /// Line printed ahead of the error message, if any.
    pub fn headline(&self) -> Option<&'static str> {
        match self {
            CommandError::RemoteApi(_) => None,
            CommandError::Transport(_) => {
                Some("An error occurred while processing response from server")
            }
            CommandError::InvalidArgument(_) => Some("Invalid argument"),
            CommandError::Unexpected(_) => Some("Unexpected error"),
        }
    }
}

impl From<url::ParseError> for CommandError {
    fn from(error: url::ParseError) -> Self {
        CommandError::InvalidArgument(format!("invalid URL: {error}"))
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flock_core::ViewError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire discriminant of a [`FlockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateMember,
    MemberNotFound,
    KeyNotFound,
    Unsupported,
    ConnectionError,
    Timeout,
    UnreachableGroup,
    MalformedFile,
    InvalidConfig,
    ProviderNotFound,
    Io,
    Internal,
}

#[derive(Error, Debug)]
pub enum FlockError {
    #[error("duplicate member: {0}")]
    DuplicateMember(String),
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("metadata key not found: {0}")]
    KeyNotFound(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("group unreachable: {0}")]
    UnreachableGroup(String),
    #[error("malformed file: {0}")]
    MalformedFile(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("provider not found: {0}")]
    ProviderNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

/// `{ "error": { "kind": ..., "message": ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl FlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlockError::DuplicateMember(_) => ErrorKind::DuplicateMember,
            FlockError::MemberNotFound(_) => ErrorKind::MemberNotFound,
            FlockError::KeyNotFound(_) => ErrorKind::KeyNotFound,
            FlockError::Unsupported(_) => ErrorKind::Unsupported,
            FlockError::ConnectionError(_) => ErrorKind::ConnectionError,
            FlockError::Timeout(_) => ErrorKind::Timeout,
            FlockError::UnreachableGroup(_) => ErrorKind::UnreachableGroup,
            FlockError::MalformedFile(_) => ErrorKind::MalformedFile,
            FlockError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            FlockError::ProviderNotFound(_) => ErrorKind::ProviderNotFound,
            FlockError::Io(_) => ErrorKind::Io,
            FlockError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message without the kind prefix, as sent to remote callers.
    pub fn detail(&self) -> String {
        match self {
            FlockError::DuplicateMember(m)
            | FlockError::MemberNotFound(m)
            | FlockError::KeyNotFound(m)
            | FlockError::Unsupported(m)
            | FlockError::ConnectionError(m)
            | FlockError::Timeout(m)
            | FlockError::UnreachableGroup(m)
            | FlockError::MalformedFile(m)
            | FlockError::InvalidConfig(m)
            | FlockError::ProviderNotFound(m)
            | FlockError::Internal(m) => m.clone(),
            FlockError::Io(e) => e.to_string(),
        }
    }

    /// Rebuild an error received from a remote provider.
    pub fn from_remote(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::DuplicateMember => FlockError::DuplicateMember(message),
            ErrorKind::MemberNotFound => FlockError::MemberNotFound(message),
            ErrorKind::KeyNotFound => FlockError::KeyNotFound(message),
            ErrorKind::Unsupported => FlockError::Unsupported(message),
            ErrorKind::ConnectionError => FlockError::ConnectionError(message),
            ErrorKind::Timeout => FlockError::Timeout(message),
            ErrorKind::UnreachableGroup => FlockError::UnreachableGroup(message),
            ErrorKind::MalformedFile => FlockError::MalformedFile(message),
            ErrorKind::InvalidConfig => FlockError::InvalidConfig(message),
            ErrorKind::ProviderNotFound => FlockError::ProviderNotFound(message),
            ErrorKind::Io => FlockError::Io(std::io::Error::other(message)),
            ErrorKind::Internal => FlockError::Internal(message),
        }
    }

    /// Failures that mean "try the next candidate" during bootstrap.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            FlockError::ConnectionError(_) | FlockError::Timeout(_) | FlockError::ProviderNotFound(_)
        )
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::DuplicateMember => StatusCode::CONFLICT,
            ErrorKind::MemberNotFound | ErrorKind::KeyNotFound | ErrorKind::ProviderNotFound => {
                StatusCode::NOT_FOUND
            }
            ErrorKind::Unsupported => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::MalformedFile | ErrorKind::InvalidConfig => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FlockError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: ErrorBody {
                kind: self.kind(),
                message: self.detail(),
            },
        });

        (self.status(), body).into_response()
    }
}

impl From<ViewError> for FlockError {
    fn from(e: ViewError) -> Self {
        let message = e.to_string();
        match e {
            ViewError::DuplicateMember(_) => FlockError::DuplicateMember(message),
            ViewError::MemberNotFound(_) => FlockError::MemberNotFound(message),
            ViewError::KeyNotFound(_) => FlockError::KeyNotFound(message),
            ViewError::MalformedFile(_) => FlockError::MalformedFile(message),
            ViewError::Encode(_) => FlockError::Internal(message),
        }
    }
}

impl From<reqwest::Error> for FlockError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FlockError::Timeout(e.to_string())
        } else if e.is_decode() {
            FlockError::Internal(format!("invalid response: {e}"))
        } else if e.is_builder() {
            FlockError::ConnectionError(format!("invalid request: {e}"))
        } else {
            FlockError::ConnectionError(e.to_string())
        }
    }
}

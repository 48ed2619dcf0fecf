// src/api/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::api::types::ErrorBody;

/// Failures reported by the directory size endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SizeError {
    #[error("Path is empty")]
    InvalidRequest,
    #[error("Path not found")]
    NotFound,
    /// The caller went away before the walk finished.
    #[error("Size computation cancelled")]
    Cancelled,
    #[error("Size computation failed")]
    Internal,
}

impl SizeError {
    pub fn status(&self) -> StatusCode {
        match self {
            SizeError::InvalidRequest => StatusCode::BAD_REQUEST,
            SizeError::NotFound => StatusCode::NOT_FOUND,
            SizeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            SizeError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SizeError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// A single entry the walk could not stat. Never leaves the traversal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot read {}: {reason}", .path.display())]
pub struct UnreadableEntry {
    pub path: PathBuf,
    pub reason: String,
}

impl UnreadableEntry {
    pub fn new(path: &Path, reason: impl Display) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Client-side failures of a size query. Every variant drops the row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Body(String),
    #[error("dispatch cancelled")]
    Cancelled,
    #[error("dispatch job {0} is already running")]
    JobExists(String),
}

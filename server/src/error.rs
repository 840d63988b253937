//! HTTP-facing error type and the JSON response helper.
//!
//! # Design
//! Parser failures and a failed group-affiliation check are the caller's
//! fault and come back as 400 with a message naming the problem. A missing or
//! unknown session is 401. Everything else is a 500 whose details stay in the
//! logs; the body only says "internal server error".

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use todo_search_core::{CompileError, ParamError};

use crate::affiliation::AffiliationError;
use crate::config::ConfigError;
use crate::executor::ExecutorError;
use crate::session::SessionError;

/// Every response body is JSON in UTF-8.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

const FALLBACK_BODY: &str = r#"{"error":{"code":"INTERNAL","message":"internal server error"}}"#;

/// Errors a search handler can end with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    BadRequest(#[from] ParamError),

    #[error("session cookie missing or unknown")]
    Unauthenticated,

    #[error("user {user_id} does not belong to group {group_id}")]
    NotGroupMember { group_id: i64, user_id: String },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Affiliation(#[from] AffiliationError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("search did not finish within {0:?}")]
    Timeout(Duration),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::NotGroupMember { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Compile(_)
            | AppError::Session(_)
            | AppError::Affiliation(_)
            | AppError::Executor(_)
            | AppError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::NotGroupMember { .. } => "NOT_GROUP_MEMBER",
            _ => "INTERNAL",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(err) => err.to_string(),
            AppError::Unauthenticated => "login required".to_string(),
            AppError::NotGroupMember { .. } => "you do not belong to this group".to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "search request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "search request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.public_message(),
            },
        };
        json_response(status, &body)
    }
}

/// Serialize `body` with the UTF-8 JSON content type.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(err) => {
            tracing::error!(error = %err, "response serialization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                FALLBACK_BODY.as_bytes().to_vec(),
            )
        }
    };
    let mut response = (status, bytes).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    response
}

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("mysql: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Affiliation(#[from] AffiliationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Error as AnyhowError;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::assessments::AssessmentError;
use common::input::InputError;
use common::permission::Denied;
use common::polls::PollError;
use common::storage::StorageError;
use common::types::BaseResponse;
use sea_orm::DbErr;
use std::fmt;

#[derive(Debug)]
pub enum WebError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    ServiceUnavailable(String),
    Database(DbErr),
    InputValidation(InputError),
    JsonParsing(JsonRejection),
    QueryParsing(QueryRejection),
    Upload(MultipartError),
    Storage(StorageError),
    Internal(AnyhowError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            WebError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            WebError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            WebError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            WebError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            WebError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            WebError::Database(err) => write!(f, "Database error: {}", err),
            WebError::InputValidation(err) => write!(f, "Input validation error: {}", err),
            WebError::JsonParsing(err) => write!(f, "JSON parsing error: {}", err),
            WebError::QueryParsing(err) => write!(f, "Query parsing error: {}", err),
            WebError::Upload(err) => write!(f, "Upload error: {}", err),
            WebError::Storage(err) => write!(f, "Storage error: {}", err),
            WebError::Internal(err) => write!(f, "Internal error: {}", err),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebError::Database(err) => Some(err),
            WebError::InputValidation(err) => Some(err),
            WebError::JsonParsing(err) => Some(err),
            WebError::QueryParsing(err) => Some(err),
            WebError::Upload(err) => Some(err),
            WebError::Storage(err) => Some(err),
            WebError::Internal(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DbErr> for WebError {
    fn from(err: DbErr) -> Self {
        WebError::Database(err)
    }
}

impl From<InputError> for WebError {
    fn from(err: InputError) -> Self {
        WebError::InputValidation(err)
    }
}

impl From<JsonRejection> for WebError {
    fn from(err: JsonRejection) -> Self {
        WebError::JsonParsing(err)
    }
}

impl From<QueryRejection> for WebError {
    fn from(err: QueryRejection) -> Self {
        WebError::QueryParsing(err)
    }
}

impl From<MultipartError> for WebError {
    fn from(err: MultipartError) -> Self {
        WebError::Upload(err)
    }
}

impl From<StorageError> for WebError {
    fn from(err: StorageError) -> Self {
        WebError::Storage(err)
    }
}

impl From<AnyhowError> for WebError {
    fn from(err: AnyhowError) -> Self {
        WebError::Internal(err)
    }
}

impl From<Denied> for WebError {
    fn from(err: Denied) -> Self {
        match err {
            Denied::Forbidden(msg) => WebError::Forbidden(msg),
            Denied::Rejected(msg) => WebError::BadRequest(msg),
        }
    }
}

impl From<PollError> for WebError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::NotEligible => WebError::Forbidden(err.to_string()),
            PollError::AlreadyVoted => WebError::Conflict(err.to_string()),
            _ => WebError::BadRequest(err.to_string()),
        }
    }
}

impl From<AssessmentError> for WebError {
    fn from(err: AssessmentError) -> Self {
        WebError::BadRequest(err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            WebError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            WebError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            WebError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            WebError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            WebError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "خطای پایگاه داده".to_string(),
                )
            }
            WebError::InputValidation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            WebError::JsonParsing(err) => (
                StatusCode::BAD_REQUEST,
                format!("داده ارسالی معتبر نیست: {}", err.body_text()),
            ),
            WebError::QueryParsing(err) => (
                StatusCode::BAD_REQUEST,
                format!("پارامترهای درخواست معتبر نیستند: {}", err.body_text()),
            ),
            WebError::Upload(err) => (
                StatusCode::BAD_REQUEST,
                format!("خطا در دریافت فایل: {}", err.body_text()),
            ),
            WebError::Storage(err) => match err {
                StorageError::TooLarge { .. } | StorageError::Empty => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                _ => {
                    tracing::error!("Storage error: {}", err);
                    (
                        StatusCode::BAD_GATEWAY,
                        "خطا در ذخیره‌سازی فایل".to_string(),
                    )
                }
            },
            WebError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "خطای داخلی سرور".to_string(),
                )
            }
        };

        let body = Json(BaseResponse {
            error: true,
            message: error_message,
        });

        (status, body).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn already_exists(resource: &str) -> Self {
        WebError::Conflict(format!("{} تکراری است", resource))
    }

    pub fn not_found(resource: &str) -> Self {
        WebError::NotFound(format!("{} یافت نشد", resource))
    }

    pub fn invalid_credentials() -> Self {
        WebError::Unauthorized("شماره موبایل یا رمز عبور اشتباه است".to_string())
    }

    pub fn failed_to_generate_token() -> Self {
        WebError::Internal(anyhow::anyhow!("Failed to generate token"))
    }

    pub fn storage_disabled() -> Self {
        WebError::ServiceUnavailable("سرویس ذخیره‌سازی فایل پیکربندی نشده است".to_string())
    }
}

use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::LOCATION};
use derive_more::Display;
use serde::Serialize;
use serde_json::json;

use crate::store::StoreError;

/// Where an unauthenticated caller is sent.
pub const LOGIN_PATH: &str = "/auth/login";
/// Generic denial page for authenticated callers with the wrong role.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Field name -> message, collected at the data-entry boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "authentication required")]
    Unauthenticated,

    #[display(fmt = "not authorized for this operation")]
    Unauthorized,

    #[display(fmt = "validation failed")]
    Validation(FieldErrors),

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "conflict: {}", _0)]
    Conflict(String),

    #[display(fmt = "internal error: {}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) | StoreError::DuplicateCode(msg) => AppError::Conflict(msg),
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::Unauthorized => StatusCode::FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthenticated => HttpResponse::Found()
                .insert_header((LOCATION, LOGIN_PATH))
                .json(json!({ "error": self.to_string() })),
            AppError::Unauthorized => HttpResponse::Found()
                .insert_header((LOCATION, UNAUTHORIZED_PATH))
                .json(json!({ "error": self.to_string() })),
            AppError::Validation(errors) => {
                HttpResponse::BadRequest().json(json!({ "errors": errors }))
            }
            AppError::NotFound(_) | AppError::Conflict(_) => {
                HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
            }
            AppError::Internal(details) => {
                tracing::error!(error = %details, "Request failed");
                HttpResponse::InternalServerError().json(json!({
                    "message": "Something went wrong, Contact with system admin"
                }))
            }
        }
    }
}

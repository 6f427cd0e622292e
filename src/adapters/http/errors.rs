use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::domain::invoice::InvoiceError;

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Invoice number already taken (409 Conflict)
  DuplicateInvoiceNumber(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::DuplicateInvoiceNumber(msg) => write!(f, "Conflict: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::DuplicateInvoiceNumber(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone()),
      ApiError::DuplicateInvoiceNumber(msg) => ("duplicate_invoice_number", msg.clone()),
      ApiError::Internal(msg) => {
        // Storage details stay in the logs
        tracing::error!("Internal error: {}", msg);
        ("internal_error", "Failed to create invoice".to_string())
      }
    };

    let error_response = ErrorResponse {
      error: error_type.to_string(),
      message,
      details: None,
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::Validation(err) => ApiError::Validation(err.to_string()),
      err @ InvoiceError::InvoiceNumberAlreadyExists(_) => {
        ApiError::DuplicateInvoiceNumber(err.to_string())
      }
      err => ApiError::Internal(err.to_string()),
    }
  }
}

/// Convert validator errors, including those of nested line items, to ApiError
impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    let mut messages = Vec::new();
    collect_messages("", &errors, &mut messages);
    messages.sort();
    ApiError::Validation(messages.join(", "))
  }
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
  for (field, kind) in errors.errors() {
    let path = format!("{}{}", prefix, field);
    match kind {
      ValidationErrorsKind::Field(field_errors) => {
        out.extend(field_errors.iter().map(|error| {
          error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Invalid field: {}", path))
        }));
      }
      ValidationErrorsKind::Struct(inner) => {
        collect_messages(&format!("{}.", path), inner, out);
      }
      ValidationErrorsKind::List(items) => {
        for (index, inner) in items {
          collect_messages(&format!("{}[{}].", path, index), inner, out);
        }
      }
    }
  }
}

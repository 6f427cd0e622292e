use super::value_objects::ValueObjectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invoice number {0} already exists.")]
  InvoiceNumberAlreadyExists(String),

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl InvoiceError {
  /// True for failures the caller caused and can correct. Everything else is a
  /// storage or internal failure whose cause must not leave the service.
  pub fn is_caller_error(&self) -> bool {
    matches!(
      self,
      InvoiceError::Validation(_) | InvoiceError::InvoiceNumberAlreadyExists(_)
    )
  }
}

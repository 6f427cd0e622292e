use async_trait::async_trait;

use super::entities::{Invoice, InvoiceLineItem};
use super::errors::InvoiceError;
use super::value_objects::{InvoiceNumber, ReservationId};

/// Transactional data store for invoices.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
  /// Acquire one exclusive connection and open a transaction on it.
  async fn begin(&self) -> Result<Box<dyn InvoiceTransaction>, InvoiceError>;
}

/// A single open transaction.
///
/// Implementations own their connection. Dropping a transaction that was
/// neither committed nor rolled back must discard its writes and give the
/// connection back.
#[async_trait]
pub trait InvoiceTransaction: Send {
  async fn invoice_number_exists(
    &mut self,
    invoice_number: &InvoiceNumber,
  ) -> Result<bool, InvoiceError>;

  /// Insert the header row and return its generated id.
  async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<i64, InvoiceError>;

  /// Link a reservation to an invoice. Returns `false` when the link already
  /// existed.
  async fn link_reservation(
    &mut self,
    invoice_id: i64,
    reservation_id: ReservationId,
  ) -> Result<bool, InvoiceError>;

  async fn insert_line_item(&mut self, line_item: &InvoiceLineItem) -> Result<i64, InvoiceError>;

  async fn commit(self: Box<Self>) -> Result<(), InvoiceError>;

  async fn rollback(self: Box<Self>) -> Result<(), InvoiceError>;
}

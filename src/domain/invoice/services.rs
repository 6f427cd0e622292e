use std::sync::Arc;

use super::entities::{CreatedInvoice, Invoice, InvoiceData, InvoiceLineItem, InvoiceTotals};
use super::errors::InvoiceError;
use super::ports::{InvoiceStore, InvoiceTransaction};

pub struct InvoiceService {
  store: Arc<dyn InvoiceStore>,
}

impl InvoiceService {
  pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
    Self { store }
  }

  /// Create an invoice with its reservation links and line items in one
  /// transaction.
  ///
  /// Totals are computed from the line items. On any failure the transaction
  /// is rolled back and nothing from this call is persisted.
  pub async fn create_invoice(&self, data: InvoiceData) -> Result<CreatedInvoice, InvoiceError> {
    let mut tx = self.store.begin().await?;

    match Self::write_invoice(tx.as_mut(), data).await {
      Ok(created) => {
        if let Err(err) = tx.commit().await {
          tracing::error!("Invoice commit failed: {}", err);
          return Err(err);
        }
        tracing::info!(
          invoice_id = created.invoice_id,
          sub_total = %created.totals.sub_total,
          tax_total = %created.totals.tax_total,
          grand_total = %created.totals.grand_total,
          "Invoice created"
        );
        Ok(created)
      }
      Err(err) => {
        if err.is_caller_error() {
          tracing::warn!("Invoice creation rejected: {}", err);
        } else {
          tracing::error!("Invoice creation failed, rolling back: {}", err);
        }
        if let Err(rollback_err) = tx.rollback().await {
          tracing::error!("Rollback failed: {}", rollback_err);
        }
        Err(err)
      }
    }
  }

  async fn write_invoice(
    tx: &mut dyn InvoiceTransaction,
    data: InvoiceData,
  ) -> Result<CreatedInvoice, InvoiceError> {
    // Check for duplicate number before any write
    if let Some(number) = &data.header.invoice_number {
      if tx.invoice_number_exists(number).await? {
        return Err(InvoiceError::InvoiceNumberAlreadyExists(
          number.value().to_string(),
        ));
      }
    }

    let totals = InvoiceTotals::calculate(&data.line_items)?;
    let invoice = Invoice::new(data.header, &data.reservation_ids, totals);
    let invoice_id = tx.insert_invoice(&invoice).await?;

    for reservation_id in &data.reservation_ids {
      if !tx.link_reservation(invoice_id, *reservation_id).await? {
        tracing::debug!(
          invoice_id,
          reservation_id = reservation_id.value(),
          "Reservation already linked"
        );
      }
    }

    for (i, item) in data.line_items.into_iter().enumerate() {
      let line_item = InvoiceLineItem::new(invoice_id, (i + 1) as i32, item);
      tx.insert_line_item(&line_item).await?;
    }

    Ok(CreatedInvoice { invoice_id, totals })
  }
}

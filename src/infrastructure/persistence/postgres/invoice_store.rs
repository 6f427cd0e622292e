use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::invoice::{
  Invoice, InvoiceError, InvoiceLineItem, InvoiceNumber, InvoiceStore, InvoiceTransaction,
  ReservationId,
};

const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_invoice_number_unique";

pub struct PostgresInvoiceStore {
  pool: PgPool,
}

impl PostgresInvoiceStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
  async fn begin(&self) -> Result<Box<dyn InvoiceTransaction>, InvoiceError> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PostgresInvoiceTransaction { tx }))
  }
}

/// Wraps a sqlx transaction. An uncommitted `Transaction` rolls back and
/// returns its connection to the pool when dropped.
pub struct PostgresInvoiceTransaction {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl InvoiceTransaction for PostgresInvoiceTransaction {
  async fn invoice_number_exists(
    &mut self,
    invoice_number: &InvoiceNumber,
  ) -> Result<bool, InvoiceError> {
    let exists = sqlx::query_scalar::<_, bool>(
      "SELECT EXISTS(SELECT 1 FROM invoices WHERE invoice_number = $1)",
    )
    .bind(invoice_number.value())
    .fetch_one(&mut *self.tx)
    .await?;

    Ok(exists)
  }

  async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<i64, InvoiceError> {
    let header = &invoice.header;

    let id = sqlx::query_scalar::<_, i64>(
      r#"
            INSERT INTO invoices (
                invoice_number, reservation_id, invoice_date, invoice_to,
                state_for_billing, pan_number, status, payment_method, currency,
                conversion_rate, sub_total, tax_total, grand_total,
                display_taxes, display_food_charge, extra_services,
                services_name, services_amount, pdf_password, page_break,
                guest_name_width, round_off_value
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            RETURNING id
            "#,
    )
    .bind(header.invoice_number.as_ref().map(|n| n.value()))
    .bind(invoice.reservation_id.map(|id| id.value()))
    .bind(header.invoice_date)
    .bind(header.invoice_to.as_deref())
    .bind(header.state_for_billing.as_deref())
    .bind(header.pan_number.as_deref())
    .bind(header.status.as_deref())
    .bind(header.payment_method.as_deref())
    .bind(header.currency.as_deref())
    .bind(header.conversion_rate.value())
    .bind(invoice.totals.sub_total)
    .bind(invoice.totals.tax_total)
    .bind(invoice.totals.grand_total)
    .bind(header.display_taxes)
    .bind(header.display_food_charge)
    .bind(header.extra_services)
    .bind(header.services_name.as_deref())
    .bind(header.services_amount.value())
    .bind(header.pdf_password.as_ref().map(|p| p.expose()))
    .bind(header.page_break.value())
    .bind(header.guest_name_width.value())
    .bind(header.round_off_value)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(|e| {
      if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL unique violation code
        if db_err.code().as_deref() == Some("23505")
          && db_err.constraint() == Some(INVOICE_NUMBER_CONSTRAINT)
        {
          if let Some(number) = &header.invoice_number {
            return InvoiceError::InvoiceNumberAlreadyExists(number.value().to_string());
          }
        }
      }
      InvoiceError::Database(e)
    })?;

    Ok(id)
  }

  async fn link_reservation(
    &mut self,
    invoice_id: i64,
    reservation_id: ReservationId,
  ) -> Result<bool, InvoiceError> {
    let result = sqlx::query(
      r#"
      INSERT INTO invoice_reservations (invoice_id, reservation_id)
      VALUES ($1, $2)
      ON CONFLICT DO NOTHING
      "#,
    )
    .bind(invoice_id)
    .bind(reservation_id.value())
    .execute(&mut *self.tx)
    .await?;

    Ok(result.rows_affected() > 0)
  }

  async fn insert_line_item(&mut self, line_item: &InvoiceLineItem) -> Result<i64, InvoiceError> {
    let id = sqlx::query_scalar::<_, i64>(
      r#"
            INSERT INTO invoice_items (
                invoice_id, location, description, hsn_sac_code,
                days, rate, tax_amount, total_amount, line_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
    )
    .bind(line_item.invoice_id)
    .bind(line_item.location.as_deref())
    .bind(line_item.description.as_deref())
    .bind(line_item.hsn_sac_code.as_deref())
    .bind(line_item.days.value())
    .bind(line_item.rate.value())
    .bind(line_item.tax_amount.value())
    .bind(line_item.total_amount.value())
    .bind(line_item.line_order)
    .fetch_one(&mut *self.tx)
    .await?;

    Ok(id)
  }

  async fn commit(self: Box<Self>) -> Result<(), InvoiceError> {
    self.tx.commit().await?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<(), InvoiceError> {
    self.tx.rollback().await?;
    Ok(())
  }
}

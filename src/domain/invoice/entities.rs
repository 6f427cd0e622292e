use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::value_objects::{Amount, InvoiceNumber, PdfPassword, ReservationId, ValueObjectError};

// Invoice Header - everything the caller supplies about the invoice itself
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceHeader {
  pub invoice_number: Option<InvoiceNumber>,
  pub invoice_date: Option<NaiveDate>,
  pub invoice_to: Option<String>,
  pub state_for_billing: Option<String>,
  pub pan_number: Option<String>,
  pub status: Option<String>,
  pub payment_method: Option<String>,
  pub currency: Option<String>,
  pub conversion_rate: Amount,
  pub display_taxes: bool,
  pub display_food_charge: bool,
  pub extra_services: bool,
  pub services_name: Option<String>,
  pub services_amount: Amount,
  pub pdf_password: Option<PdfPassword>,
  pub page_break: Amount,
  pub guest_name_width: Amount,
  /// Signed; round-off adjustments may reduce the payable amount.
  pub round_off_value: Decimal,
}

// Line Item Data - one submitted charge line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineItemData {
  pub location: Option<String>,
  pub description: Option<String>,
  pub hsn_sac_code: Option<String>,
  pub days: Amount,
  pub rate: Amount,
  pub tax_amount: Amount,
  pub total_amount: Amount,
}

/// Invoice creation data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceData {
  pub header: InvoiceHeader,
  pub reservation_ids: Vec<ReservationId>,
  pub line_items: Vec<LineItemData>,
}

// Invoice - header row as persisted, totals derived from the line items
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
  pub header: InvoiceHeader,
  /// Legacy single-reservation column kept for older consumers. The
  /// reservation links are authoritative.
  pub reservation_id: Option<ReservationId>,
  pub totals: InvoiceTotals,
}

impl Invoice {
  pub fn new(
    header: InvoiceHeader,
    reservation_ids: &[ReservationId],
    totals: InvoiceTotals,
  ) -> Self {
    Self {
      header,
      reservation_id: reservation_ids.first().copied(),
      totals,
    }
  }
}

// Invoice Line Item - line row as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLineItem {
  pub invoice_id: i64,
  pub line_order: i32,
  pub location: Option<String>,
  pub description: Option<String>,
  pub hsn_sac_code: Option<String>,
  pub days: Amount,
  pub rate: Amount,
  pub tax_amount: Amount,
  pub total_amount: Amount,
}

impl InvoiceLineItem {
  pub fn new(invoice_id: i64, line_order: i32, data: LineItemData) -> Self {
    Self {
      invoice_id,
      line_order,
      location: data.location,
      description: data.description,
      hsn_sac_code: data.hsn_sac_code,
      days: data.days,
      rate: data.rate,
      tax_amount: data.tax_amount,
      total_amount: data.total_amount,
    }
  }
}

// Invoice Totals - computed server-side, never supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvoiceTotals {
  pub sub_total: Decimal,
  pub tax_total: Decimal,
  pub grand_total: Decimal,
}

impl InvoiceTotals {
  /// Sum each column over the line items. Fails instead of overflowing when
  /// a column leaves the `Decimal` range.
  pub fn calculate(line_items: &[LineItemData]) -> Result<Self, ValueObjectError> {
    line_items
      .iter()
      .try_fold(InvoiceTotals::default(), |acc, item| {
        Ok(InvoiceTotals {
          sub_total: checked_sum(acc.sub_total, item.rate, "subTotal")?,
          tax_total: checked_sum(acc.tax_total, item.tax_amount, "taxTotal")?,
          grand_total: checked_sum(acc.grand_total, item.total_amount, "grandTotal")?,
        })
      })
  }
}

fn checked_sum(
  total: Decimal,
  amount: Amount,
  column: &str,
) -> Result<Decimal, ValueObjectError> {
  total.checked_add(amount.value()).ok_or_else(|| {
    ValueObjectError::InvalidAmount(format!("{} exceeds the supported range", column))
  })
}

/// Result of a committed invoice creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedInvoice {
  pub invoice_id: i64,
  pub totals: InvoiceTotals,
}

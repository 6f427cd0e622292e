use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::invoice::{
  Amount, InvoiceData, InvoiceError, InvoiceHeader, InvoiceNumber, InvoiceService, LineItemData,
  NumericInput, PdfPassword, ReservationId, YesNoFlag, parse_invoice_date,
};

#[derive(Debug, Clone, Default)]
pub struct CreateInvoiceLineItemDto {
  pub location: Option<String>,
  /// Stored as the line item's description.
  pub food_tariff: Option<String>,
  /// Stored as the HSN/SAC classification code.
  pub gst_id: Option<String>,
  pub days: NumericInput,
  pub tariff: NumericInput,
  pub tax: NumericInput,
  pub total: NumericInput,
}

#[derive(Clone, Default)]
pub struct CreateInvoiceCommand {
  pub apartment_bill_no: Option<String>,
  pub reservation_ids: Vec<Value>,
  pub line_items: Vec<CreateInvoiceLineItemDto>,
  pub date: Option<String>,
  pub invoice_to: Option<String>,
  pub state_for_billing: Option<String>,
  pub pan: Option<String>,
  pub status: Option<String>,
  pub payment_method: Option<String>,
  pub currency: Option<String>,
  pub conversion_rate: NumericInput,
  pub display_taxes: YesNoFlag,
  pub display_food_charge: YesNoFlag,
  pub extra_services: YesNoFlag,
  pub services_name: Option<String>,
  pub services_amount: NumericInput,
  pub pdf_password: Option<PdfPassword>,
  pub page_break: NumericInput,
  pub guest_name_width: NumericInput,
  pub round_off_value: NumericInput,
}

impl std::fmt::Debug for CreateInvoiceCommand {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CreateInvoiceCommand")
      .field("apartment_bill_no", &self.apartment_bill_no)
      .field("reservation_ids", &self.reservation_ids)
      .field("line_items", &self.line_items.len())
      .field("date", &self.date)
      .finish_non_exhaustive()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInvoiceResponse {
  pub invoice_id: i64,
  pub sub_total: Decimal,
  pub tax_total: Decimal,
  pub grand_total: Decimal,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  #[tracing::instrument(
    name = "create_invoice",
    skip_all,
    fields(
      invoice_number = command.apartment_bill_no.as_deref().unwrap_or(""),
      line_items = command.line_items.len(),
    )
  )]
  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<CreateInvoiceResponse, InvoiceError> {
    let invoice_data = Self::to_invoice_data(command)?;

    let created = self.invoice_service.create_invoice(invoice_data).await?;

    Ok(CreateInvoiceResponse {
      invoice_id: created.invoice_id,
      sub_total: created.totals.sub_total,
      tax_total: created.totals.tax_total,
      grand_total: created.totals.grand_total,
    })
  }

  /// Resolve loosely-typed input into domain values. Runs before any storage
  /// access, so rejected input never opens a transaction.
  fn to_invoice_data(command: CreateInvoiceCommand) -> Result<InvoiceData, InvoiceError> {
    let invoice_number = InvoiceNumber::from_optional(command.apartment_bill_no)?;

    let invoice_date = command.date.as_deref().and_then(parse_invoice_date);
    if invoice_date.is_none() {
      tracing::debug!(date = ?command.date, "Invoice date missing or unparseable, storing none");
    }

    let reservation_ids = command
      .reservation_ids
      .iter()
      .map(ReservationId::from_json)
      .collect::<Result<Vec<_>, _>>()?;

    let line_items = command
      .line_items
      .into_iter()
      .enumerate()
      .map(|(i, item)| -> Result<LineItemData, InvoiceError> {
        let field = |name: &str| format!("lineItems[{}].{}", i, name);
        Ok(LineItemData {
          days: Amount::from_input(&item.days, &field("days"))?,
          rate: Amount::from_input(&item.tariff, &field("tariff"))?,
          tax_amount: Amount::from_input(&item.tax, &field("tax"))?,
          total_amount: Amount::from_input(&item.total, &field("total"))?,
          location: item.location,
          description: item.food_tariff,
          hsn_sac_code: item.gst_id,
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    let header = InvoiceHeader {
      invoice_number,
      invoice_date,
      invoice_to: command.invoice_to,
      state_for_billing: command.state_for_billing,
      pan_number: command.pan,
      status: command.status,
      payment_method: command.payment_method,
      currency: command.currency,
      conversion_rate: Amount::from_input(&command.conversion_rate, "conversionRate")?,
      display_taxes: command.display_taxes.is_set(),
      display_food_charge: command.display_food_charge.is_set(),
      extra_services: command.extra_services.is_set(),
      services_name: command.services_name,
      services_amount: Amount::from_input(&command.services_amount, "servicesAmount")?,
      pdf_password: command.pdf_password,
      page_break: Amount::from_input(&command.page_break, "pageBreak")?,
      guest_name_width: Amount::from_input(&command.guest_name_width, "guestNameWidth")?,
      round_off_value: command.round_off_value.resolve("roundOffValue")?,
    };

    Ok(InvoiceData {
      header,
      reservation_ids,
      line_items,
    })
  }
}

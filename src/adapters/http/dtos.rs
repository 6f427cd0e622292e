use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::invoice::{NumericInput, PdfPassword, YesNoFlag};

/// Line item as submitted by the billing front end
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInvoiceLineItemRequest {
  #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
  pub location: Option<String>,

  /// Free-text charge description
  #[validate(length(max = 255, message = "Food tariff must be at most 255 characters"))]
  pub food_tariff: Option<String>,

  /// HSN/SAC code
  #[validate(length(max = 50, message = "GST id must be at most 50 characters"))]
  pub gst_id: Option<String>,

  pub days: NumericInput,
  pub tariff: NumericInput,
  pub tax: NumericInput,
  pub total: NumericInput,
}

/// Request for invoice creation
///
/// Numeric fields accept numbers, numeric strings, blanks and nulls. Flags
/// accept `true` or `"Yes"`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInvoiceRequest {
  #[validate(length(max = 100, message = "Bill number must be at most 100 characters"))]
  pub apartment_bill_no: Option<String>,

  pub reservation_ids: Option<Vec<Value>>,

  #[validate(nested)]
  pub line_items: Option<Vec<CreateInvoiceLineItemRequest>>,

  #[validate(length(max = 64, message = "Date must be at most 64 characters"))]
  pub date: Option<String>,

  #[validate(length(max = 255, message = "Invoice recipient must be at most 255 characters"))]
  pub invoice_to: Option<String>,

  #[validate(length(max = 100, message = "Billing state must be at most 100 characters"))]
  pub state_for_billing: Option<String>,

  #[validate(length(max = 20, message = "PAN must be at most 20 characters"))]
  pub pan: Option<String>,

  #[validate(length(max = 50, message = "Status must be at most 50 characters"))]
  pub status: Option<String>,

  #[validate(length(max = 50, message = "Payment method must be at most 50 characters"))]
  pub payment_method: Option<String>,

  #[validate(length(max = 10, message = "Currency must be at most 10 characters"))]
  pub currency: Option<String>,

  pub conversion_rate: NumericInput,
  pub display_taxes: YesNoFlag,
  pub display_food_charge: YesNoFlag,
  pub extra_services: YesNoFlag,

  #[validate(length(max = 255, message = "Services name must be at most 255 characters"))]
  pub services_name: Option<String>,

  pub services_amount: NumericInput,
  pub pdf_password: Option<PdfPassword>,
  pub page_break: NumericInput,
  pub guest_name_width: NumericInput,
  pub round_off_value: NumericInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotalsBody {
  #[serde(with = "rust_decimal::serde::float")]
  pub sub_total: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub tax_total: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub grand_total: Decimal,
}

/// Response after successful invoice creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponseBody {
  pub message: String,
  pub invoice_id: i64,
  pub totals: InvoiceTotalsBody,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional detailed error information
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

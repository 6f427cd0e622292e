use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::adapters::http::{
  dtos::{
    CreateInvoiceLineItemRequest, CreateInvoiceRequest, CreateInvoiceResponseBody,
    InvoiceTotalsBody,
  },
  errors::ApiError,
};
use crate::application::invoice::{
  CreateInvoiceCommand, CreateInvoiceLineItemDto, CreateInvoiceResponse, CreateInvoiceUseCase,
};

fn to_line_item_dto(item: CreateInvoiceLineItemRequest) -> CreateInvoiceLineItemDto {
  CreateInvoiceLineItemDto {
    location: item.location,
    food_tariff: item.food_tariff,
    gst_id: item.gst_id,
    days: item.days,
    tariff: item.tariff,
    tax: item.tax,
    total: item.total,
  }
}

fn to_command(request: CreateInvoiceRequest) -> CreateInvoiceCommand {
  CreateInvoiceCommand {
    apartment_bill_no: request.apartment_bill_no,
    reservation_ids: request.reservation_ids.unwrap_or_default(),
    line_items: request
      .line_items
      .unwrap_or_default()
      .into_iter()
      .map(to_line_item_dto)
      .collect(),
    date: request.date,
    invoice_to: request.invoice_to,
    state_for_billing: request.state_for_billing,
    pan: request.pan,
    status: request.status,
    payment_method: request.payment_method,
    currency: request.currency,
    conversion_rate: request.conversion_rate,
    display_taxes: request.display_taxes,
    display_food_charge: request.display_food_charge,
    extra_services: request.extra_services,
    services_name: request.services_name,
    services_amount: request.services_amount,
    pdf_password: request.pdf_password,
    page_break: request.page_break,
    guest_name_width: request.guest_name_width,
    round_off_value: request.round_off_value,
  }
}

fn to_response_body(response: CreateInvoiceResponse) -> CreateInvoiceResponseBody {
  CreateInvoiceResponseBody {
    message: "Invoice created successfully".to_string(),
    invoice_id: response.invoice_id,
    totals: InvoiceTotalsBody {
      sub_total: response.sub_total,
      tax_total: response.tax_total,
      grand_total: response.grand_total,
    },
  }
}

/// Handler for invoice creation
///
/// POST /api/v1/invoices
/// Body: CreateInvoiceRequest (JSON)
/// Response: CreateInvoiceResponseBody (JSON) with status 201
pub async fn create_invoice_handler(
  request: web::Json<CreateInvoiceRequest>,
  use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let response = use_case.execute(to_command(request.into_inner())).await?;

  Ok(HttpResponse::Created().json(to_response_body(response)))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
  "OK"
}

use actix_web::web;
use std::sync::Arc;

use crate::application::invoice::CreateInvoiceUseCase;

use super::errors::ApiError;
use super::handlers::invoices::create_invoice_handler;

/// Largest accepted invoice body
const MAX_JSON_PAYLOAD: usize = 1024 * 1024;

/// Configure invoice routes
///
/// Mounts the invoice endpoints under the provided scope (e.g.
/// /api/v1/invoices). Malformed or oversized JSON bodies are answered with
/// the same `validation_error` shape as rejected field values.
///
/// # Routes
///
/// - POST "" - Create an invoice with its reservation links and line items
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use billbook::application::invoice::CreateInvoiceUseCase;
/// # use billbook::adapters::http::routes::configure_invoice_routes;
///
/// # fn example(create_invoice_use_case: Arc<CreateInvoiceUseCase>) {
/// let app = App::new().service(
///   web::scope("/api/v1/invoices")
///     .configure(|cfg| configure_invoice_routes(cfg, create_invoice_use_case)),
/// );
/// # }
/// ```
pub fn configure_invoice_routes(
  cfg: &mut web::ServiceConfig,
  create_invoice_use_case: Arc<CreateInvoiceUseCase>,
) {
  cfg
    .app_data(web::Data::new(create_invoice_use_case))
    .app_data(
      web::JsonConfig::default()
        .limit(MAX_JSON_PAYLOAD)
        .error_handler(|err, _req| {
          tracing::debug!("Rejected invoice payload: {}", err);
          ApiError::Validation(format!("Invalid request body: {}", err)).into()
        }),
    )
    .route("", web::post().to(create_invoice_handler));
}

pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use dtos::{
  CreateInvoiceLineItemRequest, CreateInvoiceRequest, CreateInvoiceResponseBody, ErrorResponse,
  InvoiceTotalsBody,
};
pub use errors::ApiError;
pub use handlers::invoices::{create_invoice_handler, health_check};
pub use middleware::{RequestId, RequestIdExt, RequestIdMiddleware};
pub use routes::configure_invoice_routes;

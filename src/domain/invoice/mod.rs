pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  CreatedInvoice, Invoice, InvoiceData, InvoiceHeader, InvoiceLineItem, InvoiceTotals,
  LineItemData,
};
pub use errors::InvoiceError;
pub use ports::{InvoiceStore, InvoiceTransaction};
pub use services::InvoiceService;
pub use value_objects::{
  Amount, InvoiceNumber, NumericInput, PdfPassword, ReservationId, ValueObjectError, YesNoFlag,
  parse_invoice_date,
};

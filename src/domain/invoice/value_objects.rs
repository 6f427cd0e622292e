use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid reservation id: {0}")]
  InvalidReservationId(String),
}

// Invoice Number - optional external identifier, unique when present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  /// Kept exactly as given, so `"A-100 "` and `"A-100"` are different numbers.
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    if value.trim().is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if value.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(value))
  }

  /// A missing or blank number means the invoice is created without one.
  pub fn from_optional(value: Option<String>) -> Result<Option<Self>, ValueObjectError> {
    match value {
      Some(v) if !v.trim().is_empty() => Self::new(v).map(Some),
      _ => Ok(None),
    }
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Loosely-typed numeric input as it arrives from clients.
///
/// Parsing is total: every JSON value maps to exactly one variant. `null`,
/// absent fields and empty or whitespace-only strings are `Blank` and resolve
/// to zero. Anything that is not a finite decimal is `Invalid` and is rejected
/// by [`NumericInput::resolve`], so it can never reach stored totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NumericInput {
  Value(Decimal),
  #[default]
  Blank,
  Invalid(String),
}

impl NumericInput {
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return NumericInput::Blank;
    }
    match parse_decimal(trimmed) {
      Some(value) => NumericInput::Value(value),
      None => NumericInput::Invalid(raw.to_string()),
    }
  }

  pub fn from_json(value: &Value) -> Self {
    match value {
      Value::Null => NumericInput::Blank,
      Value::String(s) => Self::parse(s),
      Value::Number(n) => {
        let text = n.to_string();
        match parse_decimal(&text) {
          Some(value) => NumericInput::Value(value),
          None => NumericInput::Invalid(text),
        }
      }
      other => NumericInput::Invalid(other.to_string()),
    }
  }

  pub fn resolve(&self, field: &str) -> Result<Decimal, ValueObjectError> {
    match self {
      NumericInput::Value(value) => Ok(*value),
      NumericInput::Blank => Ok(Decimal::ZERO),
      NumericInput::Invalid(raw) => Err(ValueObjectError::InvalidAmount(format!(
        "{} is not a number: {}",
        field, raw
      ))),
    }
  }
}

impl<'de> Deserialize<'de> for NumericInput {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = Value::deserialize(deserializer)?;
    Ok(Self::from_json(&value))
  }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
  Decimal::from_str(text)
    .ok()
    .or_else(|| Decimal::from_scientific(text).ok())
}

// Amount - non-negative money or quantity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Amount(Decimal);

impl Amount {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ZERO {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn from_input(input: &NumericInput, field: &str) -> Result<Self, ValueObjectError> {
    let value = input.resolve(field)?;
    if value < Decimal::ZERO {
      return Err(ValueObjectError::InvalidAmount(format!(
        "{} cannot be negative",
        field
      )));
    }
    Ok(Self(value))
  }

  pub fn zero() -> Self {
    Self(Decimal::ZERO)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Display flag submitted as `"Yes"`/anything-else.
///
/// Only a JSON `true` or the exact string `"Yes"` set the flag. Every other
/// value, including `"yes"`, `"No"`, numbers, `null` and absent fields, is
/// `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YesNoFlag(bool);

impl YesNoFlag {
  pub fn from_json(value: &Value) -> Self {
    match value {
      Value::Bool(b) => Self(*b),
      Value::String(s) => Self(s == "Yes"),
      _ => Self(false),
    }
  }

  pub fn is_set(&self) -> bool {
    self.0
  }
}

impl From<bool> for YesNoFlag {
  fn from(value: bool) -> Self {
    Self(value)
  }
}

impl<'de> Deserialize<'de> for YesNoFlag {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = Value::deserialize(deserializer)?;
    Ok(Self::from_json(&value))
  }
}

// Accepted invoice date layouts, tried in order. US month-first order wins for
// slash and dash separated dates.
const DATE_FORMATS: &[&str] = &[
  "%Y-%m-%d",
  "%Y/%m/%d",
  "%m/%d/%Y",
  "%m-%d-%Y",
  "%m/%d/%y",
  "%b %d, %Y",
  "%b %d %Y",
  "%d %b %Y",
  "%B %d, %Y",
  "%B %d %Y",
  "%d %B %Y",
  "%a %b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalise ambiguous calendar date text. Returns `None` when the text is
/// empty or matches no known layout.
pub fn parse_invoice_date(raw: &str) -> Option<NaiveDate> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
    return Some(datetime.date_naive());
  }

  for format in DATETIME_FORMATS {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
      return Some(datetime.date());
    }
  }

  DATE_FORMATS.iter().find_map(|format| {
    NaiveDate::parse_from_str(trimmed, format)
      .ok()
      // "3/21/24" parses as year 24 under %Y; leave it for %y
      .filter(|date| date.year() >= 1000)
  })
}

// Reservation ID - identifier of a billed reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReservationId(i64);

impl ReservationId {
  pub fn new(value: i64) -> Result<Self, ValueObjectError> {
    if value <= 0 {
      return Err(ValueObjectError::InvalidReservationId(format!(
        "Reservation id must be positive, got {}",
        value
      )));
    }
    Ok(Self(value))
  }

  pub fn from_json(value: &Value) -> Result<Self, ValueObjectError> {
    let id = match value {
      Value::Number(n) => n.as_i64(),
      Value::String(s) => s.trim().parse::<i64>().ok(),
      _ => None,
    };
    id.ok_or_else(|| ValueObjectError::InvalidReservationId(value.to_string()))
      .and_then(Self::new)
  }

  pub fn value(&self) -> i64 {
    self.0
  }
}

impl fmt::Display for ReservationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Password protecting the rendered invoice PDF. Stored as given, never logged.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PdfPassword(String);

impl PdfPassword {
  pub fn new(value: String) -> Self {
    Self(value)
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for PdfPassword {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("PdfPassword(***)")
  }
}

impl<'de> Deserialize<'de> for PdfPassword {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    String::deserialize(deserializer).map(Self)
  }
}

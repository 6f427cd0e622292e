use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::invoice::{
  Invoice, InvoiceError, InvoiceLineItem, InvoiceNumber, InvoiceStore, InvoiceTransaction,
  ReservationId,
};

/// Committed invoice row together with its generated id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredInvoice {
  pub id: i64,
  pub invoice: Invoice,
}

#[derive(Debug, Default)]
struct MemoryState {
  last_invoice_id: i64,
  last_line_item_id: i64,
  invoices: Vec<StoredInvoice>,
  reservation_links: BTreeSet<(i64, i64)>,
  line_items: Vec<(i64, InvoiceLineItem)>,
}

impl MemoryState {
  fn has_invoice_number(&self, number: &str) -> bool {
    self.invoices.iter().any(|stored| has_number(&stored.invoice, number))
  }
}

fn has_number(invoice: &Invoice, number: &str) -> bool {
  invoice
    .header
    .invoice_number
    .as_ref()
    .is_some_and(|n| n.value() == number)
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
  state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process invoice store.
///
/// Writes are staged per transaction and only become visible on commit, ids
/// are allocated like database sequences (never reused, even after rollback)
/// and the invoice number is unique across committed invoices. Failures can be
/// injected at a given line-item insert or at commit, and the number of open
/// transactions is tracked so connection release can be observed.
pub struct InMemoryInvoiceStore {
  state: Arc<Mutex<MemoryState>>,
  open_transactions: Arc<AtomicUsize>,
  fail_on_line_item: AtomicUsize,
  fail_on_commit: AtomicBool,
}

impl InMemoryInvoiceStore {
  pub fn new() -> Self {
    Self {
      state: Arc::new(Mutex::new(MemoryState::default())),
      open_transactions: Arc::new(AtomicUsize::new(0)),
      fail_on_line_item: AtomicUsize::new(0),
      fail_on_commit: AtomicBool::new(false),
    }
  }

  /// Fail the `n`-th (1-based) line-item insert of every transaction.
  pub fn with_line_item_failure(self, n: usize) -> Self {
    self.fail_on_line_item.store(n, Ordering::SeqCst);
    self
  }

  pub fn with_commit_failure(self) -> Self {
    self.fail_on_commit.store(true, Ordering::SeqCst);
    self
  }

  pub fn clear_failures(&self) {
    self.fail_on_line_item.store(0, Ordering::SeqCst);
    self.fail_on_commit.store(false, Ordering::SeqCst);
  }

  pub fn open_transactions(&self) -> usize {
    self.open_transactions.load(Ordering::SeqCst)
  }

  pub fn invoices(&self) -> Vec<StoredInvoice> {
    lock(&self.state).invoices.clone()
  }

  pub fn line_items_for(&self, invoice_id: i64) -> Vec<InvoiceLineItem> {
    let mut items: Vec<InvoiceLineItem> = lock(&self.state)
      .line_items
      .iter()
      .filter(|(_, item)| item.invoice_id == invoice_id)
      .map(|(_, item)| item.clone())
      .collect();
    items.sort_by_key(|item| item.line_order);
    items
  }

  pub fn line_item_count(&self) -> usize {
    lock(&self.state).line_items.len()
  }

  pub fn reservation_links_for(&self, invoice_id: i64) -> Vec<i64> {
    lock(&self.state)
      .reservation_links
      .iter()
      .filter(|(linked_invoice, _)| *linked_invoice == invoice_id)
      .map(|(_, reservation_id)| *reservation_id)
      .collect()
  }

  pub fn reservation_link_count(&self) -> usize {
    lock(&self.state).reservation_links.len()
  }
}

impl Default for InMemoryInvoiceStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
  async fn begin(&self) -> Result<Box<dyn InvoiceTransaction>, InvoiceError> {
    self.open_transactions.fetch_add(1, Ordering::SeqCst);
    let guard = OpenTransactionGuard(self.open_transactions.clone());

    Ok(Box::new(MemoryTransaction {
      state: self.state.clone(),
      staged: StagedWrites::default(),
      fail_on_line_item: self.fail_on_line_item.load(Ordering::SeqCst),
      fail_on_commit: self.fail_on_commit.load(Ordering::SeqCst),
      line_items_attempted: 0,
      _guard: guard,
    }))
  }
}

struct OpenTransactionGuard(Arc<AtomicUsize>);

impl Drop for OpenTransactionGuard {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}

#[derive(Default)]
struct StagedWrites {
  invoices: Vec<StoredInvoice>,
  reservation_links: BTreeSet<(i64, i64)>,
  line_items: Vec<(i64, InvoiceLineItem)>,
}

struct MemoryTransaction {
  state: Arc<Mutex<MemoryState>>,
  staged: StagedWrites,
  fail_on_line_item: usize,
  fail_on_commit: bool,
  line_items_attempted: usize,
  _guard: OpenTransactionGuard,
}

#[async_trait]
impl InvoiceTransaction for MemoryTransaction {
  async fn invoice_number_exists(
    &mut self,
    invoice_number: &InvoiceNumber,
  ) -> Result<bool, InvoiceError> {
    let number = invoice_number.value();
    let staged = self
      .staged
      .invoices
      .iter()
      .any(|stored| has_number(&stored.invoice, number));
    Ok(staged || lock(&self.state).has_invoice_number(number))
  }

  async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<i64, InvoiceError> {
    if let Some(number) = &invoice.header.invoice_number {
      if self.invoice_number_exists(number).await? {
        return Err(InvoiceError::InvoiceNumberAlreadyExists(
          number.value().to_string(),
        ));
      }
    }

    let id = {
      let mut state = lock(&self.state);
      state.last_invoice_id += 1;
      state.last_invoice_id
    };
    self.staged.invoices.push(StoredInvoice {
      id,
      invoice: invoice.clone(),
    });
    Ok(id)
  }

  async fn link_reservation(
    &mut self,
    invoice_id: i64,
    reservation_id: ReservationId,
  ) -> Result<bool, InvoiceError> {
    let key = (invoice_id, reservation_id.value());
    if lock(&self.state).reservation_links.contains(&key) {
      return Ok(false);
    }
    Ok(self.staged.reservation_links.insert(key))
  }

  async fn insert_line_item(&mut self, line_item: &InvoiceLineItem) -> Result<i64, InvoiceError> {
    self.line_items_attempted += 1;
    if self.line_items_attempted == self.fail_on_line_item {
      return Err(InvoiceError::Repository(format!(
        "simulated failure inserting line item {}",
        self.line_items_attempted
      )));
    }

    let id = {
      let mut state = lock(&self.state);
      state.last_line_item_id += 1;
      state.last_line_item_id
    };
    self.staged.line_items.push((id, line_item.clone()));
    Ok(id)
  }

  async fn commit(self: Box<Self>) -> Result<(), InvoiceError> {
    if self.fail_on_commit {
      return Err(InvoiceError::Repository(
        "simulated failure on commit".to_string(),
      ));
    }

    let mut state = lock(&self.state);

    // Another transaction may have committed the same number since the check
    for stored in &self.staged.invoices {
      if let Some(number) = &stored.invoice.header.invoice_number {
        if state.has_invoice_number(number.value()) {
          return Err(InvoiceError::InvoiceNumberAlreadyExists(
            number.value().to_string(),
          ));
        }
      }
    }

    state.invoices.extend(self.staged.invoices.iter().cloned());
    state
      .reservation_links
      .extend(self.staged.reservation_links.iter().copied());
    state.line_items.extend(self.staged.line_items.iter().cloned());
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<(), InvoiceError> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{InvoiceHeader, InvoiceTotals};

  fn invoice(number: Option<&str>) -> Invoice {
    let header = InvoiceHeader {
      invoice_number: number.map(|n| InvoiceNumber::new(n.to_string()).unwrap()),
      ..Default::default()
    };
    Invoice::new(header, &[], InvoiceTotals::default())
  }

  #[tokio::test]
  async fn test_writes_invisible_until_commit() {
    let store = InMemoryInvoiceStore::new();
    let mut tx = store.begin().await.unwrap();

    let id = tx.insert_invoice(&invoice(Some("M-1"))).await.unwrap();
    assert!(tx.link_reservation(id, ReservationId::new(3).unwrap()).await.unwrap());
    assert!(store.invoices().is_empty());
    assert_eq!(store.open_transactions(), 1);

    tx.commit().await.unwrap();
    assert_eq!(store.invoices().len(), 1);
    assert_eq!(store.reservation_links_for(id), vec![3]);
    assert_eq!(store.open_transactions(), 0);
  }

  #[tokio::test]
  async fn test_dropped_transaction_discards_writes() {
    let store = InMemoryInvoiceStore::new();
    {
      let mut tx = store.begin().await.unwrap();
      tx.insert_invoice(&invoice(Some("M-2"))).await.unwrap();
    }
    assert!(store.invoices().is_empty());
    assert_eq!(store.open_transactions(), 0);
  }

  #[tokio::test]
  async fn test_ids_are_not_reused_after_rollback() {
    let store = InMemoryInvoiceStore::new();

    let mut tx = store.begin().await.unwrap();
    let first = tx.insert_invoice(&invoice(None)).await.unwrap();
    tx.rollback().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let second = tx.insert_invoice(&invoice(None)).await.unwrap();
    tx.commit().await.unwrap();

    assert!(second > first);
  }

  #[tokio::test]
  async fn test_unique_number_enforced_between_concurrent_transactions() {
    let store = InMemoryInvoiceStore::new();
    let mut first = store.begin().await.unwrap();
    let mut second = store.begin().await.unwrap();

    first.insert_invoice(&invoice(Some("RACE"))).await.unwrap();
    second.insert_invoice(&invoice(Some("RACE"))).await.unwrap();

    first.commit().await.unwrap();
    let err = second.commit().await.unwrap_err();

    assert!(matches!(err, InvoiceError::InvoiceNumberAlreadyExists(_)));
    assert_eq!(store.invoices().len(), 1);
    assert_eq!(store.open_transactions(), 0);
  }

  #[tokio::test]
  async fn test_duplicate_link_in_same_transaction() {
    let store = InMemoryInvoiceStore::new();
    let mut tx = store.begin().await.unwrap();
    let id = tx.insert_invoice(&invoice(None)).await.unwrap();
    let reservation = ReservationId::new(9).unwrap();

    assert!(tx.link_reservation(id, reservation).await.unwrap());
    assert!(!tx.link_reservation(id, reservation).await.unwrap());
    tx.commit().await.unwrap();

    assert_eq!(store.reservation_link_count(), 1);
  }
}

//! Storage seam for mutable store state.
//!
//! The discount engine, cart ledger, and order journal only talk to a
//! [`StoreBackend`]. [`MemoryBackend`] keeps everything in process memory; a
//! durable backend can be swapped in without touching the decision logic.

use std::collections::HashMap;

use thiserror::Error;

use crate::cart::CartLine;
use crate::discount::DiscountCode;
use crate::journal::Order;
use crate::types::{OrderId, SessionId};

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A discount code with the same string already exists.
    #[error("discount code already exists: {0}")]
    DuplicateCode(String),

    /// An order with the same id was already appended.
    #[error("order already recorded: {0}")]
    DuplicateOrder(OrderId),
}

/// Persistence operations for carts, orders, and discount codes.
///
/// Implementations are not expected to synchronize internally: the store
/// facade serializes every call behind a single lock.
pub trait StoreBackend: Send {
    /// Lines in a session's cart. Registers an empty cart for unseen sessions.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn cart(&mut self, session: &SessionId) -> Result<Vec<CartLine>, StorageError>;

    /// Replace a session's cart lines.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn put_cart(&mut self, session: &SessionId, lines: Vec<CartLine>) -> Result<(), StorageError>;

    /// Append an order to the journal.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DuplicateOrder`] if the id is already recorded.
    fn append_order(&mut self, order: Order) -> Result<(), StorageError>;

    /// Number of orders recorded so far.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn order_count(&self) -> Result<u64, StorageError>;

    /// All orders in append order.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn orders(&self) -> Result<Vec<Order>, StorageError>;

    /// Store a newly minted discount code.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DuplicateCode`] if the code string exists.
    fn insert_discount_code(&mut self, code: DiscountCode) -> Result<(), StorageError>;

    /// Find a discount code by its exact string.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn find_discount_code(&self, code: &str) -> Result<Option<DiscountCode>, StorageError>;

    /// Find the unused discount code bound to `slot`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn find_unused_discount_code(&self, slot: u64) -> Result<Option<DiscountCode>, StorageError>;

    /// All discount codes in issue order.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn discount_codes(&self) -> Result<Vec<DiscountCode>, StorageError>;

    /// Flag a code as used. Returns `true` only if it was previously unused.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn mark_discount_code_used(&mut self, code: &str) -> Result<bool, StorageError>;
}

/// In-process backend holding all state in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    carts: HashMap<SessionId, Vec<CartLine>>,
    orders: Vec<Order>,
    discount_codes: Vec<DiscountCode>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryBackend {
    fn cart(&mut self, session: &SessionId) -> Result<Vec<CartLine>, StorageError> {
        Ok(self.carts.entry(session.clone()).or_default().clone())
    }

    fn put_cart(&mut self, session: &SessionId, lines: Vec<CartLine>) -> Result<(), StorageError> {
        self.carts.insert(session.clone(), lines);
        Ok(())
    }

    fn append_order(&mut self, order: Order) -> Result<(), StorageError> {
        if self.orders.iter().any(|o| o.id == order.id) {
            return Err(StorageError::DuplicateOrder(order.id));
        }
        self.orders.push(order);
        Ok(())
    }

    fn order_count(&self) -> Result<u64, StorageError> {
        Ok(self.orders.len() as u64)
    }

    fn orders(&self) -> Result<Vec<Order>, StorageError> {
        Ok(self.orders.clone())
    }

    fn insert_discount_code(&mut self, code: DiscountCode) -> Result<(), StorageError> {
        if self.discount_codes.iter().any(|d| d.code == code.code) {
            return Err(StorageError::DuplicateCode(code.code));
        }
        self.discount_codes.push(code);
        Ok(())
    }

    fn find_discount_code(&self, code: &str) -> Result<Option<DiscountCode>, StorageError> {
        Ok(self.discount_codes.iter().find(|d| d.code == code).cloned())
    }

    fn find_unused_discount_code(&self, slot: u64) -> Result<Option<DiscountCode>, StorageError> {
        Ok(self
            .discount_codes
            .iter()
            .find(|d| d.order_index_condition == slot && !d.is_used)
            .cloned())
    }

    fn discount_codes(&self) -> Result<Vec<DiscountCode>, StorageError> {
        Ok(self.discount_codes.clone())
    }

    fn mark_discount_code_used(&mut self, code: &str) -> Result<bool, StorageError> {
        match self.discount_codes.iter_mut().find(|d| d.code == code) {
            Some(discount) if !discount.is_used => {
                discount.is_used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn code(code: &str, slot: u64) -> DiscountCode {
        DiscountCode {
            code: code.to_string(),
            is_used: false,
            order_index_condition: slot,
        }
    }

    #[test]
    fn test_unseen_session_gets_empty_cart() {
        let mut backend = MemoryBackend::new();
        let session = SessionId::parse("s1").unwrap();
        assert!(backend.cart(&session).unwrap().is_empty());
        assert!(backend.carts.contains_key(&session));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut backend = MemoryBackend::new();
        backend.insert_discount_code(code("X", 3)).unwrap();
        assert!(matches!(
            backend.insert_discount_code(code("X", 6)),
            Err(StorageError::DuplicateCode(c)) if c == "X"
        ));
    }

    #[test]
    fn test_mark_used_reports_transition_once() {
        let mut backend = MemoryBackend::new();
        backend.insert_discount_code(code("X", 3)).unwrap();
        assert!(backend.mark_discount_code_used("X").unwrap());
        assert!(!backend.mark_discount_code_used("X").unwrap());
        assert!(!backend.mark_discount_code_used("missing").unwrap());
        assert!(backend.find_unused_discount_code(3).unwrap().is_none());
    }
}

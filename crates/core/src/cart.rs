//! Per-session cart ledger.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::{StorageError, StoreBackend};
use crate::types::{ProductId, SessionId};

/// One product and its quantity in a cart.
///
/// A cart holds at most one line per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart operations over a storage backend.
///
/// Product existence and `quantity > 0` are checked by the caller.
pub struct CartLedger<'a, B: ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: StoreBackend + ?Sized> CartLedger<'a, B> {
    /// Create a ledger view over `backend`.
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Lines in the session's cart, creating an empty cart if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn lines(&mut self, session: &SessionId) -> Result<Vec<CartLine>, StorageError> {
        self.backend.cart(session)
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// Returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QuantityOverflow`] if the merged quantity does
    /// not fit, or [`StoreError::Storage`] if the backend fails.
    pub fn add_line(
        &mut self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartLine>, StoreError> {
        let mut lines = self.backend.cart(session)?;

        match lines.iter_mut().find(|line| &line.product_id == product_id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| StoreError::QuantityOverflow(product_id.clone()))?;
            }
            None => lines.push(CartLine {
                product_id: product_id.clone(),
                quantity,
            }),
        }

        self.backend.put_cart(session, lines.clone())?;
        Ok(lines)
    }

    /// Empty the session's cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn clear(&mut self, session: &SessionId) -> Result<(), StorageError> {
        self.backend.put_cart(session, Vec::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn session(id: &str) -> SessionId {
        SessionId::parse(id).unwrap()
    }

    #[test]
    fn test_adding_same_product_merges_lines() {
        let mut backend = MemoryBackend::new();
        let mut ledger = CartLedger::new(&mut backend);
        let s = session("s1");
        let a = ProductId::new("A");

        ledger.add_line(&s, &a, 2).unwrap();
        let lines = ledger.add_line(&s, &a, 3).unwrap();

        assert_eq!(
            lines,
            vec![CartLine {
                product_id: a,
                quantity: 5
            }]
        );
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut backend = MemoryBackend::new();
        let mut ledger = CartLedger::new(&mut backend);
        let s = session("s1");

        ledger.add_line(&s, &ProductId::new("B"), 1).unwrap();
        ledger.add_line(&s, &ProductId::new("A"), 1).unwrap();
        ledger.add_line(&s, &ProductId::new("B"), 1).unwrap();

        let ids: Vec<String> = ledger
            .lines(&s)
            .unwrap()
            .into_iter()
            .map(|l| l.product_id.into_inner())
            .collect();
        assert_eq!(ids, ["B", "A"]);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut backend = MemoryBackend::new();
        let mut ledger = CartLedger::new(&mut backend);

        ledger
            .add_line(&session("s1"), &ProductId::new("A"), 1)
            .unwrap();

        assert!(ledger.lines(&session("s2")).unwrap().is_empty());
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut backend = MemoryBackend::new();
        let mut ledger = CartLedger::new(&mut backend);
        let s = session("s1");

        ledger.add_line(&s, &ProductId::new("A"), 4).unwrap();
        ledger.clear(&s).unwrap();

        assert!(ledger.lines(&s).unwrap().is_empty());
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let mut backend = MemoryBackend::new();
        let mut ledger = CartLedger::new(&mut backend);
        let s = session("s1");
        let a = ProductId::new("A");

        ledger.add_line(&s, &a, u32::MAX).unwrap();
        assert!(matches!(
            ledger.add_line(&s, &a, 1),
            Err(StoreError::QuantityOverflow(_))
        ));
        assert_eq!(ledger.lines(&s).unwrap()[0].quantity, u32::MAX);
    }
}

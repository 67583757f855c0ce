//! Store facade: the single entry point for the HTTP layer.
//!
//! Every operation takes the store lock exactly once and runs to completion
//! under it. Checkout and code issuance are read-modify-write sequences on the
//! order count, so this is what guarantees at most one redemption per slot.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::instrument;

use crate::cart::{CartLedger, CartLine};
use crate::catalog::{Catalog, Product};
use crate::discount::{DiscountCode, DiscountEngine, DiscountPolicy, DiscountRejection};
use crate::error::{Result, StoreError};
use crate::journal::{AppliedDiscount, Order, OrderItem, OrderJournal};
use crate::storage::{MemoryBackend, StoreBackend};
use crate::types::{DiscountRate, Price, ProductId, SessionId};

/// Admin dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_orders: u64,
    pub total_purchase_amount: Price,
    pub discount_codes: Vec<DiscountCode>,
    pub total_discount_amount: Price,
}

/// Catalog, carts, discount codes, and orders behind one lock.
pub struct Store<B = MemoryBackend> {
    catalog: Catalog,
    policy: DiscountPolicy,
    backend: Mutex<B>,
}

impl Store<MemoryBackend> {
    /// Create a store that keeps all state in memory.
    #[must_use]
    pub fn in_memory(catalog: Catalog, policy: DiscountPolicy) -> Self {
        Self::new(catalog, policy, MemoryBackend::new())
    }
}

impl<B: StoreBackend> Store<B> {
    /// Create a store over an explicit backend.
    #[must_use]
    pub fn new(catalog: Catalog, policy: DiscountPolicy, backend: B) -> Self {
        Self {
            catalog,
            policy,
            backend: Mutex::new(backend),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, B>> {
        self.backend.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    /// Look up one product.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.get(id)
    }

    /// The active discount policy.
    #[must_use]
    pub const fn policy(&self) -> DiscountPolicy {
        self.policy
    }

    /// The discount rate applied by redeemed codes.
    #[must_use]
    pub const fn discount_rate(&self) -> DiscountRate {
        self.policy.rate()
    }

    /// Lines in a session's cart. Unseen sessions get an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an internal [`StoreError`] if storage fails.
    pub fn cart(&self, session: &SessionId) -> Result<Vec<CartLine>> {
        let mut guard = self.lock()?;
        Ok(CartLedger::new(&mut *guard).lines(session)?)
    }

    /// Add a product to a session's cart and return the updated cart.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidQuantity`] unless `1 <= quantity <= u32::MAX`
    /// - [`StoreError::UnknownProduct`] if the product is not in the catalog
    /// - [`StoreError::QuantityOverflow`] if the merged line would overflow
    /// - [`StoreError::AmountOverflow`] if the cart subtotal would overflow
    #[instrument(skip(self), fields(session = %session))]
    pub fn add_to_cart(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Vec<CartLine>> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(StoreError::InvalidQuantity)?;

        if self.product(product_id).is_none() {
            return Err(StoreError::UnknownProduct(product_id.clone()));
        }

        let mut guard = self.lock()?;
        let mut ledger = CartLedger::new(&mut *guard);
        self.ensure_cart_total_fits(&ledger.lines(session)?, product_id, quantity)?;
        let lines = ledger.add_line(session, product_id, quantity)?;
        tracing::debug!(lines = lines.len(), "cart updated");
        Ok(lines)
    }

    /// Price the cart as it would be after adding `quantity` of `added`.
    /// Lines whose product left the catalog are skipped; checkout reports them.
    fn ensure_cart_total_fits(
        &self,
        lines: &[CartLine],
        added: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        let existing = lines
            .iter()
            .find(|line| line.product_id == *added)
            .map_or(0, |line| line.quantity);
        let merged = existing
            .checked_add(quantity)
            .ok_or_else(|| StoreError::QuantityOverflow(added.clone()))?;

        lines
            .iter()
            .filter(|line| line.product_id != *added)
            .map(|line| (&line.product_id, line.quantity))
            .chain(std::iter::once((added, merged)))
            .filter_map(|(id, quantity)| Some((self.product(id)?.price, quantity)))
            .try_fold(Price::ZERO, |subtotal, (price, quantity)| {
                subtotal.checked_add(price.checked_times(quantity)?)
            })
            .map(|_| ())
            .ok_or(StoreError::AmountOverflow)
    }

    /// Issue a discount code for the next order if it is an Nth order.
    ///
    /// # Errors
    ///
    /// Returns an internal [`StoreError`] if storage fails.
    pub fn generate_discount_code(&self) -> Result<Option<String>> {
        let mut guard = self.lock()?;
        Ok(DiscountEngine::new(&mut *guard, self.policy).generate()?)
    }

    /// Check whether a code can be redeemed on the next order.
    ///
    /// The inner result carries the rate, or the reason the code is refused.
    ///
    /// # Errors
    ///
    /// Returns an internal [`StoreError`] if storage fails.
    pub fn validate_discount_code(
        &self,
        code: &str,
    ) -> Result<std::result::Result<DiscountRate, DiscountRejection>> {
        let mut guard = self.lock()?;
        let mut engine = DiscountEngine::new(&mut *guard, self.policy);
        Ok(engine.validate(code.trim())?)
    }

    /// Turn the session's cart into an order.
    ///
    /// All-or-nothing: on error no order is recorded, no code is consumed,
    /// and the cart is left as it was. A blank `discount_code` counts as none.
    ///
    /// # Errors
    ///
    /// - [`StoreError::EmptyCart`] if the cart has no lines
    /// - [`StoreError::StaleProduct`] if a line's product left the catalog
    /// - [`StoreError::AmountOverflow`] if the subtotal does not fit
    /// - [`StoreError::Discount`] if the code is unknown, used, or expired
    #[instrument(skip(self), fields(session = %session))]
    pub fn checkout(&self, session: &SessionId, discount_code: Option<&str>) -> Result<Order> {
        let discount_code = discount_code.map(str::trim).filter(|c| !c.is_empty());
        let mut guard = self.lock()?;

        let lines = CartLedger::new(&mut *guard).lines(session)?;
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let items = lines
            .into_iter()
            .map(|line| -> Result<OrderItem> {
                let product = self
                    .catalog
                    .get(&line.product_id)
                    .ok_or_else(|| StoreError::StaleProduct(line.product_id.clone()))?;
                Ok(OrderItem {
                    product_id: line.product_id,
                    price: product.price,
                    quantity: line.quantity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let subtotal = Order::subtotal_of(&items)?;

        let discount = match discount_code {
            Some(code) => {
                let rate = DiscountEngine::new(&mut *guard, self.policy)
                    .validate(code)??;
                Some(AppliedDiscount {
                    code: code.to_owned(),
                    amount: subtotal.portion(rate),
                })
            }
            None => None,
        };

        let order = Order::new(session.clone(), items, discount)?;
        OrderJournal::new(&mut *guard).append(order.clone())?;

        // The order is recorded; only now is the code consumed.
        if let Some(applied) = &order.discount {
            DiscountEngine::new(&mut *guard, self.policy)
                .mark_used(&applied.code)?;
        }

        CartLedger::new(&mut *guard).clear(session)?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            discounted = order.discount.is_some(),
            "order placed"
        );
        Ok(order)
    }

    /// Order and discount statistics for the admin view.
    ///
    /// # Errors
    ///
    /// Returns an internal [`StoreError`] if storage fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut guard = self.lock()?;
        let totals = OrderJournal::new(&mut *guard).aggregate()?;
        let discount_codes = DiscountEngine::new(&mut *guard, self.policy).codes()?;

        Ok(StoreStats {
            total_orders: totals.total_orders,
            total_purchase_amount: totals.total_purchase_amount,
            discount_codes,
            total_discount_amount: totals.total_discount_amount,
        })
    }

    /// Every recorded order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an internal [`StoreError`] if storage fails.
    pub fn orders(&self) -> Result<Vec<Order>> {
        let mut guard = self.lock()?;
        Ok(OrderJournal::new(&mut *guard).list()?)
    }
}

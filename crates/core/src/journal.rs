//! Append-only order journal.
//!
//! The number of recorded orders is the single input to discount
//! eligibility, so it is always read from the backend and never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::storage::{StorageError, StoreBackend};
use crate::types::{OrderId, Price, ProductId, SessionId};

/// A purchased line, with the unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity, or `None` if it overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.price.checked_times(self.quantity)
    }
}

/// A redeemed discount code and the amount it took off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub code: String,
    pub amount: Price,
}

/// A completed order. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub session_id: SessionId,
    pub items: Vec<OrderItem>,
    pub subtotal_amount: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<AppliedDiscount>,
    pub total_amount: Price,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order, deriving subtotal and total from the items.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AmountOverflow`] if the subtotal does not fit.
    pub fn new(
        session_id: SessionId,
        items: Vec<OrderItem>,
        discount: Option<AppliedDiscount>,
    ) -> Result<Self> {
        let subtotal_amount = Self::subtotal_of(&items)?;
        let discount_amount = discount.as_ref().map_or(Price::ZERO, |d| d.amount);
        let total_amount = subtotal_amount.saturating_sub(discount_amount);

        Ok(Self {
            id: OrderId::generate(),
            session_id,
            items,
            subtotal_amount,
            discount,
            total_amount,
            created_at: Utc::now(),
        })
    }

    /// Sum of the line totals.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AmountOverflow`] if any line or the sum overflows.
    pub fn subtotal_of(items: &[OrderItem]) -> Result<Price> {
        items
            .iter()
            .try_fold(Price::ZERO, |subtotal, item| {
                subtotal.checked_add(item.line_total()?)
            })
            .ok_or(StoreError::AmountOverflow)
    }

    /// Discount amount, or zero when no code was applied.
    #[must_use]
    pub fn discount_amount(&self) -> Price {
        self.discount.as_ref().map_or(Price::ZERO, |d| d.amount)
    }
}

/// Aggregate figures across every recorded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub total_orders: u64,
    pub total_purchase_amount: Price,
    pub total_discount_amount: Price,
}

/// Journal operations over a storage backend.
pub struct OrderJournal<'a, B: ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: StoreBackend + ?Sized> OrderJournal<'a, B> {
    /// Create a journal view over `backend`.
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Record a completed order.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend rejects the order.
    pub fn append(&mut self, order: Order) -> std::result::Result<(), StorageError> {
        self.backend.append_order(order)
    }

    /// Number of recorded orders.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn count(&self) -> std::result::Result<u64, StorageError> {
        self.backend.order_count()
    }

    /// Every recorded order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn list(&self) -> std::result::Result<Vec<Order>, StorageError> {
        self.backend.orders()
    }

    /// Totals across all orders. Sums clamp at the largest representable
    /// amount rather than failing.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn aggregate(&self) -> std::result::Result<OrderTotals, StorageError> {
        let orders = self.backend.orders()?;

        Ok(OrderTotals {
            total_orders: orders.len() as u64,
            total_purchase_amount: orders
                .iter()
                .map(|o| o.total_amount)
                .fold(Price::ZERO, Price::saturating_add),
            total_discount_amount: orders
                .iter()
                .map(Order::discount_amount)
                .fold(Price::ZERO, Price::saturating_add),
        })
    }
}

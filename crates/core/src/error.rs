//! Store error taxonomy.

use thiserror::Error;

use crate::discount::DiscountRejection;
use crate::storage::StorageError;
use crate::types::ProductId;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested quantity is zero or negative.
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    /// Adding to a cart line would exceed the maximum quantity.
    #[error("Quantity for product {0} is too large")]
    QuantityOverflow(ProductId),

    /// A line or order amount does not fit in a decimal.
    #[error("Order amount is too large")]
    AmountOverflow,

    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    UnknownProduct(ProductId),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line refers to a product that no longer exists.
    #[error("Product in cart is no longer available: {0}")]
    StaleProduct(ProductId),

    /// Presented discount code cannot be redeemed.
    #[error(transparent)]
    Discount(#[from] DiscountRejection),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A previous operation panicked while holding the store lock.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Broad classes of [`StoreError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    InvalidInput,
    /// Referenced resource does not exist.
    NotFound,
    /// Request is well-formed but violates a business rule.
    BusinessRule,
    /// Failure inside the store itself.
    Internal,
}

impl StoreError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity | Self::QuantityOverflow(_) | Self::AmountOverflow => {
                ErrorKind::InvalidInput
            }
            Self::UnknownProduct(_) | Self::StaleProduct(_) => ErrorKind::NotFound,
            Self::EmptyCart | Self::Discount(_) => ErrorKind::BusinessRule,
            Self::Storage(_) | Self::LockPoisoned => ErrorKind::Internal,
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            StoreError::from(DiscountRejection::AlreadyUsed).to_string(),
            "Discount code has already been used"
        );
        assert_eq!(
            StoreError::UnknownProduct(ProductId::new("9")).to_string(),
            "Product not found: 9"
        );
    }

    #[test]
    fn test_store_error_kinds() {
        assert_eq!(StoreError::InvalidQuantity.kind(), ErrorKind::InvalidInput);
        assert_eq!(StoreError::AmountOverflow.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            StoreError::StaleProduct(ProductId::new("1")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            StoreError::Discount(DiscountRejection::SlotPassed { slot: 3 }).kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(StoreError::LockPoisoned.kind(), ErrorKind::Internal);
    }
}

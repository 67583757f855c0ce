//! Checkout Lane Core - store logic and shared types.
//!
//! This crate holds everything the HTTP layer needs to run the store:
//! - [`catalog`] - Read-only product catalog
//! - [`cart`] - Per-session cart ledger
//! - [`discount`] - "Every Nth order" discount codes
//! - [`journal`] - Append-only order journal and aggregates
//! - [`store`] - The facade that composes the above behind one lock
//!
//! # Architecture
//!
//! No HTTP, no environment access. Mutable state lives behind the
//! [`storage::StoreBackend`] trait; [`storage::MemoryBackend`] is the only
//! implementation and keeps everything in process memory.
//!
//! # Example
//!
//! ```rust
//! use checkout_lane_core::{Catalog, DiscountPolicy, ProductId, SessionId, Store};
//!
//! let store = Store::in_memory(Catalog::embedded().unwrap(), DiscountPolicy::default());
//! let session = SessionId::parse("session_1").unwrap();
//!
//! store.add_to_cart(&session, &ProductId::new("1"), 2).unwrap();
//! let order = store.checkout(&session, None).unwrap();
//! assert_eq!(order.items.len(), 1);
//!
//! // The next order is only the second, so no code is available yet.
//! assert!(store.generate_discount_code().unwrap().is_none());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod discount;
pub mod error;
pub mod journal;
pub mod storage;
pub mod store;
pub mod types;

pub use cart::{CartLedger, CartLine};
pub use catalog::{Catalog, CatalogError, Product};
pub use discount::{
    DiscountCode, DiscountEngine, DiscountPolicy, DiscountPolicyError, DiscountRejection,
};
pub use error::{ErrorKind, StoreError};
pub use journal::{AppliedDiscount, Order, OrderItem, OrderJournal, OrderTotals};
pub use storage::{MemoryBackend, StorageError, StoreBackend};
pub use store::{Store, StoreStats};
pub use types::*;

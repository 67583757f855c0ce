//! Core types for Checkout Lane.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod session;

pub use id::*;
pub use price::{DiscountRate, DiscountRateError, Price, PriceError};
pub use session::{SessionId, SessionIdError};

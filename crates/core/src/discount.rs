//! "Every Nth order" discount codes.
//!
//! A code is bound to a *slot*: the 1-based position of the order it may be
//! redeemed on. Codes can only be minted when the next slot is a multiple of
//! N, and are only redeemable while their slot is still the next one. Once any
//! order takes that slot, with or without the code, the code is permanently
//! expired.

use std::num::NonZeroU64;

use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::journal::OrderJournal;
use crate::storage::{StorageError, StoreBackend};
use crate::types::DiscountRate;

/// Length of the random part of a minted code.
const CODE_SUFFIX_LEN: usize = 6;

/// An issued discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCode {
    pub code: String,
    pub is_used: bool,
    /// The order slot this code is redeemable on.
    pub order_index_condition: u64,
}

/// Why a presented code cannot be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscountRejection {
    #[error("Discount code not found")]
    NotFound,
    #[error("Discount code has already been used")]
    AlreadyUsed,
    #[error("Discount code has expired: order #{slot} has already been placed")]
    SlotPassed { slot: u64 },
}

/// Errors constructing a [`DiscountPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountPolicyError {
    #[error("every-nth-order threshold must be at least 1")]
    ZeroThreshold,
}

/// How often codes become available and how much they take off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPolicy {
    every_nth: NonZeroU64,
    rate: DiscountRate,
}

impl DiscountPolicy {
    /// Default threshold: every third order.
    pub const DEFAULT_EVERY_NTH: NonZeroU64 = match NonZeroU64::new(3) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountPolicyError::ZeroThreshold`] if `every_nth` is 0.
    pub fn new(every_nth: u64, rate: DiscountRate) -> Result<Self, DiscountPolicyError> {
        let every_nth = NonZeroU64::new(every_nth).ok_or(DiscountPolicyError::ZeroThreshold)?;
        Ok(Self { every_nth, rate })
    }

    /// The threshold N.
    #[must_use]
    pub const fn every_nth(&self) -> u64 {
        self.every_nth.get()
    }

    /// The fraction taken off a discounted order.
    #[must_use]
    pub const fn rate(&self) -> DiscountRate {
        self.rate
    }

    /// Whether a code may be minted for `slot`.
    #[must_use]
    pub const fn is_eligible_slot(&self, slot: u64) -> bool {
        slot % self.every_nth.get() == 0
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self {
            every_nth: Self::DEFAULT_EVERY_NTH,
            rate: DiscountRate::default(),
        }
    }
}

/// Discount decisions over a storage backend.
pub struct DiscountEngine<'a, B: ?Sized> {
    backend: &'a mut B,
    policy: DiscountPolicy,
}

impl<'a, B: StoreBackend + ?Sized> DiscountEngine<'a, B> {
    /// Create an engine view over `backend`.
    pub fn new(backend: &'a mut B, policy: DiscountPolicy) -> Self {
        Self { backend, policy }
    }

    /// The slot the next order will occupy.
    fn next_slot(&mut self) -> Result<u64, StorageError> {
        Ok(OrderJournal::new(&mut *self.backend).count()? + 1)
    }

    /// Issue a code for the next order, if that order is an Nth order.
    ///
    /// Repeated calls while the slot is still pending return the same code.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn generate(&mut self) -> Result<Option<String>, StorageError> {
        let slot = self.next_slot()?;

        if !self.policy.is_eligible_slot(slot) {
            tracing::debug!(
                slot,
                every_nth = self.policy.every_nth(),
                "slot not eligible for a discount code"
            );
            return Ok(None);
        }

        if let Some(existing) = self.backend.find_unused_discount_code(slot)? {
            return Ok(Some(existing.code));
        }

        let code = self.mint_code(slot)?;
        self.backend.insert_discount_code(DiscountCode {
            code: code.clone(),
            is_used: false,
            order_index_condition: slot,
        })?;

        tracing::info!(slot, code = %code, "discount code issued");
        Ok(Some(code))
    }

    /// Check whether `code` can be redeemed on the next order.
    ///
    /// The inner result is the business decision: the rate to apply, or why
    /// the code is refused.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn validate(
        &mut self,
        code: &str,
    ) -> Result<Result<DiscountRate, DiscountRejection>, StorageError> {
        let Some(discount) = self.backend.find_discount_code(code)? else {
            return Ok(Err(DiscountRejection::NotFound));
        };

        if discount.is_used {
            return Ok(Err(DiscountRejection::AlreadyUsed));
        }

        if discount.order_index_condition != self.next_slot()? {
            return Ok(Err(DiscountRejection::SlotPassed {
                slot: discount.order_index_condition,
            }));
        }

        Ok(Ok(self.policy.rate()))
    }

    /// Flag `code` as redeemed. Unknown or already-used codes are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn mark_used(&mut self, code: &str) -> Result<(), StorageError> {
        if self.backend.mark_discount_code_used(code)? {
            tracing::info!(code, "discount code redeemed");
        }
        Ok(())
    }

    /// All issued codes, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    pub fn codes(&self) -> Result<Vec<DiscountCode>, StorageError> {
        self.backend.discount_codes()
    }

    /// Pick a code string for `slot` that is not already taken.
    fn mint_code(&self, slot: u64) -> Result<String, StorageError> {
        let mut rng = rand::rng();
        loop {
            let suffix = Alphanumeric
                .sample_string(&mut rng, CODE_SUFFIX_LEN)
                .to_ascii_uppercase();
            let code = format!("DISCOUNT_{slot}_{suffix}");
            if self.backend.find_discount_code(&code)?.is_none() {
                return Ok(code);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::journal::Order;
    use crate::storage::MemoryBackend;
    use crate::types::SessionId;

    fn policy(every_nth: u64) -> DiscountPolicy {
        DiscountPolicy::new(every_nth, DiscountRate::default()).unwrap()
    }

    fn place_order(backend: &mut MemoryBackend) {
        let session = SessionId::parse("s1").unwrap();
        let order = Order::new(session, Vec::new(), None).unwrap();
        OrderJournal::new(backend).append(order).unwrap();
    }

    #[test]
    fn test_policy_rejects_zero_threshold() {
        assert_eq!(
            DiscountPolicy::new(0, DiscountRate::default()),
            Err(DiscountPolicyError::ZeroThreshold)
        );
        assert_eq!(DiscountPolicy::default().every_nth(), 3);
        assert_eq!(DiscountPolicy::DEFAULT_EVERY_NTH.get(), 3);
    }

    #[test]
    fn test_generate_only_on_nth_slot() {
        for every_nth in 1..=5 {
            let mut backend = MemoryBackend::new();
            for orders in 0..12_u64 {
                let generated = DiscountEngine::new(&mut backend, policy(every_nth))
                    .generate()
                    .unwrap();
                assert_eq!(
                    generated.is_some(),
                    (orders + 1) % every_nth == 0,
                    "N={every_nth}, orders={orders}"
                );
                place_order(&mut backend);
            }

            for code in backend.discount_codes().unwrap() {
                assert_eq!(code.order_index_condition % every_nth, 0);
            }
        }
    }

    #[test]
    fn test_generate_is_idempotent_for_pending_slot() {
        let mut backend = MemoryBackend::new();
        place_order(&mut backend);
        place_order(&mut backend);

        let mut engine = DiscountEngine::new(&mut backend, policy(3));
        let first = engine.generate().unwrap().unwrap();
        let second = engine.generate().unwrap().unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("DISCOUNT_3_"));
        assert_eq!(engine.codes().unwrap().len(), 1);
    }

    #[test]
    fn test_validate_unknown_code() {
        let mut backend = MemoryBackend::new();
        let mut engine = DiscountEngine::new(&mut backend, policy(3));
        assert_eq!(
            engine.validate("NOPE").unwrap(),
            Err(DiscountRejection::NotFound)
        );
    }

    #[test]
    fn test_validate_after_mark_used() {
        let mut backend = MemoryBackend::new();
        let mut engine = DiscountEngine::new(&mut backend, policy(1));
        let code = engine.generate().unwrap().unwrap();

        assert_eq!(engine.validate(&code).unwrap(), Ok(DiscountRate::default()));

        engine.mark_used(&code).unwrap();
        engine.mark_used(&code).unwrap();
        engine.mark_used("unknown").unwrap();

        assert_eq!(
            engine.validate(&code).unwrap(),
            Err(DiscountRejection::AlreadyUsed)
        );
    }

    #[test]
    fn test_code_expires_when_slot_is_taken() {
        let mut backend = MemoryBackend::new();
        place_order(&mut backend);
        place_order(&mut backend);
        let code = DiscountEngine::new(&mut backend, policy(3))
            .generate()
            .unwrap()
            .unwrap();

        place_order(&mut backend);

        let mut engine = DiscountEngine::new(&mut backend, policy(3));
        assert_eq!(
            engine.validate(&code).unwrap(),
            Err(DiscountRejection::SlotPassed { slot: 3 })
        );
        assert!(!engine.codes().unwrap()[0].is_used);
    }

    #[test]
    fn test_new_code_after_previous_was_used() {
        let mut backend = MemoryBackend::new();
        let mut engine = DiscountEngine::new(&mut backend, policy(1));
        let first = engine.generate().unwrap().unwrap();
        engine.mark_used(&first).unwrap();

        let second = engine.generate().unwrap().unwrap();
        assert_ne!(first, second);
    }
}

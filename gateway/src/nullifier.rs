//! Nullifier registry
//!
//! A nullifier enters the set exactly once, in the same commit that marks its
//! withdrawal executed and debits the locked balance. It is never removed.

use crate::error::{GatewayError, Result};
use crate::storage::{LedgerBackend, StateChange};
use crate::types::{Nullifier, NullifierEntry, WithdrawalId};

/// Reject the all-zero nullifier
pub fn validate_nullifier(nullifier: &Nullifier) -> Result<()> {
    if nullifier.is_zero() {
        return Err(GatewayError::InvalidNullifier);
    }
    Ok(())
}

/// Read view over the backend's nullifier set
pub struct NullifierRegistry<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: LedgerBackend + ?Sized> NullifierRegistry<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub fn is_used(&self, nullifier: &Nullifier) -> Result<bool> {
        Ok(self.backend.nullifier(nullifier)?.is_some())
    }

    pub fn ensure_unused(&self, nullifier: &Nullifier) -> Result<()> {
        if self.is_used(nullifier)? {
            return Err(GatewayError::NullifierReused(*nullifier));
        }
        Ok(())
    }

    /// Stage consumption of `nullifier` by `withdrawal_id` into `change`
    pub fn consume(
        &self,
        change: &mut StateChange,
        nullifier: &Nullifier,
        withdrawal_id: &WithdrawalId,
        spent_at: i64,
    ) -> Result<()> {
        validate_nullifier(nullifier)?;
        if change.stages_nullifier(nullifier) {
            return Err(GatewayError::NullifierReused(*nullifier));
        }
        self.ensure_unused(nullifier)?;

        change.nullifiers.push(NullifierEntry {
            nullifier: *nullifier,
            withdrawal_id: *withdrawal_id,
            spent_at,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::types::{ChainId, Hash32};

    #[test]
    fn test_consume_once() {
        let mut backend = MemoryBackend::new(ChainId(1));
        let n = Hash32([5u8; 32]);
        let id = Hash32([6u8; 32]);

        let mut change = StateChange::new();
        NullifierRegistry::new(&backend).consume(&mut change, &n, &id, 10).unwrap();
        assert!(!NullifierRegistry::new(&backend).is_used(&n).unwrap());
        backend.commit(change).unwrap();

        let registry = NullifierRegistry::new(&backend);
        assert!(registry.is_used(&n).unwrap());
        let mut change = StateChange::new();
        assert_eq!(
            registry.consume(&mut change, &n, &id, 11),
            Err(GatewayError::NullifierReused(n))
        );
        assert!(change.nullifiers.is_empty());
    }

    #[test]
    fn test_double_stage_rejected() {
        let backend = MemoryBackend::new(ChainId(1));
        let registry = NullifierRegistry::new(&backend);
        let n = Hash32([5u8; 32]);

        let mut change = StateChange::new();
        registry.consume(&mut change, &n, &Hash32([1u8; 32]), 0).unwrap();
        assert!(registry.consume(&mut change, &n, &Hash32([2u8; 32]), 0).is_err());
    }

    #[test]
    fn test_zero_nullifier_invalid() {
        assert_eq!(validate_nullifier(&Hash32::ZERO), Err(GatewayError::InvalidNullifier));
    }
}

//! Shared gateway handle for async hosts
//!
//! Several relayers may submit at once; every mutation takes the write lock,
//! so operations are applied one at a time in lock-acquisition order.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::instructions::{DepositData, RequestWithdrawalData};
use crate::logging;
use crate::signature::SignatureVerifier;
use crate::storage::LedgerBackend;
use crate::types::{AccountId, DepositId, WithdrawalId};
use crate::Gateway;

/// Cloneable handle to one gateway
pub struct SharedGateway<B, V> {
    inner: Arc<RwLock<Gateway<B, V>>>,
}

impl<B, V> Clone for SharedGateway<B, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: LedgerBackend, V: SignatureVerifier> SharedGateway<B, V> {
    pub fn new(gateway: Gateway<B, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(gateway)),
        }
    }

    pub async fn deposit(&self, caller: &AccountId, data: DepositData) -> Result<DepositId> {
        // No deposit id exists until the commit lands
        tracing::debug!(
            target: logging::TARGET_DEPOSIT,
            request_id = %logging::generate_correlation_id(),
            caller = %caller,
            "deposit submitted"
        );
        self.inner.write().await.deposit(caller, data)
    }

    pub async fn request_withdrawal(
        &self,
        caller: &AccountId,
        data: RequestWithdrawalData,
    ) -> Result<WithdrawalId> {
        self.inner.write().await.request_withdrawal(caller, data)
    }

    pub async fn execute_withdrawal(&self, withdrawal_id: &WithdrawalId, signature: &[u8]) -> Result<()> {
        let mut gateway = self.inner.write().await;
        tracing::debug!(
            target: logging::TARGET_WITHDRAWAL,
            withdrawal_id = %withdrawal_id,
            "execute lock acquired"
        );
        gateway.execute_withdrawal(withdrawal_id, signature)
    }

    /// Run a read-only closure (queries)
    pub async fn read<T>(&self, f: impl FnOnce(&Gateway<B, V>) -> T) -> T {
        f(&*self.inner.read().await)
    }

    /// Run a mutating closure (admin operations, host access)
    pub async fn with<T>(&self, f: impl FnOnce(&mut Gateway<B, V>) -> T) -> T {
        f(&mut *self.inner.write().await)
    }

    pub async fn lock(&self) -> RwLockWriteGuard<'_, Gateway<B, V>> {
        self.inner.write().await
    }

    pub async fn lock_read(&self) -> RwLockReadGuard<'_, Gateway<B, V>> {
        self.inner.read().await
    }
}

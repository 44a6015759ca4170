//! Ledger Backend Trait
//!
//! The host environment a gateway runs on: persistent state, custody of
//! tokens, chain context and the event log. Operations read through the
//! backend, then hand it one [`StateChange`] that must be applied entirely or
//! not at all.
//!
//! Implementations:
//! - `MemoryBackend` - in-memory host for tests and simulation
//! - chain adapters, which map each field to contract storage and token calls

use std::collections::BTreeMap;
use thiserror::Error;

use crate::events::GatewayEvent;
use crate::types::{
    AccountId, Amount, BridgeStats, ChainContext, DepositId, DepositRecord, GatewayConfig,
    Nullifier, NullifierEntry, OperationClass, TokenId, WithdrawalId, WithdrawalRequest,
};

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("custody transfer rejected: {0}")]
    Transfer(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Token movement between an external account and gateway custody
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustodyTransfer {
    /// Pull from `from` into custody
    Inbound {
        from: AccountId,
        token: TokenId,
        amount: Amount,
    },
    /// Push from custody to `to`
    Outbound {
        to: AccountId,
        token: TokenId,
        amount: Amount,
    },
}

/// Everything one operation writes
///
/// Records in `withdrawals` are upserts (a request is inserted, later
/// rewritten as executed). Deposits and nullifiers are insert-only.
/// `locked_balances` and `nonces` carry absolute new values.
#[derive(Debug, Clone, Default)]
pub struct StateChange {
    pub config: Option<GatewayConfig>,
    pub deposits: Vec<DepositRecord>,
    pub withdrawals: Vec<WithdrawalRequest>,
    pub nullifiers: Vec<NullifierEntry>,
    pub locked_balances: BTreeMap<TokenId, Amount>,
    pub nonces: BTreeMap<OperationClass, u64>,
    pub stats: Option<BridgeStats>,
    pub liquidity_providers: Vec<(AccountId, bool)>,
    pub transfers: Vec<CustodyTransfer>,
    pub events: Vec<GatewayEvent>,
}

impl StateChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: GatewayEvent) {
        self.events.push(event);
    }

    /// True if a nullifier is already staged in this change
    pub fn stages_nullifier(&self, nullifier: &Nullifier) -> bool {
        self.nullifiers.iter().any(|n| &n.nullifier == nullifier)
    }
}

/// Host backend interface
///
/// Reads are infallible in memory but may fail on real hosts, hence
/// `StorageResult` everywhere.
pub trait LedgerBackend: Send {
    /// Chain id, height, time and block hash of the executing transaction
    fn chain_context(&self) -> ChainContext;

    /// `None` until Initialize has committed
    fn config(&self) -> StorageResult<Option<GatewayConfig>>;

    fn deposit(&self, id: &DepositId) -> StorageResult<Option<DepositRecord>>;

    fn withdrawal(&self, id: &WithdrawalId) -> StorageResult<Option<WithdrawalRequest>>;

    /// All requests (pending or executed) that reference `nullifier`
    fn withdrawals_by_nullifier(&self, nullifier: &Nullifier) -> StorageResult<Vec<WithdrawalRequest>>;

    fn nullifier(&self, nullifier: &Nullifier) -> StorageResult<Option<NullifierEntry>>;

    fn locked_balance(&self, token: &TokenId) -> StorageResult<Amount>;

    /// Tokens the gateway actually holds (locked + free liquidity)
    fn custody_balance(&self, token: &TokenId) -> StorageResult<Amount>;

    /// Next nonce for the class
    fn nonce(&self, class: OperationClass) -> StorageResult<u64>;

    fn stats(&self) -> StorageResult<BridgeStats>;

    fn is_liquidity_provider(&self, account: &AccountId) -> StorageResult<bool>;

    /// Apply `change` atomically, including its transfers and events
    fn commit(&mut self, change: StateChange) -> StorageResult<()>;
}

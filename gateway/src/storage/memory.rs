//! In-Memory Ledger Backend
//!
//! A complete host simulation for tests and local runs: token balances for
//! external accounts, gateway custody, a block clock and the event log.
//! Data is lost when the process exits.

use sha3::{Digest, Keccak256};
use std::collections::{HashMap, HashSet};

use super::traits::{CustodyTransfer, LedgerBackend, StateChange, StorageError, StorageResult};
use crate::events::GatewayEvent;
use crate::types::{
    AccountId, Amount, BridgeStats, ChainContext, ChainId, DepositId, DepositRecord, GatewayConfig,
    Hash32, Nullifier, NullifierEntry, OperationClass, TokenId, WithdrawalId, WithdrawalRequest,
};

/// Seconds added per simulated block
const BLOCK_TIME_SECS: i64 = 6;

/// In-memory host
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    context: ChainContext,
    config: Option<GatewayConfig>,
    deposits: HashMap<DepositId, DepositRecord>,
    withdrawals: HashMap<WithdrawalId, WithdrawalRequest>,
    nullifiers: HashMap<Nullifier, NullifierEntry>,
    locked: HashMap<TokenId, Amount>,
    nonces: HashMap<OperationClass, u64>,
    stats: BridgeStats,
    liquidity_providers: HashSet<AccountId>,
    /// External account balances
    wallets: HashMap<(AccountId, TokenId), Amount>,
    custody: HashMap<TokenId, Amount>,
    events: Vec<GatewayEvent>,
    fail_commits: bool,
}

impl MemoryBackend {
    /// Fresh host for `chain_id` at height 1
    pub fn new(chain_id: ChainId) -> Self {
        let genesis = Hash32(Keccak256::digest(chain_id.0.to_be_bytes()).into());
        Self::with_context(ChainContext {
            chain_id,
            block_height: 1,
            timestamp: chrono::Utc::now().timestamp(),
            block_hash: genesis,
        })
    }

    pub fn with_context(context: ChainContext) -> Self {
        Self {
            context,
            config: None,
            deposits: HashMap::new(),
            withdrawals: HashMap::new(),
            nullifiers: HashMap::new(),
            locked: HashMap::new(),
            nonces: HashMap::new(),
            stats: BridgeStats::default(),
            liquidity_providers: HashSet::new(),
            wallets: HashMap::new(),
            custody: HashMap::new(),
            events: Vec::new(),
            fail_commits: false,
        }
    }

    /// Move to the next block
    pub fn advance_block(&mut self) {
        let mut hasher = Keccak256::new();
        hasher.update(self.context.block_hash.as_bytes());
        hasher.update(self.context.block_height.to_le_bytes());
        self.context.block_hash = Hash32(hasher.finalize().into());
        self.context.block_height += 1;
        self.context.timestamp += BLOCK_TIME_SECS;
    }

    /// Credit an external account (test faucet)
    pub fn mint(&mut self, account: &AccountId, token: &TokenId, amount: Amount) {
        let balance = self.wallets.entry((account.clone(), token.clone())).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, account: &AccountId, token: &TokenId) -> Amount {
        self.wallets
            .get(&(account.clone(), token.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Events committed so far, oldest first
    pub fn events(&self) -> &[GatewayEvent] {
        &self.events
    }

    /// Make every commit fail with a backend error until reset
    pub fn set_fail_commits(&mut self, fail: bool) {
        self.fail_commits = fail;
    }

    /// Check every insert and transfer against current state. Returns the
    /// post-transfer balances so nothing is mutated before validation passes.
    fn plan_transfers(
        &self,
        transfers: &[CustodyTransfer],
    ) -> StorageResult<(HashMap<(AccountId, TokenId), Amount>, HashMap<TokenId, Amount>)> {
        let mut wallets: HashMap<(AccountId, TokenId), Amount> = HashMap::new();
        let mut custody: HashMap<TokenId, Amount> = HashMap::new();

        for transfer in transfers {
            match transfer {
                CustodyTransfer::Inbound { from, token, amount } => {
                    let key = (from.clone(), token.clone());
                    let held = *wallets
                        .entry(key.clone())
                        .or_insert_with(|| self.balance_of(from, token));
                    let remaining = held.checked_sub(*amount).ok_or_else(|| {
                        StorageError::Transfer(format!(
                            "{} holds {} {}, needs {}",
                            from, held, token, amount
                        ))
                    })?;
                    wallets.insert(key, remaining);

                    let pool = custody
                        .entry(token.clone())
                        .or_insert_with(|| self.custody.get(token).copied().unwrap_or(0));
                    *pool = pool
                        .checked_add(*amount)
                        .ok_or_else(|| StorageError::Transfer("custody overflow".to_string()))?;
                }
                CustodyTransfer::Outbound { to, token, amount } => {
                    let pool = custody
                        .entry(token.clone())
                        .or_insert_with(|| self.custody.get(token).copied().unwrap_or(0));
                    let held_in_custody = *pool;
                    *pool = held_in_custody.checked_sub(*amount).ok_or_else(|| {
                        StorageError::Transfer(format!(
                            "custody holds {} {}, needs {}",
                            held_in_custody, token, amount
                        ))
                    })?;

                    let key = (to.clone(), token.clone());
                    let held = wallets
                        .entry(key)
                        .or_insert_with(|| self.balance_of(to, token));
                    *held = held.saturating_add(*amount);
                }
            }
        }

        Ok((wallets, custody))
    }
}

impl LedgerBackend for MemoryBackend {
    fn chain_context(&self) -> ChainContext {
        self.context
    }

    fn config(&self) -> StorageResult<Option<GatewayConfig>> {
        Ok(self.config.clone())
    }

    fn deposit(&self, id: &DepositId) -> StorageResult<Option<DepositRecord>> {
        Ok(self.deposits.get(id).cloned())
    }

    fn withdrawal(&self, id: &WithdrawalId) -> StorageResult<Option<WithdrawalRequest>> {
        Ok(self.withdrawals.get(id).cloned())
    }

    fn withdrawals_by_nullifier(&self, nullifier: &Nullifier) -> StorageResult<Vec<WithdrawalRequest>> {
        let mut found: Vec<WithdrawalRequest> = self
            .withdrawals
            .values()
            .filter(|w| &w.nullifier == nullifier)
            .cloned()
            .collect();
        found.sort_by_key(|w| (w.created_at, w.withdrawal_id));
        Ok(found)
    }

    fn nullifier(&self, nullifier: &Nullifier) -> StorageResult<Option<NullifierEntry>> {
        Ok(self.nullifiers.get(nullifier).cloned())
    }

    fn locked_balance(&self, token: &TokenId) -> StorageResult<Amount> {
        Ok(self.locked.get(token).copied().unwrap_or(0))
    }

    fn custody_balance(&self, token: &TokenId) -> StorageResult<Amount> {
        Ok(self.custody.get(token).copied().unwrap_or(0))
    }

    fn nonce(&self, class: OperationClass) -> StorageResult<u64> {
        Ok(self.nonces.get(&class).copied().unwrap_or(0))
    }

    fn stats(&self) -> StorageResult<BridgeStats> {
        Ok(self.stats.clone())
    }

    fn is_liquidity_provider(&self, account: &AccountId) -> StorageResult<bool> {
        Ok(self.liquidity_providers.contains(account))
    }

    fn commit(&mut self, change: StateChange) -> StorageResult<()> {
        if self.fail_commits {
            return Err(StorageError::Backend("commit rejected by host".to_string()));
        }

        // Validate everything first
        for deposit in &change.deposits {
            if self.deposits.contains_key(&deposit.deposit_id) {
                return Err(StorageError::Duplicate(format!("deposit {}", deposit.deposit_id)));
            }
        }
        for entry in &change.nullifiers {
            if self.nullifiers.contains_key(&entry.nullifier) {
                return Err(StorageError::Duplicate(format!("nullifier {}", entry.nullifier)));
            }
        }
        let (wallets, custody) = self.plan_transfers(&change.transfers)?;

        // Apply
        if let Some(config) = change.config {
            self.config = Some(config);
        }
        for deposit in change.deposits {
            self.deposits.insert(deposit.deposit_id, deposit);
        }
        for withdrawal in change.withdrawals {
            self.withdrawals.insert(withdrawal.withdrawal_id, withdrawal);
        }
        for entry in change.nullifiers {
            self.nullifiers.insert(entry.nullifier, entry);
        }
        self.locked.extend(change.locked_balances);
        self.nonces.extend(change.nonces);
        if let Some(stats) = change.stats {
            self.stats = stats;
        }
        for (account, enabled) in change.liquidity_providers {
            if enabled {
                self.liquidity_providers.insert(account);
            } else {
                self.liquidity_providers.remove(&account);
            }
        }
        self.wallets.extend(wallets);
        self.custody.extend(custody);
        self.events.extend(change.events);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    fn token() -> TokenId {
        TokenId::from("uatom")
    }

    #[test]
    fn test_inbound_then_outbound() {
        let mut backend = MemoryBackend::new(ChainId(1));
        backend.mint(&alice(), &token(), 100);

        let mut change = StateChange::new();
        change.transfers.push(CustodyTransfer::Inbound { from: alice(), token: token(), amount: 60 });
        backend.commit(change).unwrap();
        assert_eq!(backend.balance_of(&alice(), &token()), 40);
        assert_eq!(backend.custody_balance(&token()).unwrap(), 60);

        let bob = AccountId::from("bob");
        let mut change = StateChange::new();
        change.transfers.push(CustodyTransfer::Outbound { to: bob.clone(), token: token(), amount: 25 });
        backend.commit(change).unwrap();
        assert_eq!(backend.balance_of(&bob, &token()), 25);
        assert_eq!(backend.custody_balance(&token()).unwrap(), 35);
    }

    #[test]
    fn test_failed_transfer_applies_nothing() {
        let mut backend = MemoryBackend::new(ChainId(1));
        backend.mint(&alice(), &token(), 10);

        let mut change = StateChange::new();
        change.locked_balances.insert(token(), 50);
        change.nonces.insert(OperationClass::Deposit, 1);
        change.transfers.push(CustodyTransfer::Inbound { from: alice(), token: token(), amount: 50 });

        let err = backend.commit(change).unwrap_err();
        assert!(matches!(err, StorageError::Transfer(_)));
        assert_eq!(backend.locked_balance(&token()).unwrap(), 0);
        assert_eq!(backend.nonce(OperationClass::Deposit).unwrap(), 0);
        assert_eq!(backend.balance_of(&alice(), &token()), 10);
    }

    #[test]
    fn test_duplicate_nullifier_rejected() {
        let mut backend = MemoryBackend::new(ChainId(1));
        let entry = NullifierEntry {
            nullifier: Hash32([1u8; 32]),
            withdrawal_id: Hash32([2u8; 32]),
            spent_at: 0,
        };

        let mut change = StateChange::new();
        change.nullifiers.push(entry.clone());
        backend.commit(change).unwrap();

        let mut change = StateChange::new();
        change.nullifiers.push(entry);
        assert!(matches!(backend.commit(change), Err(StorageError::Duplicate(_))));
    }

    #[test]
    fn test_advance_block_changes_entropy() {
        let mut backend = MemoryBackend::new(ChainId(5));
        let before = backend.chain_context();
        backend.advance_block();
        let after = backend.chain_context();

        assert_eq!(after.block_height, before.block_height + 1);
        assert_eq!(after.timestamp, before.timestamp + BLOCK_TIME_SECS);
        assert_ne!(after.block_hash, before.block_hash);
        assert_eq!(after.chain_id, ChainId(5));
    }

    #[test]
    fn test_fail_commits() {
        let mut backend = MemoryBackend::new(ChainId(1));
        backend.set_fail_commits(true);
        assert!(matches!(
            backend.commit(StateChange::new()),
            Err(StorageError::Backend(_))
        ));
        backend.set_fail_commits(false);
        assert!(backend.commit(StateChange::new()).is_ok());
    }
}

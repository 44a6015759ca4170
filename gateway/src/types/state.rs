//! Gateway-wide state: configuration, statistics, nullifier entries, host context

use serde::{Deserialize, Serialize};

use super::{AccountId, Amount, AuthorityKey, ChainId, Hash32, Nullifier, WithdrawalId};

/// Administrative configuration, written by Initialize and the owner only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub owner: AccountId,
    pub authority: AuthorityKey,
    pub paused: bool,
    pub bridge_fee_bps: u16,
    pub min_deposit: Amount,
    pub max_deposit: Amount,
}

/// Running totals, updated in the same commit as the records they count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStats {
    /// Sum of net deposit amounts
    pub total_deposits: Amount,
    /// Sum of executed withdrawal amounts
    pub total_withdrawals: Amount,
    pub deposit_count: u64,
    pub request_count: u64,
    pub executed_count: u64,
    pub fees_collected: Amount,
}

impl BridgeStats {
    pub fn total_volume(&self) -> Amount {
        self.total_deposits.saturating_add(self.total_withdrawals)
    }

    pub fn active_deposits(&self) -> Amount {
        self.total_deposits.saturating_sub(self.total_withdrawals)
    }
}

/// A consumed nullifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierEntry {
    pub nullifier: Nullifier,
    /// The withdrawal whose execution consumed it
    pub withdrawal_id: WithdrawalId,
    pub spent_at: i64,
}

/// Host-chain facts for the current transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainContext {
    pub chain_id: ChainId,
    pub block_height: u64,
    /// Unix seconds
    pub timestamp: i64,
    pub block_hash: Hash32,
}

/// Operation classes that draw identifiers and nonces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    Deposit,
    Withdrawal,
}

impl OperationClass {
    pub fn domain_tag(&self) -> &'static [u8] {
        match self {
            OperationClass::Deposit => crate::constants::DEPOSIT_ID_TAG,
            OperationClass::Withdrawal => crate::constants::WITHDRAWAL_ID_TAG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_stats() {
        let stats = BridgeStats {
            total_deposits: 1_000,
            total_withdrawals: 400,
            ..Default::default()
        };
        assert_eq!(stats.total_volume(), 1_400);
        assert_eq!(stats.active_deposits(), 600);

        let drained = BridgeStats {
            total_deposits: 10,
            total_withdrawals: 20,
            ..Default::default()
        };
        assert_eq!(drained.active_deposits(), 0);
    }
}

//! Deposit records

use serde::{Deserialize, Serialize};

use super::{AccountId, Amount, ChainId, DepositId, Hash32, TokenId};

/// A locked deposit. Created once by Deposit and never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    pub deposit_id: DepositId,
    pub sender: AccountId,
    pub token: TokenId,
    /// Amount credited to the locked balance (after fee)
    pub net_amount: Amount,
    /// Fee retained in custody as liquidity
    pub fee: Amount,
    pub target_chain_id: ChainId,
    /// Chain-specific recipient encoding on the target chain
    pub recipient: Hash32,
    /// Shielded-pool note address
    pub privacy_destination: Hash32,
    pub created_at: i64,
    /// Advisory flag for off-chain processors; the ledger never sets it
    pub processed: bool,
}

impl DepositRecord {
    /// Gross amount the depositor transferred in
    pub fn gross_amount(&self) -> Amount {
        self.net_amount.saturating_add(self.fee)
    }
}

//! Withdrawal request records

use serde::{Deserialize, Serialize};

use super::{AccountId, Amount, Nullifier, ProofRoot, TokenId, WithdrawalId};

/// Withdrawal lifecycle
///
/// ```text
/// NonExistent -> Requested -> Executed
/// ```
///
/// `Executed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    NonExistent,
    Requested,
    Executed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::NonExistent => "non_existent",
            WithdrawalStatus::Requested => "requested",
            WithdrawalStatus::Executed => "executed",
        }
    }
}

/// A requested withdrawal awaiting (or past) authority-signed execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub withdrawal_id: WithdrawalId,
    /// The caller of RequestWithdrawal; funds are released to them
    pub recipient: AccountId,
    pub token: TokenId,
    pub amount: Amount,
    pub nullifier: Nullifier,
    pub proof_root: ProofRoot,
    pub created_at: i64,
    pub executed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<i64>,
}

impl WithdrawalRequest {
    pub fn status(&self) -> WithdrawalStatus {
        if self.executed {
            WithdrawalStatus::Executed
        } else {
            WithdrawalStatus::Requested
        }
    }
}

//! Gateway events
//!
//! Append-only records consumed by the Coordinator and relayers. Serialised as
//! `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

use crate::types::{
    hex_bytes, AccountId, Amount, AuthorityKey, ChainId, DepositId, Hash32, Nullifier, ProofRoot,
    TokenId, WithdrawalId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GatewayEvent {
    TokensLocked {
        deposit_id: DepositId,
        sender: AccountId,
        token: TokenId,
        net_amount: Amount,
        fee: Amount,
        target_chain_id: ChainId,
        recipient: Hash32,
        privacy_destination: Hash32,
        timestamp: i64,
    },
    WithdrawalRequested {
        withdrawal_id: WithdrawalId,
        recipient: AccountId,
        token: TokenId,
        amount: Amount,
        nullifier: Nullifier,
        #[serde(with = "hex_bytes")]
        proof_blob: Vec<u8>,
        proof_root: ProofRoot,
        timestamp: i64,
    },
    TokensReleased {
        withdrawal_id: WithdrawalId,
        recipient: AccountId,
        token: TokenId,
        amount: Amount,
        nullifier: Nullifier,
        timestamp: i64,
    },
    CoordinatorUpdated {
        old_authority: AuthorityKey,
        new_authority: AuthorityKey,
        timestamp: i64,
    },
    LiquidityAdded {
        provider: AccountId,
        token: TokenId,
        amount: Amount,
        timestamp: i64,
    },
    LiquidityRemoved {
        provider: AccountId,
        token: TokenId,
        amount: Amount,
        timestamp: i64,
    },
    EmergencyPause {
        paused: bool,
        triggered_by: AccountId,
        timestamp: i64,
    },
    BridgeFeeUpdated {
        old_fee_bps: u16,
        new_fee_bps: u16,
        timestamp: i64,
    },
    LiquidityProviderUpdated {
        provider: AccountId,
        enabled: bool,
        timestamp: i64,
    },
    EmergencyWithdrawal {
        token: TokenId,
        to: AccountId,
        amount: Amount,
        triggered_by: AccountId,
        timestamp: i64,
    },
}

impl GatewayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GatewayEvent::TokensLocked { .. } => "tokens_locked",
            GatewayEvent::WithdrawalRequested { .. } => "withdrawal_requested",
            GatewayEvent::TokensReleased { .. } => "tokens_released",
            GatewayEvent::CoordinatorUpdated { .. } => "coordinator_updated",
            GatewayEvent::LiquidityAdded { .. } => "liquidity_added",
            GatewayEvent::LiquidityRemoved { .. } => "liquidity_removed",
            GatewayEvent::EmergencyPause { .. } => "emergency_pause",
            GatewayEvent::BridgeFeeUpdated { .. } => "bridge_fee_updated",
            GatewayEvent::LiquidityProviderUpdated { .. } => "liquidity_provider_updated",
            GatewayEvent::EmergencyWithdrawal { .. } => "emergency_withdrawal",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

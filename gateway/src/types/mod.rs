//! Ledger data types

pub mod deposit;
pub mod primitives;
pub mod state;
pub mod withdrawal;

pub use deposit::DepositRecord;
pub use primitives::{
    hex_bytes, AccountId, Amount, AuthorityKey, ChainId, DepositId, Hash32, Nullifier,
    ProofRoot, TokenId, WithdrawalId,
};
pub use state::{BridgeStats, ChainContext, GatewayConfig, NullifierEntry, OperationClass};
pub use withdrawal::{WithdrawalRequest, WithdrawalStatus};

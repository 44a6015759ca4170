//! Access control
//!
//! Every state-changing operation maps to one [`Permission`]. The check runs
//! once at the state-machine boundary, together with the pause rules.

use std::fmt;

use crate::error::{GatewayError, Result};
use crate::types::{AccountId, GatewayConfig};

/// Capability required to invoke an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Anyone
    Public,
    /// The configured owner
    Owner,
    /// Members of the liquidity-provider set
    LiquidityProvider,
}

/// State-changing gateway operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Deposit,
    RequestWithdrawal,
    ExecuteWithdrawal,
    AddLiquidity,
    RemoveLiquidity,
    SetAuthority,
    SetPaused,
    SetBridgeFee,
    AddLiquidityProvider,
    RemoveLiquidityProvider,
    EmergencyWithdraw,
}

impl Operation {
    pub fn permission(self) -> Permission {
        match self {
            Operation::Deposit | Operation::RequestWithdrawal | Operation::ExecuteWithdrawal => {
                Permission::Public
            }
            Operation::AddLiquidity | Operation::RemoveLiquidity => Permission::LiquidityProvider,
            Operation::SetAuthority
            | Operation::SetPaused
            | Operation::SetBridgeFee
            | Operation::AddLiquidityProvider
            | Operation::RemoveLiquidityProvider
            | Operation::EmergencyWithdraw => Permission::Owner,
        }
    }

    /// Operations refused while the bridge is paused
    pub fn blocked_when_paused(self) -> bool {
        matches!(
            self,
            Operation::Deposit
                | Operation::RequestWithdrawal
                | Operation::ExecuteWithdrawal
                | Operation::AddLiquidity
                | Operation::RemoveLiquidity
        )
    }

    /// Operations only allowed while the bridge is paused
    pub fn requires_paused(self) -> bool {
        matches!(self, Operation::EmergencyWithdraw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::RequestWithdrawal => "request_withdrawal",
            Operation::ExecuteWithdrawal => "execute_withdrawal",
            Operation::AddLiquidity => "add_liquidity",
            Operation::RemoveLiquidity => "remove_liquidity",
            Operation::SetAuthority => "set_authority",
            Operation::SetPaused => "set_paused",
            Operation::SetBridgeFee => "set_bridge_fee",
            Operation::AddLiquidityProvider => "add_liquidity_provider",
            Operation::RemoveLiquidityProvider => "remove_liquidity_provider",
            Operation::EmergencyWithdraw => "emergency_withdraw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check role and pause rules for `op`.
///
/// `caller` is `None` for operations submitted without an identified caller
/// (relayed executions); only public operations accept that.
pub fn authorize(
    op: Operation,
    caller: Option<&AccountId>,
    config: &GatewayConfig,
    is_liquidity_provider: bool,
) -> Result<()> {
    let permitted = match op.permission() {
        Permission::Public => true,
        Permission::Owner => caller == Some(&config.owner),
        Permission::LiquidityProvider => caller.is_some() && is_liquidity_provider,
    };
    if !permitted {
        return Err(GatewayError::Unauthorized(op));
    }

    if config.paused && op.blocked_when_paused() {
        return Err(GatewayError::BridgePaused);
    }
    if !config.paused && op.requires_paused() {
        return Err(GatewayError::MustBePaused);
    }

    Ok(())
}

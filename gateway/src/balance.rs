//! Balance ledger
//!
//! `locked[token]` tracks value owed to depositors: credited with net deposit
//! amounts, debited by executed withdrawals. Whatever custody holds beyond
//! that (fees, provider liquidity) is free liquidity.

use crate::constants::{BPS_DENOMINATOR, MAX_BRIDGE_FEE_BPS};
use crate::error::{GatewayError, Result};
use crate::storage::{LedgerBackend, StateChange};
use crate::types::{Amount, TokenId};

/// Split a gross deposit into `(fee, net)`
pub fn split_fee(amount: Amount, fee_bps: u16) -> Result<(Amount, Amount)> {
    if fee_bps > MAX_BRIDGE_FEE_BPS {
        return Err(GatewayError::FeeTooHigh {
            bps: fee_bps,
            max: MAX_BRIDGE_FEE_BPS,
        });
    }
    let fee = amount
        .checked_mul(fee_bps as Amount)
        .ok_or(GatewayError::Overflow)?
        / BPS_DENOMINATOR;
    Ok((fee, amount - fee))
}

/// Read view plus staged writes for locked balances
pub struct BalanceLedger<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: LedgerBackend + ?Sized> BalanceLedger<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Locked balance including anything already staged in `change`
    fn staged_locked(&self, change: &StateChange, token: &TokenId) -> Result<Amount> {
        match change.locked_balances.get(token) {
            Some(amount) => Ok(*amount),
            None => Ok(self.backend.locked_balance(token)?),
        }
    }

    pub fn locked(&self, token: &TokenId) -> Result<Amount> {
        Ok(self.backend.locked_balance(token)?)
    }

    /// `custody - locked`, floored at zero
    pub fn available_liquidity(&self, token: &TokenId) -> Result<Amount> {
        let custody = self.backend.custody_balance(token)?;
        Ok(custody.saturating_sub(self.locked(token)?))
    }

    pub fn credit(&self, change: &mut StateChange, token: &TokenId, amount: Amount) -> Result<()> {
        let locked = self.staged_locked(change, token)?;
        let updated = locked.checked_add(amount).ok_or(GatewayError::Overflow)?;
        change.locked_balances.insert(token.clone(), updated);
        Ok(())
    }

    pub fn debit(&self, change: &mut StateChange, token: &TokenId, amount: Amount) -> Result<()> {
        let locked = self.staged_locked(change, token)?;
        let updated = locked
            .checked_sub(amount)
            .ok_or_else(|| GatewayError::InsufficientLockedBalance {
                token: token.clone(),
                locked,
                requested: amount,
            })?;
        change.locked_balances.insert(token.clone(), updated);
        Ok(())
    }

    /// Fail unless `amount` of free liquidity can leave custody
    pub fn ensure_liquidity(&self, token: &TokenId, amount: Amount) -> Result<()> {
        let available = self.available_liquidity(token)?;
        if available < amount {
            return Err(GatewayError::InsufficientLiquidity {
                token: token.clone(),
                available,
                requested: amount,
            });
        }
        Ok(())
    }
}

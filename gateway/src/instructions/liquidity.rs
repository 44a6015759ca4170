//! Liquidity instructions - providers top up or draw free custody

use crate::access::Operation;
use crate::error::Result;
use crate::events::GatewayEvent;
use crate::logging;
use crate::signature::SignatureVerifier;
use crate::storage::{CustodyTransfer, LedgerBackend, StateChange};
use crate::types::{AccountId, Amount, TokenId};
use crate::Gateway;

use super::{validate_nonzero, validate_token};

impl<B: LedgerBackend, V: SignatureVerifier> Gateway<B, V> {
    /// Move `amount` from a provider into custody. Locked balances are untouched.
    pub fn add_liquidity(&mut self, caller: &AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        self.guard(Operation::AddLiquidity, Some(caller))?;
        validate_nonzero(amount)?;
        validate_token(token)?;
        let ctx = self.backend.chain_context();

        let mut change = StateChange::new();
        change.transfers.push(CustodyTransfer::Inbound {
            from: caller.clone(),
            token: token.clone(),
            amount,
        });
        change.emit(GatewayEvent::LiquidityAdded {
            provider: caller.clone(),
            token: token.clone(),
            amount,
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_liquidity_event("liquidity_added", &caller.to_string(), token.as_str(), amount);
        Ok(())
    }

    /// Return up to the free liquidity (custody minus locked) to a provider
    pub fn remove_liquidity(&mut self, caller: &AccountId, token: &TokenId, amount: Amount) -> Result<()> {
        self.guard(Operation::RemoveLiquidity, Some(caller))?;
        validate_nonzero(amount)?;
        validate_token(token)?;
        self.balances().ensure_liquidity(token, amount)?;
        let ctx = self.backend.chain_context();

        let mut change = StateChange::new();
        change.transfers.push(CustodyTransfer::Outbound {
            to: caller.clone(),
            token: token.clone(),
            amount,
        });
        change.emit(GatewayEvent::LiquidityRemoved {
            provider: caller.clone(),
            token: token.clone(),
            amount,
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_liquidity_event("liquidity_removed", &caller.to_string(), token.as_str(), amount);
        Ok(())
    }
}

//! Owner instructions
//!
//! All of these remain available while the bridge is paused;
//! `emergency_withdraw` is available only then.

use crate::access::Operation;
use crate::error::{GatewayError, Result};
use crate::events::GatewayEvent;
use crate::gateway::validate_fee;
use crate::logging;
use crate::signature::SignatureVerifier;
use crate::storage::{CustodyTransfer, LedgerBackend, StateChange};
use crate::types::{AccountId, Amount, AuthorityKey, TokenId};
use crate::Gateway;

use super::{validate_account, validate_nonzero, validate_token};

impl<B: LedgerBackend, V: SignatureVerifier> Gateway<B, V> {
    /// Rotate the Coordinator authority key
    pub fn set_authority(&mut self, caller: &AccountId, new_authority: AuthorityKey) -> Result<()> {
        let mut config = self.guard(Operation::SetAuthority, Some(caller))?;
        self.verifier
            .validate_key(&new_authority)
            .map_err(|e| GatewayError::InvalidAuthorityKey(e.to_string()))?;
        let ctx = self.backend.chain_context();

        let old_authority = std::mem::replace(&mut config.authority, new_authority.clone());

        let mut change = StateChange::new();
        change.config = Some(config);
        change.emit(GatewayEvent::CoordinatorUpdated {
            old_authority: old_authority.clone(),
            new_authority: new_authority.clone(),
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_security_event(
            "authority_rotated",
            true,
            serde_json::json!({
                "old": old_authority.to_hex(),
                "new": new_authority.to_hex(),
                "by": caller.to_string(),
            }),
            None,
        );
        Ok(())
    }

    pub fn set_paused(&mut self, caller: &AccountId, paused: bool) -> Result<()> {
        let mut config = self.guard(Operation::SetPaused, Some(caller))?;
        let ctx = self.backend.chain_context();
        config.paused = paused;

        let mut change = StateChange::new();
        change.config = Some(config);
        change.emit(GatewayEvent::EmergencyPause {
            paused,
            triggered_by: caller.clone(),
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_admin_event(
            if paused { "bridge_paused" } else { "bridge_unpaused" },
            &caller.to_string(),
            serde_json::json!({ "paused": paused }),
        );
        Ok(())
    }

    pub fn set_bridge_fee(&mut self, caller: &AccountId, fee_bps: u16) -> Result<()> {
        let mut config = self.guard(Operation::SetBridgeFee, Some(caller))?;
        validate_fee(fee_bps)?;
        let ctx = self.backend.chain_context();

        let old_fee_bps = config.bridge_fee_bps;
        config.bridge_fee_bps = fee_bps;

        let mut change = StateChange::new();
        change.config = Some(config);
        change.emit(GatewayEvent::BridgeFeeUpdated {
            old_fee_bps,
            new_fee_bps: fee_bps,
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_admin_event(
            "bridge_fee_updated",
            &caller.to_string(),
            serde_json::json!({ "old_fee_bps": old_fee_bps, "new_fee_bps": fee_bps }),
        );
        Ok(())
    }

    pub fn add_liquidity_provider(&mut self, caller: &AccountId, provider: &AccountId) -> Result<()> {
        self.update_liquidity_provider(Operation::AddLiquidityProvider, caller, provider, true)
    }

    pub fn remove_liquidity_provider(&mut self, caller: &AccountId, provider: &AccountId) -> Result<()> {
        self.update_liquidity_provider(Operation::RemoveLiquidityProvider, caller, provider, false)
    }

    fn update_liquidity_provider(
        &mut self,
        op: Operation,
        caller: &AccountId,
        provider: &AccountId,
        enabled: bool,
    ) -> Result<()> {
        self.guard(op, Some(caller))?;
        validate_account(provider)?;
        let ctx = self.backend.chain_context();

        let mut change = StateChange::new();
        change.liquidity_providers.push((provider.clone(), enabled));
        change.emit(GatewayEvent::LiquidityProviderUpdated {
            provider: provider.clone(),
            enabled,
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_admin_event(
            op.as_str(),
            &caller.to_string(),
            serde_json::json!({ "provider": provider.to_string() }),
        );
        Ok(())
    }

    /// Move tokens out of custody while paused, bounded by what custody holds.
    /// Locked balances and records are left as they are.
    pub fn emergency_withdraw(
        &mut self,
        caller: &AccountId,
        token: &TokenId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.guard(Operation::EmergencyWithdraw, Some(caller))?;
        validate_nonzero(amount)?;
        validate_token(token)?;
        validate_account(to)?;

        let custody = self.backend.custody_balance(token)?;
        if custody < amount {
            return Err(GatewayError::InsufficientLiquidity {
                token: token.clone(),
                available: custody,
                requested: amount,
            });
        }
        let ctx = self.backend.chain_context();

        let mut change = StateChange::new();
        change.transfers.push(CustodyTransfer::Outbound {
            to: to.clone(),
            token: token.clone(),
            amount,
        });
        change.emit(GatewayEvent::EmergencyWithdrawal {
            token: token.clone(),
            to: to.clone(),
            amount,
            triggered_by: caller.clone(),
            timestamp: ctx.timestamp,
        });
        self.commit(change)?;

        logging::log_security_event(
            "emergency_withdrawal",
            true,
            serde_json::json!({
                "token": token.as_str(),
                "to": to.to_string(),
                "amount": amount.to_string(),
                "by": caller.to_string(),
            }),
            None,
        );
        Ok(())
    }
}

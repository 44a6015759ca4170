//! Deposit instruction - locks tokens for bridging to another chain

use crate::access::Operation;
use crate::balance::split_fee;
use crate::error::{AmountIssue, GatewayError, Result};
use crate::events::GatewayEvent;
use crate::identifier::{derive_identifier, IdentifierExtras, IdentifierInput};
use crate::logging;
use crate::signature::SignatureVerifier;
use crate::storage::{CustodyTransfer, LedgerBackend, StateChange};
use crate::types::{AccountId, Amount, ChainId, DepositId, DepositRecord, Hash32, OperationClass, TokenId};
use crate::Gateway;

use super::{validate_account, validate_nonzero, validate_token};

/// Deposit instruction data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositData {
    pub token: TokenId,
    /// Gross amount pulled from the caller
    pub amount: Amount,
    pub target_chain_id: ChainId,
    /// Recipient encoding on the target chain
    pub recipient: Hash32,
    /// Shielded-pool note address
    pub privacy_destination: Hash32,
}

impl<B: LedgerBackend, V: SignatureVerifier> Gateway<B, V> {
    /// Lock `data.amount` from `caller` into custody and credit the net
    /// amount to the locked balance. Returns the new deposit id.
    pub fn deposit(&mut self, caller: &AccountId, data: DepositData) -> Result<DepositId> {
        let config = self.guard(Operation::Deposit, Some(caller))?;
        let ctx = self.backend.chain_context();

        // Validate input
        validate_nonzero(data.amount)?;
        if data.amount < config.min_deposit {
            return Err(GatewayError::InvalidAmount(AmountIssue::TooSmall {
                min: config.min_deposit,
            }));
        }
        if data.amount > config.max_deposit {
            return Err(GatewayError::InvalidAmount(AmountIssue::TooLarge {
                max: config.max_deposit,
            }));
        }
        if data.target_chain_id == ctx.chain_id {
            return Err(GatewayError::SameChainTarget(data.target_chain_id));
        }
        if data.recipient.is_zero() {
            return Err(GatewayError::InvalidRecipient);
        }
        if data.privacy_destination.is_zero() {
            return Err(GatewayError::InvalidPrivacyDestination);
        }
        validate_token(&data.token)?;
        validate_account(caller)?;

        let (fee, net_amount) = split_fee(data.amount, config.bridge_fee_bps)?;

        // Identifier
        let nonce = self.backend.nonce(OperationClass::Deposit)?;
        let deposit_id = derive_identifier(
            &IdentifierInput {
                caller,
                token: &data.token,
                amount: data.amount,
                nonce,
                extras: IdentifierExtras::Deposit {
                    target_chain_id: data.target_chain_id,
                    recipient: &data.recipient,
                },
            },
            &ctx,
        );
        if self.backend.deposit(&deposit_id)?.is_some() {
            return Err(GatewayError::IdentifierCollision(deposit_id));
        }

        // Stage writes
        let mut change = StateChange::new();
        self.balances().credit(&mut change, &data.token, net_amount)?;

        let mut stats = self.backend.stats()?;
        stats.total_deposits = stats
            .total_deposits
            .checked_add(net_amount)
            .ok_or(GatewayError::Overflow)?;
        stats.fees_collected = stats
            .fees_collected
            .checked_add(fee)
            .ok_or(GatewayError::Overflow)?;
        stats.deposit_count += 1;
        change.stats = Some(stats);

        change.nonces.insert(OperationClass::Deposit, nonce + 1);
        change.transfers.push(CustodyTransfer::Inbound {
            from: caller.clone(),
            token: data.token.clone(),
            amount: data.amount,
        });
        change.deposits.push(DepositRecord {
            deposit_id,
            sender: caller.clone(),
            token: data.token.clone(),
            net_amount,
            fee,
            target_chain_id: data.target_chain_id,
            recipient: data.recipient,
            privacy_destination: data.privacy_destination,
            created_at: ctx.timestamp,
            processed: false,
        });
        change.emit(GatewayEvent::TokensLocked {
            deposit_id,
            sender: caller.clone(),
            token: data.token.clone(),
            net_amount,
            fee,
            target_chain_id: data.target_chain_id,
            recipient: data.recipient,
            privacy_destination: data.privacy_destination,
            timestamp: ctx.timestamp,
        });

        self.commit(change)?;

        logging::log_deposit_event(
            "tokens_locked",
            &deposit_id.to_string(),
            data.token.as_str(),
            net_amount,
            fee,
            data.target_chain_id.0,
        );

        Ok(deposit_id)
    }
}

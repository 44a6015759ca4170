//! Request withdrawal instruction - records a withdrawal awaiting authority signature
//!
//! Nothing moves and the nullifier is not consumed: the request only makes
//! the proof visible to the Coordinator through `WithdrawalRequested`.

use crate::access::Operation;
use crate::error::{GatewayError, Result};
use crate::events::GatewayEvent;
use crate::identifier::{derive_identifier, IdentifierExtras, IdentifierInput};
use crate::logging;
use crate::nullifier::validate_nullifier;
use crate::signature::SignatureVerifier;
use crate::storage::{LedgerBackend, StateChange};
use crate::types::{AccountId, Amount, Nullifier, OperationClass, ProofRoot, TokenId, WithdrawalId, WithdrawalRequest};
use crate::Gateway;

use super::{validate_account, validate_nonzero, validate_token};

/// Request withdrawal instruction data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestWithdrawalData {
    pub token: TokenId,
    pub amount: Amount,
    pub nullifier: Nullifier,
    /// Opaque proof, forwarded to the Coordinator untouched
    pub proof_blob: Vec<u8>,
    pub proof_root: ProofRoot,
}

impl<B: LedgerBackend, V: SignatureVerifier> Gateway<B, V> {
    /// Record a withdrawal to `caller`. Returns the new withdrawal id.
    pub fn request_withdrawal(
        &mut self,
        caller: &AccountId,
        data: RequestWithdrawalData,
    ) -> Result<WithdrawalId> {
        self.guard(Operation::RequestWithdrawal, Some(caller))?;
        let ctx = self.backend.chain_context();

        validate_nonzero(data.amount)?;
        validate_token(&data.token)?;
        validate_account(caller)?;
        validate_nullifier(&data.nullifier)?;
        if data.proof_root.is_zero() {
            return Err(GatewayError::InvalidProofRoot);
        }

        if let Err(err) = self.nullifiers().ensure_unused(&data.nullifier) {
            logging::log_security_event(
                "nullifier_reused",
                false,
                serde_json::json!({
                    "stage": "request",
                    "nullifier": data.nullifier.to_hex(),
                    "caller": caller.to_string(),
                }),
                None,
            );
            return Err(err);
        }

        let nonce = self.backend.nonce(OperationClass::Withdrawal)?;
        let withdrawal_id = derive_identifier(
            &IdentifierInput {
                caller,
                token: &data.token,
                amount: data.amount,
                nonce,
                extras: IdentifierExtras::Withdrawal {
                    nullifier: &data.nullifier,
                },
            },
            &ctx,
        );
        if self.backend.withdrawal(&withdrawal_id)?.is_some() {
            return Err(GatewayError::IdentifierCollision(withdrawal_id));
        }

        let mut stats = self.backend.stats()?;
        stats.request_count += 1;

        let mut change = StateChange::new();
        change.stats = Some(stats);
        change.nonces.insert(OperationClass::Withdrawal, nonce + 1);
        change.withdrawals.push(WithdrawalRequest {
            withdrawal_id,
            recipient: caller.clone(),
            token: data.token.clone(),
            amount: data.amount,
            nullifier: data.nullifier,
            proof_root: data.proof_root,
            created_at: ctx.timestamp,
            executed: false,
            executed_at: None,
        });
        change.emit(GatewayEvent::WithdrawalRequested {
            withdrawal_id,
            recipient: caller.clone(),
            token: data.token.clone(),
            amount: data.amount,
            nullifier: data.nullifier,
            proof_blob: data.proof_blob,
            proof_root: data.proof_root,
            timestamp: ctx.timestamp,
        });

        self.commit(change)?;

        logging::log_withdrawal_event(
            "withdrawal_requested",
            &withdrawal_id.to_string(),
            data.token.as_str(),
            data.amount,
            &caller.to_string(),
            true,
            None,
        );

        Ok(withdrawal_id)
    }
}

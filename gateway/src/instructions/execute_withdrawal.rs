//! Execute withdrawal instruction - releases funds against an authority signature
//!
//! Checks run in a fixed order, all before anything is staged:
//!
//! 1. bridge not paused
//! 2. request exists and is not executed
//! 3. nullifier unused
//! 4. locked balance covers the amount
//! 5. signature over the canonical message verifies against the authority
//!
//! Marking executed, consuming the nullifier, the debit, the transfer and the
//! event then commit together.

use crate::access::Operation;
use crate::error::{GatewayError, Result};
use crate::events::GatewayEvent;
use crate::logging;
use crate::signature::{SignatureVerifier, WithdrawalAuthorization};
use crate::storage::{CustodyTransfer, LedgerBackend, StateChange};
use crate::types::WithdrawalId;
use crate::Gateway;

impl<B: LedgerBackend, V: SignatureVerifier> Gateway<B, V> {
    /// Execute a requested withdrawal. Submitted by any relayer; the
    /// signature is the only credential.
    pub fn execute_withdrawal(&mut self, withdrawal_id: &WithdrawalId, signature: &[u8]) -> Result<()> {
        let config = self.guard(Operation::ExecuteWithdrawal, None)?;
        let ctx = self.backend.chain_context();

        let mut request = self
            .backend
            .withdrawal(withdrawal_id)?
            .ok_or(GatewayError::WithdrawalNotFound(*withdrawal_id))?;
        if request.executed {
            return Err(GatewayError::AlreadyExecuted(*withdrawal_id));
        }

        if let Err(err) = self.nullifiers().ensure_unused(&request.nullifier) {
            logging::log_security_event(
                "nullifier_reused",
                false,
                serde_json::json!({
                    "stage": "execute",
                    "nullifier": request.nullifier.to_hex(),
                }),
                Some(&withdrawal_id.to_string()),
            );
            return Err(err);
        }

        let mut change = StateChange::new();
        self.balances().debit(&mut change, &request.token, request.amount)?;

        let message = WithdrawalAuthorization::from_request(&request, ctx.chain_id);
        if let Err(err) = self
            .verifier
            .verify_authorization(&config.authority, &message, signature)
        {
            logging::log_security_event(
                "invalid_authority_signature",
                false,
                serde_json::json!({
                    "scheme": self.verifier.scheme().as_str(),
                    "reason": err.to_string(),
                }),
                Some(&withdrawal_id.to_string()),
            );
            return Err(GatewayError::InvalidAuthoritySignature);
        }

        self.nullifiers()
            .consume(&mut change, &request.nullifier, withdrawal_id, ctx.timestamp)?;

        let mut stats = self.backend.stats()?;
        stats.total_withdrawals = stats
            .total_withdrawals
            .checked_add(request.amount)
            .ok_or(GatewayError::Overflow)?;
        stats.executed_count += 1;
        change.stats = Some(stats);

        request.executed = true;
        request.executed_at = Some(ctx.timestamp);

        change.transfers.push(CustodyTransfer::Outbound {
            to: request.recipient.clone(),
            token: request.token.clone(),
            amount: request.amount,
        });
        change.emit(GatewayEvent::TokensReleased {
            withdrawal_id: *withdrawal_id,
            recipient: request.recipient.clone(),
            token: request.token.clone(),
            amount: request.amount,
            nullifier: request.nullifier,
            timestamp: ctx.timestamp,
        });
        change.withdrawals.push(request.clone());

        if let Err(err) = self.commit(change) {
            logging::log_withdrawal_event(
                "release_failed",
                &withdrawal_id.to_string(),
                request.token.as_str(),
                request.amount,
                &request.recipient.to_string(),
                false,
                Some((err.error_code(), &err.to_string())),
            );
            return Err(err);
        }

        logging::log_withdrawal_event(
            "tokens_released",
            &withdrawal_id.to_string(),
            request.token.as_str(),
            request.amount,
            &request.recipient.to_string(),
            true,
            None,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InitParams;
    use crate::instructions::{DepositData, RequestWithdrawalData};
    use crate::signature::{AuthoritySigner, MockSignatureVerifier, SignatureError, SignatureScheme};
    use crate::storage::MemoryBackend;
    use crate::types::{AccountId, AuthorityKey, ChainId, Hash32, TokenId, WithdrawalStatus};

    fn token() -> TokenId {
        TokenId::from("uosmo")
    }

    /// Gateway with 997_000 locked and a pending 500 withdrawal to bob
    fn funded<V: SignatureVerifier>(verifier: V, authority: AuthorityKey) -> (Gateway<MemoryBackend, V>, WithdrawalId) {
        let alice = AccountId::from("alice");
        let mut backend = MemoryBackend::new(ChainId(1));
        backend.mint(&alice, &token(), 1_000_000);

        let params = InitParams::new(AccountId::from("owner"), authority);
        let mut gateway = Gateway::initialize(backend, verifier, params).unwrap();
        gateway
            .deposit(
                &alice,
                DepositData {
                    token: token(),
                    amount: 1_000_000,
                    target_chain_id: ChainId(2),
                    recipient: Hash32([1; 32]),
                    privacy_destination: Hash32([2; 32]),
                },
            )
            .unwrap();

        let id = gateway
            .request_withdrawal(
                &AccountId::from("bob"),
                RequestWithdrawalData {
                    token: token(),
                    amount: 500,
                    nullifier: Hash32([0x4e; 32]),
                    proof_blob: vec![],
                    proof_root: Hash32([0x52; 32]),
                },
            )
            .unwrap();
        (gateway, id)
    }

    #[test]
    fn test_execute_releases_funds() {
        let signer = SignatureScheme::Ed25519.generate_signer();
        let (mut gateway, id) = funded(SignatureScheme::Ed25519.verifier(), signer.authority_key());

        let request = gateway.withdrawal_request(&id).unwrap().unwrap();
        let sig = signer
            .sign_authorization(&WithdrawalAuthorization::from_request(&request, ChainId(1)))
            .unwrap();

        gateway.execute_withdrawal(&id, &sig).unwrap();

        assert_eq!(gateway.locked_balance(&token()).unwrap(), 996_500);
        assert_eq!(gateway.backend().balance_of(&AccountId::from("bob"), &token()), 500);
        assert!(gateway.is_nullifier_used(&Hash32([0x4e; 32])).unwrap());
        assert_eq!(gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Executed);
        assert_eq!(gateway.stats().unwrap().executed_count, 1);
        assert_eq!(gateway.stats().unwrap().total_withdrawals, 500);

        assert_eq!(gateway.execute_withdrawal(&id, &sig), Err(GatewayError::AlreadyExecuted(id)));
    }

    #[test]
    fn test_unknown_withdrawal() {
        let signer = SignatureScheme::EcdsaSecp256k1.generate_signer();
        let (mut gateway, _) = funded(SignatureScheme::EcdsaSecp256k1.verifier(), signer.authority_key());
        let unknown = Hash32([0xee; 32]);
        assert_eq!(
            gateway.execute_withdrawal(&unknown, &[0u8; 65]),
            Err(GatewayError::WithdrawalNotFound(unknown))
        );
    }

    #[test]
    fn test_rejected_signature_changes_nothing() {
        let mut verifier = MockSignatureVerifier::new();
        verifier.expect_validate_key().returning(|_| Ok(()));
        verifier.expect_scheme().return_const(SignatureScheme::SchnorrBip340);
        verifier
            .expect_verify_authorization()
            .times(1)
            .returning(|_, _, _| Err(SignatureError::SignerMismatch));

        let (mut gateway, id) = funded(verifier, AuthorityKey::new(vec![9u8; 32]));
        let events_before = gateway.backend().events().len();

        assert_eq!(
            gateway.execute_withdrawal(&id, &[0u8; 64]),
            Err(GatewayError::InvalidAuthoritySignature)
        );
        assert_eq!(gateway.locked_balance(&token()).unwrap(), 997_000);
        assert!(!gateway.is_nullifier_used(&Hash32([0x4e; 32])).unwrap());
        assert_eq!(gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Requested);
        assert_eq!(gateway.backend().events().len(), events_before);
    }

    #[test]
    fn test_failed_commit_is_total() {
        let mut verifier = MockSignatureVerifier::new();
        verifier.expect_validate_key().returning(|_| Ok(()));
        verifier.expect_scheme().return_const(SignatureScheme::Ed25519);
        verifier.expect_verify_authorization().returning(|_, _, _| Ok(()));

        let (mut gateway, id) = funded(verifier, AuthorityKey::new(vec![9u8; 32]));
        gateway.backend_mut().set_fail_commits(true);

        let err = gateway.execute_withdrawal(&id, &[]).unwrap_err();
        assert!(err.is_retryable());

        gateway.backend_mut().set_fail_commits(false);
        assert_eq!(gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Requested);
        gateway.execute_withdrawal(&id, &[]).unwrap();
        assert_eq!(gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Executed);
    }

    #[test]
    fn test_locked_balance_must_cover_amount() {
        let mut verifier = MockSignatureVerifier::new();
        verifier.expect_validate_key().returning(|_| Ok(()));
        verifier.expect_scheme().return_const(SignatureScheme::Ed25519);
        verifier.expect_verify_authorization().never();

        let (mut gateway, _) = funded(verifier, AuthorityKey::new(vec![9u8; 32]));
        let big = gateway
            .request_withdrawal(
                &AccountId::from("carol"),
                RequestWithdrawalData {
                    token: token(),
                    amount: 2_000_000,
                    nullifier: Hash32([0x77; 32]),
                    proof_blob: vec![],
                    proof_root: Hash32([0x52; 32]),
                },
            )
            .unwrap();

        assert!(matches!(
            gateway.execute_withdrawal(&big, &[]),
            Err(GatewayError::InsufficientLockedBalance { locked: 997_000, requested: 2_000_000, .. })
        ));
    }
}

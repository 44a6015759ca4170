//! End-to-end gateway scenarios on the in-memory backend

mod common;

use common::*;
use zerobridge_gateway::identifier::{derive_identifier, IdentifierExtras, IdentifierInput};
use zerobridge_gateway::{
    AccountId, ChainId, DepositRecord, ErrorKind, GatewayError, GatewayEvent, Hash32,
    LedgerBackend, OperationClass, SignatureScheme, StateChange, TokenId, WithdrawalRequest,
    WithdrawalStatus,
};

#[test]
fn test_deposit_fee_scenario() {
    let mut h = Harness::with_params(SignatureScheme::EcdsaSecp256k1, LOCAL_CHAIN, |p| {
        p.with_deposit_limits(1, 1_000_000)
    });
    h.fund("alice", 1_000);

    let id = h.deposit("alice", 1_000).unwrap();
    assert_eq!(h.locked(), 997);
    assert_eq!(h.wallet("alice"), 0);

    match h.gateway.backend().events().last() {
        Some(GatewayEvent::TokensLocked { deposit_id, net_amount, fee, .. }) => {
            assert_eq!(deposit_id, &id);
            assert_eq!(*net_amount, 997);
            assert_eq!(*fee, 3);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_full_withdrawal_lifecycle_every_scheme() {
    for scheme in SignatureScheme::ALL {
        let mut h = Harness::new(scheme);
        h.fund("alice", 10_000_000);
        h.deposit("alice", 10_000_000).unwrap();

        let id = h.request("bob", 2_500_000, 1).unwrap();
        assert_eq!(h.gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Requested);

        let sig = h.authorize(&id);
        h.gateway.execute_withdrawal(&id, &sig).unwrap();

        assert_eq!(h.wallet("bob"), 2_500_000, "{}", scheme);
        assert_eq!(h.locked(), 9_970_000 - 2_500_000, "{}", scheme);
        assert_eq!(h.gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Executed);

        let stats = h.gateway.stats().unwrap();
        assert_eq!(stats.total_volume(), 9_970_000 + 2_500_000);
        assert_eq!(stats.active_deposits(), 9_970_000 - 2_500_000);
    }
}

#[test]
fn test_signature_over_different_nullifier_rejected() {
    let mut h = Harness::new(SignatureScheme::EcdsaSecp256k1);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();
    let id = h.request("bob", 500, 0x4e).unwrap();

    let mut message = h.authorization(&id);
    message.nullifier = nullifier(0x4f);
    let sig = h.sign(&message);

    assert_eq!(
        h.gateway.execute_withdrawal(&id, &sig),
        Err(GatewayError::InvalidAuthoritySignature)
    );
    assert_eq!(h.locked(), 997_000);
    assert!(!h.gateway.is_nullifier_used(&nullifier(0x4e)).unwrap());
}

#[test]
fn test_any_flipped_signature_bit_rejected() {
    for scheme in SignatureScheme::ALL {
        let mut h = Harness::new(scheme);
        h.fund("alice", 1_000_000);
        h.deposit("alice", 1_000_000).unwrap();
        let id = h.request("bob", 500, 7).unwrap();
        let sig = h.authorize(&id);

        for bit in 0..sig.len() * 8 {
            let mut tampered = sig.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            assert_eq!(
                h.gateway.execute_withdrawal(&id, &tampered),
                Err(GatewayError::InvalidAuthoritySignature),
                "{} bit {}",
                scheme,
                bit
            );
        }

        assert_eq!(h.locked(), 997_000);
        h.gateway.execute_withdrawal(&id, &sig).unwrap();
    }
}

#[test]
fn test_any_altered_field_rejected() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();
    let id = h.request("bob", 500, 7).unwrap();
    let good = h.authorization(&id);

    let mut variants = Vec::new();
    let mut m = good.clone();
    m.withdrawal_id = Hash32([0x01; 32]);
    variants.push(m);
    let mut m = good.clone();
    m.recipient = AccountId::from("mallory");
    variants.push(m);
    let mut m = good.clone();
    m.token = TokenId::from("uatom");
    variants.push(m);
    let mut m = good.clone();
    m.amount += 1;
    variants.push(m);
    let mut m = good.clone();
    m.chain_id = ChainId(99);
    variants.push(m);

    for message in &variants {
        let sig = h.sign(message);
        assert_eq!(
            h.gateway.execute_withdrawal(&id, &sig),
            Err(GatewayError::InvalidAuthoritySignature)
        );
    }
    assert_eq!(h.gateway.withdrawal_status(&id).unwrap(), WithdrawalStatus::Requested);
}

#[test]
fn test_cross_chain_replay_rejected() {
    let mut h = Harness::new(SignatureScheme::SchnorrBip340);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();
    let id = h.request("bob", 500, 3).unwrap();

    // signed for a different chain
    let mut foreign = h.authorization(&id);
    foreign.chain_id = REMOTE_CHAIN;
    let sig = h.sign(&foreign);
    assert_eq!(
        h.gateway.execute_withdrawal(&id, &sig),
        Err(GatewayError::InvalidAuthoritySignature)
    );

    let sig = h.authorize(&id);
    h.gateway.execute_withdrawal(&id, &sig).unwrap();
}

#[test]
fn test_idempotent_execution() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();
    let id = h.request("bob", 500, 5).unwrap();
    let sig = h.authorize(&id);

    h.gateway.execute_withdrawal(&id, &sig).unwrap();
    let locked = h.locked();
    let events = h.gateway.backend().events().len();

    assert_eq!(
        h.gateway.execute_withdrawal(&id, &sig),
        Err(GatewayError::AlreadyExecuted(id))
    );
    assert_eq!(h.locked(), locked);
    assert_eq!(h.wallet("bob"), 500);
    assert_eq!(h.gateway.backend().events().len(), events);
}

#[test]
fn test_no_execution_before_request() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    let unknown = Hash32([0xde; 32]);
    assert_eq!(
        h.gateway.execute_withdrawal(&unknown, &[0u8; 64]),
        Err(GatewayError::WithdrawalNotFound(unknown))
    );
}

#[test]
fn test_nullifier_spent_once() {
    let mut h = Harness::new(SignatureScheme::EcdsaSecp256k1);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();

    let first = h.request("bob", 500, 9).unwrap();
    let second = h.request("eve", 400, 9).unwrap();
    assert_eq!(h.gateway.pending_requests_for_nullifier(&nullifier(9)).unwrap().len(), 2);

    let sig = h.authorize(&first);
    h.gateway.execute_withdrawal(&first, &sig).unwrap();

    let sig = h.authorize(&second);
    assert_eq!(
        h.gateway.execute_withdrawal(&second, &sig),
        Err(GatewayError::NullifierReused(nullifier(9)))
    );
    assert_eq!(
        h.request("carol", 100, 9),
        Err(GatewayError::NullifierReused(nullifier(9)))
    );
    assert_eq!(h.gateway.pending_requests_for_nullifier(&nullifier(9)).unwrap().len(), 1);
    assert_eq!(h.wallet("eve"), 0);
}

#[test]
fn test_pause_blocks_user_operations_only() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    h.fund("alice", 3_000_000);
    h.deposit("alice", 1_000_000).unwrap();
    let id = h.request("bob", 500, 1).unwrap();
    let sig = h.authorize(&id);

    h.gateway.set_paused(&owner(), true).unwrap();

    let errors = [
        h.deposit("alice", 1_000_000).unwrap_err(),
        h.request("bob", 500, 2).unwrap_err(),
        h.gateway.execute_withdrawal(&id, &sig).unwrap_err(),
    ];
    for err in &errors {
        assert_eq!(err, &GatewayError::BridgePaused);
        assert_eq!(err.kind(), ErrorKind::Operational);
    }

    // admin and emergency paths stay open
    h.gateway.set_bridge_fee(&owner(), 50).unwrap();
    let lp = AccountId::from("lp");
    h.gateway.add_liquidity_provider(&owner(), &lp).unwrap();
    let vault = AccountId::from("vault");
    h.gateway.emergency_withdraw(&owner(), &token(), &vault, 1_000).unwrap();
    assert_eq!(h.gateway.backend().balance_of(&vault, &token()), 1_000);

    h.gateway.set_paused(&owner(), false).unwrap();
    h.gateway.execute_withdrawal(&id, &sig).unwrap();
    assert_eq!(h.wallet("bob"), 500);
}

#[test]
fn test_authority_rotation_invalidates_old_signatures() {
    let mut h = Harness::new(SignatureScheme::EcdsaSecp256k1);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();
    let id = h.request("bob", 500, 1).unwrap();
    let old_sig = h.authorize(&id);

    let replacement = SignatureScheme::EcdsaSecp256k1.generate_signer();
    h.gateway
        .set_authority(&owner(), replacement.authority_key())
        .unwrap();

    assert_eq!(
        h.gateway.execute_withdrawal(&id, &old_sig),
        Err(GatewayError::InvalidAuthoritySignature)
    );

    h.signer = replacement;
    let sig = h.authorize(&id);
    h.gateway.execute_withdrawal(&id, &sig).unwrap();
}

#[test]
fn test_event_log_is_tagged_json() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();

    let json = h.gateway.backend().events()[0].to_json().unwrap();
    assert!(json.starts_with("{\"event\":\"tokens_locked\""));
    assert!(json.contains("\"data\":"));
}

#[test]
fn test_deposit_identifier_collision_keeps_existing_record() {
    let mut h = Harness::new(SignatureScheme::EcdsaSecp256k1);
    h.fund("alice", 1_000_000);

    let ctx = h.gateway.chain_context();
    let alice = AccountId::from("alice");
    let tok = token();
    let recipient = Hash32([0xaa; 32]);
    let id = derive_identifier(
        &IdentifierInput {
            caller: &alice,
            token: &tok,
            amount: 1_000_000,
            nonce: 0,
            extras: IdentifierExtras::Deposit {
                target_chain_id: REMOTE_CHAIN,
                recipient: &recipient,
            },
        },
        &ctx,
    );

    let existing = DepositRecord {
        deposit_id: id,
        sender: AccountId::from("mallory"),
        token: token(),
        net_amount: 7,
        fee: 0,
        target_chain_id: ChainId(9),
        recipient: Hash32([0xcc; 32]),
        privacy_destination: Hash32([0xdd; 32]),
        created_at: ctx.timestamp,
        processed: false,
    };
    h.gateway
        .backend_mut()
        .commit(StateChange {
            deposits: vec![existing.clone()],
            ..StateChange::default()
        })
        .unwrap();

    let locked = h.locked();
    let stats = h.gateway.stats().unwrap();
    let events = h.gateway.backend().events().len();

    let err = h.deposit("alice", 1_000_000).unwrap_err();
    assert!(matches!(err, GatewayError::IdentifierCollision(c) if c == id));

    assert_eq!(h.locked(), locked);
    assert_eq!(h.wallet("alice"), 1_000_000);
    assert_eq!(h.gateway.deposit_record(&id).unwrap(), Some(existing));
    assert_eq!(h.gateway.stats().unwrap(), stats);
    assert_eq!(h.gateway.backend().nonce(OperationClass::Deposit).unwrap(), 0);
    assert_eq!(h.gateway.backend().events().len(), events);
}

#[test]
fn test_request_identifier_collision_keeps_existing_record() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    h.fund("alice", 1_000_000);
    h.deposit("alice", 1_000_000).unwrap();

    let ctx = h.gateway.chain_context();
    let bob = AccountId::from("bob");
    let tok = token();
    let spent = nullifier(3);
    let id = derive_identifier(
        &IdentifierInput {
            caller: &bob,
            token: &tok,
            amount: 500,
            nonce: 0,
            extras: IdentifierExtras::Withdrawal { nullifier: &spent },
        },
        &ctx,
    );

    let existing = WithdrawalRequest {
        withdrawal_id: id,
        recipient: AccountId::from("mallory"),
        token: token(),
        amount: 9,
        nullifier: nullifier(0x3f),
        proof_root: Hash32([0x52; 32]),
        created_at: ctx.timestamp,
        executed: false,
        executed_at: None,
    };
    h.gateway
        .backend_mut()
        .commit(StateChange {
            withdrawals: vec![existing.clone()],
            ..StateChange::default()
        })
        .unwrap();

    let locked = h.locked();
    let stats = h.gateway.stats().unwrap();
    let events = h.gateway.backend().events().len();

    let err = h.request("bob", 500, 3).unwrap_err();
    assert!(matches!(err, GatewayError::IdentifierCollision(c) if c == id));

    assert_eq!(h.locked(), locked);
    assert_eq!(h.wallet("bob"), 0);
    assert_eq!(h.gateway.withdrawal_request(&id).unwrap(), Some(existing));
    assert_eq!(h.gateway.stats().unwrap(), stats);
    assert_eq!(h.gateway.backend().nonce(OperationClass::Withdrawal).unwrap(), 0);
    assert_eq!(h.gateway.backend().events().len(), events);

    // Fresh block entropy yields a new identifier for the same request
    h.gateway.backend_mut().advance_block();
    let retried = h.request("bob", 500, 3).unwrap();
    assert_ne!(retried, id);
    assert_eq!(
        h.gateway.withdrawal_request(&id).unwrap().unwrap().recipient,
        AccountId::from("mallory")
    );
}

#[test]
fn test_underfunded_deposit_succeeds_once_wallet_is_funded() {
    let mut h = Harness::new(SignatureScheme::Ed25519);
    h.fund("alice", 999_999);

    let err = h.deposit("alice", 1_000_000).unwrap_err();
    assert!(matches!(err, GatewayError::TransferFailed(_)));
    assert_eq!(err.kind(), ErrorKind::Operational);
    assert!(err.is_retryable());
    assert_eq!(h.locked(), 0);
    assert_eq!(h.wallet("alice"), 999_999);

    // Same call, host condition cleared
    h.fund("alice", 1);
    h.deposit("alice", 1_000_000).unwrap();
    assert_eq!(h.locked(), 997_000);
    assert_eq!(h.wallet("alice"), 0);
}

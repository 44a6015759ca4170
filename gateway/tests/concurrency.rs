//! Racing relayers through the shared handle

mod common;

use common::*;
use zerobridge_gateway::{GatewayError, SharedGateway, SignatureScheme, WithdrawalStatus};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_executes_succeed_once() {
    let mut h = Harness::new(SignatureScheme::EcdsaSecp256k1);
    h.fund("alice", 5_000_000);
    h.deposit("alice", 5_000_000).unwrap();
    let id = h.request("bob", 1_000_000, 1).unwrap();
    let sig = h.authorize(&id);

    let shared = SharedGateway::new(h.gateway);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let relayer = shared.clone();
        let sig = sig.clone();
        handles.push(tokio::spawn(async move {
            relayer.execute_withdrawal(&id, &sig).await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(err) => assert_eq!(err, GatewayError::AlreadyExecuted(id)),
        }
    }
    assert_eq!(ok, 1);

    shared
        .read(|g| {
            assert_eq!(g.withdrawal_status(&id).unwrap(), WithdrawalStatus::Executed);
            assert_eq!(g.locked_balance(&token()).unwrap(), 4_985_000 - 1_000_000);
            assert_eq!(g.stats().unwrap().executed_count, 1);
        })
        .await;
}

#[tokio::test]
async fn test_concurrent_deposits_all_land() {
    let h = Harness::with_params(SignatureScheme::Ed25519, LOCAL_CHAIN, |p| p.with_fee_bps(0));
    let shared = SharedGateway::new(h.gateway);
    shared
        .with(|g| {
            for i in 0..16 {
                g.backend_mut().mint(
                    &zerobridge_gateway::AccountId::from(format!("user-{}", i).as_str()),
                    &token(),
                    1_000_000,
                );
            }
        })
        .await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let gateway = shared.clone();
        handles.push(tokio::spawn(async move {
            let caller = zerobridge_gateway::AccountId::from(format!("user-{}", i).as_str());
            gateway
                .deposit(
                    &caller,
                    zerobridge_gateway::DepositData {
                        token: token(),
                        amount: 1_000_000,
                        target_chain_id: REMOTE_CHAIN,
                        recipient: zerobridge_gateway::Hash32([1; 32]),
                        privacy_destination: zerobridge_gateway::Hash32([2; 32]),
                    },
                )
                .await
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(ids.len(), 16);
    assert_eq!(shared.read(|g| g.locked_balance(&token())).await.unwrap(), 16_000_000);
}

//! Shared test vectors
//!
//! Fixed inputs run through the canonical message, every scheme's digest and
//! key derivation, and identifier derivation. Independent gateway backends
//! compare their own output against this JSON.

use serde::Serialize;
use zerobridge_gateway::identifier::{derive_identifier, IdentifierExtras, IdentifierInput};
use zerobridge_gateway::signature::SchnorrSigner;
use zerobridge_gateway::{
    AccountId, AuthorityKey, ChainContext, ChainId, Hash32, SignatureError, SignatureScheme,
    TokenId, WithdrawalAuthorization,
};

/// Secret used for every scheme's vector key
pub const VECTOR_SECRET: [u8; 32] = {
    let mut secret = [0u8; 32];
    secret[31] = 1;
    secret
};

/// Auxiliary randomness for the BIP-340 vector signature
pub const VECTOR_SCHNORR_AUX: [u8; 32] = [0u8; 32];

#[derive(Debug, Clone, Serialize)]
pub struct TestVectors {
    pub message: MessageVector,
    pub schemes: Vec<SchemeVector>,
    pub identifiers: Vec<IdentifierVector>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageVector {
    pub input: WithdrawalAuthorization,
    /// Canonical message bytes (hex)
    pub canonical: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemeVector {
    pub scheme: SignatureScheme,
    /// Secret key bytes (hex)
    pub secret: String,
    pub authority_key: AuthorityKey,
    /// Digest of the canonical message this scheme signs (hex)
    pub digest: String,
    /// Signature over `digest` (hex); BIP-340 uses [`VECTOR_SCHNORR_AUX`]
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentifierVector {
    pub class: &'static str,
    pub caller: AccountId,
    pub token: TokenId,
    pub amount: u128,
    pub nonce: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_chain_id: Option<ChainId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Hash32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullifier: Option<Hash32>,
    pub context: ChainContext,
    /// Bytes hashed into the identifier (hex)
    pub preimage: String,
    pub identifier: Hash32,
}

/// Authorization every vector set is built from
pub fn vector_authorization() -> WithdrawalAuthorization {
    WithdrawalAuthorization {
        withdrawal_id: Hash32([0x11; 32]),
        recipient: AccountId::from("osmo1recipient"),
        token: TokenId::from("uosmo"),
        amount: 1_000_000,
        nullifier: Hash32([0x22; 32]),
        chain_id: ChainId(1),
    }
}

fn vector_context() -> ChainContext {
    ChainContext {
        chain_id: ChainId(1),
        block_height: 42,
        timestamp: 1_700_000_000,
        block_hash: Hash32([0x33; 32]),
    }
}

/// Build the vector set
pub fn generate() -> Result<TestVectors, SignatureError> {
    let input = vector_authorization();
    let canonical = input.to_bytes()?;

    let mut schemes = Vec::with_capacity(SignatureScheme::ALL.len());
    for scheme in SignatureScheme::ALL {
        let signer = scheme.signer_from_secret(&VECTOR_SECRET)?;
        let digest = scheme.digest(&canonical);
        let signature = match scheme {
            SignatureScheme::SchnorrBip340 => SchnorrSigner::from_bytes(&VECTOR_SECRET)?
                .sign_digest_with_aux(&digest, &VECTOR_SCHNORR_AUX)?,
            _ => signer.sign_digest(&digest)?,
        };
        schemes.push(SchemeVector {
            scheme,
            secret: hex::encode(VECTOR_SECRET),
            authority_key: signer.authority_key(),
            digest: hex::encode(digest),
            signature: hex::encode(signature),
        });
    }

    let ctx = vector_context();
    let caller = AccountId::from("osmo1sender");
    let token = TokenId::from("uosmo");
    let recipient = Hash32([0x44; 32]);
    let nullifier = input.nullifier;

    let deposit = IdentifierInput {
        caller: &caller,
        token: &token,
        amount: 5_000_000,
        nonce: 0,
        extras: IdentifierExtras::Deposit {
            target_chain_id: ChainId(2),
            recipient: &recipient,
        },
    };
    let withdrawal = IdentifierInput {
        caller: &caller,
        token: &token,
        amount: 1_000_000,
        nonce: 7,
        extras: IdentifierExtras::Withdrawal {
            nullifier: &nullifier,
        },
    };

    let identifiers = vec![
        IdentifierVector {
            class: "deposit",
            caller: caller.clone(),
            token: token.clone(),
            amount: deposit.amount,
            nonce: deposit.nonce,
            target_chain_id: Some(ChainId(2)),
            recipient: Some(recipient),
            nullifier: None,
            context: ctx,
            preimage: hex::encode(deposit.preimage(&ctx)),
            identifier: derive_identifier(&deposit, &ctx),
        },
        IdentifierVector {
            class: "withdrawal",
            caller: caller.clone(),
            token: token.clone(),
            amount: withdrawal.amount,
            nonce: withdrawal.nonce,
            target_chain_id: None,
            recipient: None,
            nullifier: Some(nullifier),
            context: ctx,
            preimage: hex::encode(withdrawal.preimage(&ctx)),
            identifier: derive_identifier(&withdrawal, &ctx),
        },
    ];

    Ok(TestVectors {
        message: MessageVector {
            input,
            canonical: hex::encode(canonical),
        },
        schemes,
        identifiers,
    })
}

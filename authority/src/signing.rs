//! Withdrawal authorization signing
//!
//! The Coordinator signs the same canonical bytes the gateway rebuilds from
//! its stored request, so both sides share one message implementation.

use serde::Serialize;
use thiserror::Error;
use zerobridge_gateway::{
    AccountId, Amount, AuthorityKey, AuthoritySigner, ChainId, Hash32, SignatureError,
    SignatureScheme, SignatureVerifier, TokenId, WithdrawalAuthorization,
};

/// Signing errors
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("invalid hex for {0}: {1}")]
    InvalidHex(&'static str, String),
    #[error("{0} must be 32 bytes")]
    InvalidLength(&'static str),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// A signed authorization, ready to hand to a relayer
#[derive(Debug, Clone, Serialize)]
pub struct SignedAuthorization {
    pub scheme: SignatureScheme,
    pub authority_key: AuthorityKey,
    pub message: WithdrawalAuthorization,
    /// Canonical message (hex)
    pub canonical: String,
    /// Digest that was signed (hex)
    pub digest: String,
    /// Signature (hex)
    pub signature: String,
}

/// Build an authorization from textual fields (CLI and RPC input)
pub fn parse_authorization(
    withdrawal_id: &str,
    recipient: &str,
    token: &str,
    amount: Amount,
    nullifier: &str,
    chain_id: u64,
) -> Result<WithdrawalAuthorization, SigningError> {
    Ok(WithdrawalAuthorization {
        withdrawal_id: parse_hash("withdrawal_id", withdrawal_id)?,
        recipient: AccountId::parse(recipient)
            .map_err(|e| SigningError::InvalidHex("recipient", e.to_string()))?,
        token: TokenId::from(token),
        amount,
        nullifier: parse_hash("nullifier", nullifier)?,
        chain_id: ChainId(chain_id),
    })
}

fn parse_hash(field: &'static str, value: &str) -> Result<Hash32, SigningError> {
    let bytes = hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| SigningError::InvalidHex(field, e.to_string()))?;
    Hash32::from_slice(&bytes).ok_or(SigningError::InvalidLength(field))
}

/// Sign `message` with `signer`
pub fn sign_authorization(
    signer: &dyn AuthoritySigner,
    message: WithdrawalAuthorization,
) -> Result<SignedAuthorization, SigningError> {
    let scheme = signer.scheme();
    let canonical = message.to_bytes()?;
    let digest = scheme.digest(&canonical);
    let signature = signer.sign_digest(&digest)?;

    tracing::info!(
        scheme = %scheme,
        withdrawal_id = %message.withdrawal_id,
        chain_id = message.chain_id.0,
        "Signed withdrawal authorization"
    );

    Ok(SignedAuthorization {
        scheme,
        authority_key: signer.authority_key(),
        message,
        canonical: hex::encode(canonical),
        digest: hex::encode(digest),
        signature: hex::encode(signature),
    })
}

/// Check `signature` the way a gateway configured with `authority` would
pub fn verify_authorization(
    scheme: SignatureScheme,
    authority: &AuthorityKey,
    message: &WithdrawalAuthorization,
    signature: &[u8],
) -> Result<(), SignatureError> {
    scheme.verifier().verify_authorization(authority, message, signature)
}

//! Ed25519 authority signatures
//!
//! The SHA-256 digest of the canonical message is signed as the Ed25519
//! message; verification is strict (no small-order keys, canonical `s`).

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::RngCore;

use super::{AuthoritySigner, SignatureError, SignatureScheme, SignatureVerifier};
use crate::types::AuthorityKey;

pub const SIGNATURE_LEN: usize = 64;
pub const KEY_LEN: usize = 32;

fn parse_key(key: &AuthorityKey) -> Result<VerifyingKey, SignatureError> {
    let bytes: [u8; KEY_LEN] = key.as_bytes().try_into().map_err(|_| {
        SignatureError::MalformedKey(format!("expected {} bytes, got {}", KEY_LEN, key.len()))
    })?;
    let key =
        VerifyingKey::from_bytes(&bytes).map_err(|e| SignatureError::MalformedKey(e.to_string()))?;
    if key.is_weak() {
        return Err(SignatureError::MalformedKey("small-order key".to_string()));
    }
    Ok(key)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn validate_key(&self, key: &AuthorityKey) -> Result<(), SignatureError> {
        parse_key(key).map(|_| ())
    }

    fn verify_digest(
        &self,
        authority: &AuthorityKey,
        digest: &[u8; 32],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        let key = parse_key(authority)?;
        let sig = Signature::from_slice(signature)
            .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;

        key.verify_strict(digest, &sig)
            .map_err(|_| SignatureError::SignerMismatch)
    }
}

/// Single-key Ed25519 authority
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SignatureError::MalformedKey("secret key must be 32 bytes".to_string()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }
}

impl AuthoritySigner for Ed25519Signer {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn authority_key(&self) -> AuthorityKey {
        AuthorityKey::new(self.signing_key.verifying_key().to_bytes().to_vec())
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignatureError> {
        Ok(self.signing_key.sign(digest).to_bytes().to_vec())
    }

    fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

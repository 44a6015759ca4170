//! BIP-340 Schnorr over secp256k1
//!
//! The 32-byte SHA-256 digest of the canonical message is the BIP-340
//! message. Keys are 32-byte x-only, as produced by the FROST signer group.

use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;

use super::{AuthoritySigner, SignatureError, SignatureScheme, SignatureVerifier};
use crate::types::AuthorityKey;

pub const SIGNATURE_LEN: usize = 64;
pub const KEY_LEN: usize = 32;

fn parse_key(key: &AuthorityKey) -> Result<VerifyingKey, SignatureError> {
    if key.len() != KEY_LEN {
        return Err(SignatureError::MalformedKey(format!(
            "expected {} bytes, got {}",
            KEY_LEN,
            key.len()
        )));
    }
    VerifyingKey::from_bytes(key.as_bytes()).map_err(|e| SignatureError::MalformedKey(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchnorrVerifier;

impl SignatureVerifier for SchnorrVerifier {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::SchnorrBip340
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
        if signature.len() != SIGNATURE_LEN {
            return Err(SignatureError::MalformedSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                signature.len()
            )));
        }
        let sig = Signature::try_from(signature)
            .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;

        key.verify_raw(digest, &sig)
            .map_err(|_| SignatureError::SignerMismatch)
    }
}

/// Single-key Schnorr authority
pub struct SchnorrSigner {
    signing_key: SigningKey,
}

impl SchnorrSigner {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let signing_key =
            SigningKey::from_bytes(bytes).map_err(|e| SignatureError::MalformedKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Sign with caller-chosen auxiliary randomness; equal inputs give equal signatures
    pub fn sign_digest_with_aux(
        &self,
        digest: &[u8; 32],
        aux_rand: &[u8; 32],
    ) -> Result<Vec<u8>, SignatureError> {
        let sig = self
            .signing_key
            .sign_raw(digest, aux_rand)
            .map_err(|e| SignatureError::Signing(e.to_string()))?;
        Ok(sig.to_bytes().to_vec())
    }
}

impl AuthoritySigner for SchnorrSigner {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::SchnorrBip340
    }

    fn authority_key(&self) -> AuthorityKey {
        AuthorityKey::new(self.signing_key.verifying_key().to_bytes().to_vec())
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignatureError> {
        let mut aux_rand = [0u8; 32];
        OsRng.fill_bytes(&mut aux_rand);
        self.sign_digest_with_aux(digest, &aux_rand)
    }

    fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

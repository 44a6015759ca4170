//! ECDSA over secp256k1 with public-key recovery
//!
//! Signatures are 65 bytes `r ‖ s ‖ v` with `v` in `{0, 1, 27, 28}`. The
//! signer is recovered from the Keccak-256 digest and compared with the
//! authority, which is either a 20-byte Ethereum-style address or a 33-byte
//! compressed SEC1 key.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};

use super::{AuthoritySigner, SignatureError, SignatureScheme, SignatureVerifier};
use crate::types::AuthorityKey;

pub const SIGNATURE_LEN: usize = 65;
pub const ADDRESS_LEN: usize = 20;
pub const COMPRESSED_KEY_LEN: usize = 33;

/// Ethereum-style address: last 20 bytes of Keccak-256 over the uncompressed point
pub fn address_of(key: &VerifyingKey) -> [u8; ADDRESS_LEN] {
    let point = key.as_affine().to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    let mut out = [0u8; ADDRESS_LEN];
    out.copy_from_slice(&hash[12..]);
    out
}

/// Recover the signing key from a 65-byte recoverable signature
pub fn recover(digest: &[u8; 32], signature: &[u8]) -> Result<VerifyingKey, SignatureError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(SignatureError::MalformedSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LEN,
            signature.len()
        )));
    }

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;

    // High-s signatures are malleable twins of valid ones
    if sig.normalize_s().is_some() {
        return Err(SignatureError::MalformedSignature("high s value".to_string()));
    }

    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => {
            return Err(SignatureError::MalformedSignature(format!(
                "invalid recovery id {}",
                other
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| SignatureError::MalformedSignature("invalid recovery id".to_string()))?;

    VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| SignatureError::Verification(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl SignatureVerifier for EcdsaVerifier {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::EcdsaSecp256k1
    }

    fn validate_key(&self, key: &AuthorityKey) -> Result<(), SignatureError> {
        match key.len() {
            ADDRESS_LEN => {
                if key.as_bytes().iter().all(|b| *b == 0) {
                    return Err(SignatureError::MalformedKey("zero address".to_string()));
                }
                Ok(())
            }
            COMPRESSED_KEY_LEN => VerifyingKey::from_sec1_bytes(key.as_bytes())
                .map(|_| ())
                .map_err(|e| SignatureError::MalformedKey(e.to_string())),
            n => Err(SignatureError::MalformedKey(format!(
                "expected {} or {} bytes, got {}",
                ADDRESS_LEN, COMPRESSED_KEY_LEN, n
            ))),
        }
    }

    fn verify_digest(
        &self,
        authority: &AuthorityKey,
        digest: &[u8; 32],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        self.validate_key(authority)?;
        let recovered = recover(digest, signature)?;

        let matches = match authority.len() {
            ADDRESS_LEN => address_of(&recovered).as_slice() == authority.as_bytes(),
            _ => recovered.to_sec1_bytes().as_ref() == authority.as_bytes(),
        };

        if matches {
            Ok(())
        } else {
            Err(SignatureError::SignerMismatch)
        }
    }
}

/// Single-key ECDSA authority
pub struct EcdsaSigner {
    signing_key: SigningKey,
}

impl EcdsaSigner {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| SignatureError::MalformedKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    pub fn address(&self) -> [u8; ADDRESS_LEN] {
        address_of(self.signing_key.verifying_key())
    }

    /// 33-byte compressed key, accepted as an alternative authority encoding
    pub fn compressed_key(&self) -> AuthorityKey {
        AuthorityKey::new(self.signing_key.verifying_key().to_sec1_bytes().to_vec())
    }
}

impl AuthoritySigner for EcdsaSigner {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::EcdsaSecp256k1
    }

    fn authority_key(&self) -> AuthorityKey {
        AuthorityKey::new(self.address().to_vec())
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignatureError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| SignatureError::Signing(e.to_string()))?;

        let mut out = Vec::with_capacity(SIGNATURE_LEN);
        out.extend_from_slice(&sig.to_bytes());
        out.push(recovery_id.to_byte() + 27);
        Ok(out)
    }

    fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

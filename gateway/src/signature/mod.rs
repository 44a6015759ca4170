//! Authority signatures over withdrawal authorizations
//!
//! The gateway is scheme-agnostic: it holds one [`SignatureVerifier`] and the
//! configured [`AuthorityKey`]. Each scheme picks its own digest of the
//! canonical message ([`WithdrawalAuthorization::to_bytes`]).
//!
//! | Scheme | Digest | Signature | Authority key |
//! |---|---|---|---|
//! | `ecdsa-secp256k1` | Keccak-256 | 65 bytes `r‖s‖v` | 20-byte address or 33-byte SEC1 |
//! | `schnorr-bip340` | SHA-256 | 64 bytes | 32-byte x-only |
//! | `ed25519` | SHA-256 | 64 bytes | 32 bytes |

pub mod ecdsa;
pub mod ed25519;
pub mod message;
pub mod schnorr;

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::AuthorityKey;

pub use ecdsa::{EcdsaSigner, EcdsaVerifier};
pub use ed25519::{Ed25519Signer, Ed25519Verifier};
pub use message::WithdrawalAuthorization;
pub use schnorr::{SchnorrSigner, SchnorrVerifier};

/// Signature errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("signer does not match authority key")]
    SignerMismatch,

    #[error("signature check failed: {0}")]
    Verification(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("message field {0} too long")]
    FieldTooLong(&'static str),

    #[error("unknown signature scheme: {0}")]
    UnknownScheme(String),
}

/// Supported authority signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureScheme {
    /// EVM / Solana `secp256k1_recover` family
    EcdsaSecp256k1,
    /// FROST / Taproot family
    SchnorrBip340,
    /// NEAR / Cosmos family
    Ed25519,
}

impl SignatureScheme {
    pub const ALL: [SignatureScheme; 3] = [
        SignatureScheme::EcdsaSecp256k1,
        SignatureScheme::SchnorrBip340,
        SignatureScheme::Ed25519,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::EcdsaSecp256k1 => "ecdsa-secp256k1",
            SignatureScheme::SchnorrBip340 => "schnorr-bip340",
            SignatureScheme::Ed25519 => "ed25519",
        }
    }

    /// Digest of the canonical message that this scheme signs
    pub fn digest(&self, message: &[u8]) -> [u8; 32] {
        match self {
            SignatureScheme::EcdsaSecp256k1 => Keccak256::digest(message).into(),
            SignatureScheme::SchnorrBip340 | SignatureScheme::Ed25519 => {
                Sha256::digest(message).into()
            }
        }
    }

    pub fn verifier(&self) -> Box<dyn SignatureVerifier> {
        match self {
            SignatureScheme::EcdsaSecp256k1 => Box::new(EcdsaVerifier),
            SignatureScheme::SchnorrBip340 => Box::new(SchnorrVerifier),
            SignatureScheme::Ed25519 => Box::new(Ed25519Verifier),
        }
    }

    /// Fresh random signing key for this scheme
    pub fn generate_signer(&self) -> Box<dyn AuthoritySigner> {
        match self {
            SignatureScheme::EcdsaSecp256k1 => Box::new(EcdsaSigner::generate()),
            SignatureScheme::SchnorrBip340 => Box::new(SchnorrSigner::generate()),
            SignatureScheme::Ed25519 => Box::new(Ed25519Signer::generate()),
        }
    }

    /// Signing key from 32 secret bytes
    pub fn signer_from_secret(&self, secret: &[u8]) -> Result<Box<dyn AuthoritySigner>, SignatureError> {
        Ok(match self {
            SignatureScheme::EcdsaSecp256k1 => Box::new(EcdsaSigner::from_bytes(secret)?),
            SignatureScheme::SchnorrBip340 => Box::new(SchnorrSigner::from_bytes(secret)?),
            SignatureScheme::Ed25519 => Box::new(Ed25519Signer::from_bytes(secret)?),
        })
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureScheme {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecdsa-secp256k1" | "ecdsa" | "secp256k1" => Ok(SignatureScheme::EcdsaSecp256k1),
            "schnorr-bip340" | "schnorr" | "bip340" => Ok(SignatureScheme::SchnorrBip340),
            "ed25519" => Ok(SignatureScheme::Ed25519),
            _ => Err(SignatureError::UnknownScheme(s.to_string())),
        }
    }
}

/// Checks authority signatures for one scheme
#[cfg_attr(test, mockall::automock)]
pub trait SignatureVerifier: Send + Sync {
    fn scheme(&self) -> SignatureScheme;

    /// Reject keys this scheme cannot verify against
    fn validate_key(&self, key: &AuthorityKey) -> Result<(), SignatureError>;

    /// Verify `signature` over a 32-byte digest
    fn verify_digest(
        &self,
        authority: &AuthorityKey,
        digest: &[u8; 32],
        signature: &[u8],
    ) -> Result<(), SignatureError>;

    /// Verify `signature` over the canonical bytes of `message`
    fn verify_authorization(
        &self,
        authority: &AuthorityKey,
        message: &WithdrawalAuthorization,
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        let digest = self.scheme().digest(&message.to_bytes()?);
        self.verify_digest(authority, &digest, signature)
    }
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for Box<V> {
    fn scheme(&self) -> SignatureScheme {
        (**self).scheme()
    }

    fn validate_key(&self, key: &AuthorityKey) -> Result<(), SignatureError> {
        (**self).validate_key(key)
    }

    fn verify_digest(
        &self,
        authority: &AuthorityKey,
        digest: &[u8; 32],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        (**self).verify_digest(authority, digest, signature)
    }

    fn verify_authorization(
        &self,
        authority: &AuthorityKey,
        message: &WithdrawalAuthorization,
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        (**self).verify_authorization(authority, message, signature)
    }
}

/// Produces authority signatures (Coordinator side)
pub trait AuthoritySigner: Send + Sync {
    fn scheme(&self) -> SignatureScheme;

    /// Key to configure on the gateway
    fn authority_key(&self) -> AuthorityKey;

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignatureError>;

    /// Secret key bytes (for backup)
    fn secret_bytes(&self) -> [u8; 32];

    fn sign_authorization(&self, message: &WithdrawalAuthorization) -> Result<Vec<u8>, SignatureError> {
        let digest = self.scheme().digest(&message.to_bytes()?);
        self.sign_digest(&digest)
    }
}

//! Encrypted authority key storage
//!
//! Authority secrets are encrypted at rest using AES-256-GCM with a
//! password-derived key. The scheme and public authority key stay in clear so
//! operators can read them without the password.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zerobridge_gateway::{AuthorityKey, AuthoritySigner, SignatureError, SignatureScheme};

const KEYSTORE_VERSION: u8 = 1;
const KDF_TAG: &[u8] = b"zerobridge-authority-keystore-v1";

/// Key store errors
#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("encryption error: {0}")]
    Encryption(String),
    #[error("decryption error: {0}")]
    Decryption(String),
    #[error("signature scheme error: {0}")]
    Scheme(#[from] SignatureError),
    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u8),
    #[error("key file already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("key not found")]
    KeyNotFound,
    #[error("invalid password")]
    InvalidPassword,
}

/// Encrypted key file format
#[derive(Debug, Serialize, Deserialize)]
struct EncryptedKeyFile {
    version: u8,
    scheme: SignatureScheme,
    /// Salt for key derivation (hex-encoded)
    salt: String,
    /// Nonce for AES-GCM (hex-encoded)
    nonce: String,
    /// Encrypted secret (hex-encoded)
    ciphertext: String,
    /// Authority key to configure on gateways (hex-encoded)
    authority_key: String,
}

/// Public half of a key file, readable without the password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    pub scheme: SignatureScheme,
    pub authority_key: AuthorityKey,
}

/// Encrypted keystore manager
pub struct Keystore {
    key_path: PathBuf,
}

impl Keystore {
    pub fn new(key_path: impl AsRef<Path>) -> Self {
        Self {
            key_path: key_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.key_path
    }

    pub fn exists(&self) -> bool {
        self.key_path.exists()
    }

    /// Derive encryption key from password using SHA-256
    fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(salt);
        hasher.update(KDF_TAG);
        hasher.finalize().into()
    }

    /// Encrypt `signer`'s secret under `password`. Refuses to overwrite.
    pub fn save(&self, signer: &dyn AuthoritySigner, password: &str) -> Result<(), KeystoreError> {
        if self.exists() {
            return Err(KeystoreError::AlreadyExists(self.key_path.clone()));
        }

        let plaintext = signer.secret_bytes();

        let mut salt = [0u8; 16];
        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut salt);
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let key = Self::derive_key(password, &salt);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| KeystoreError::Encryption(e.to_string()))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|e| KeystoreError::Encryption(e.to_string()))?;

        let encrypted = EncryptedKeyFile {
            version: KEYSTORE_VERSION,
            scheme: signer.scheme(),
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
            authority_key: signer.authority_key().to_hex(),
        };

        let json = serde_json::to_string_pretty(&encrypted)?;

        if let Some(parent) = self.key_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.key_path, json)?;

        tracing::info!(
            scheme = %signer.scheme(),
            authority_key = %signer.authority_key(),
            path = %self.key_path.display(),
            "Saved encrypted authority key"
        );

        Ok(())
    }

    /// Decrypt the authority signer
    pub fn load(&self, password: &str) -> Result<Box<dyn AuthoritySigner>, KeystoreError> {
        let encrypted = self.read_file()?;

        let salt = decode_field(&encrypted.salt)?;
        let nonce_bytes = decode_field(&encrypted.nonce)?;
        let ciphertext = decode_field(&encrypted.ciphertext)?;
        if nonce_bytes.len() != 12 {
            return Err(KeystoreError::Decryption(format!(
                "nonce must be 12 bytes, got {}",
                nonce_bytes.len()
            )));
        }

        let key = Self::derive_key(password, &salt);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| KeystoreError::Decryption(e.to_string()))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| KeystoreError::InvalidPassword)?;

        let signer = encrypted.scheme.signer_from_secret(&plaintext)?;
        if signer.authority_key().to_hex() != encrypted.authority_key {
            return Err(KeystoreError::Decryption(
                "decrypted key does not match recorded authority key".to_string(),
            ));
        }

        tracing::info!(
            scheme = %encrypted.scheme,
            path = %self.key_path.display(),
            "Loaded authority key"
        );

        Ok(signer)
    }

    /// Scheme and authority key without decryption
    pub fn info(&self) -> Result<KeyInfo, KeystoreError> {
        let encrypted = self.read_file()?;
        Ok(KeyInfo {
            scheme: encrypted.scheme,
            authority_key: AuthorityKey::new(decode_field(&encrypted.authority_key)?),
        })
    }

    fn read_file(&self) -> Result<EncryptedKeyFile, KeystoreError> {
        if !self.exists() {
            return Err(KeystoreError::KeyNotFound);
        }

        let json = std::fs::read_to_string(&self.key_path)?;
        let encrypted: EncryptedKeyFile = serde_json::from_str(&json)?;
        if encrypted.version != KEYSTORE_VERSION {
            return Err(KeystoreError::UnsupportedVersion(encrypted.version));
        }
        Ok(encrypted)
    }
}

fn decode_field(value: &str) -> Result<Vec<u8>, KeystoreError> {
    hex::decode(value).map_err(|e| KeystoreError::Decryption(e.to_string()))
}

//! Authority tooling for ZeroBridge gateways
//!
//! The Coordinator-side counterpart of the gateway ledger: generates and
//! stores authority keys, signs withdrawal authorizations over the canonical
//! message, and emits shared test vectors. Nothing here touches ledger state.
//!
//! # Usage
//!
//! ```bash
//! gateway-authority keygen --scheme ed25519 --key-file config/authority.key.json
//! gateway-authority sign-withdrawal --key-file config/authority.key.json \
//!     --withdrawal-id 0x.. --recipient osmo1.. --token uosmo --amount 1000 \
//!     --nullifier 0x.. --chain-id 1
//! gateway-authority vectors > vectors.json
//! ```

pub mod keystore;
pub mod signing;
pub mod vectors;

pub use keystore::{KeyInfo, Keystore, KeystoreError};
pub use signing::{parse_authorization, sign_authorization, verify_authorization, SignedAuthorization, SigningError};
pub use vectors::TestVectors;

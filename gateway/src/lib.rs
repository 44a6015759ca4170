//! ZeroBridge Gateway Ledger
//!
//! The asset-custody state machine replicated on every chain ZeroBridge
//! connects. A gateway locks deposited value, derives identifiers for deposits
//! and withdrawals, gates every release behind a two-phase withdrawal flow
//! authorised by the Coordinator's signature, and refuses to release funds
//! twice for the same nullifier.
//!
//! # Layout
//!
//! - [`identifier`] - collision-resistant deposit/withdrawal identifiers
//! - [`signature`] - canonical withdrawal message and authority schemes
//! - [`nullifier`] - at-most-once nullifier consumption
//! - [`balance`] - locked balances and free liquidity
//! - [`gateway`] / [`instructions`] - the state machine itself
//! - [`storage`] - the host backend abstraction and an in-memory backend
//! - [`shared`] - async handle serialising concurrent submitters
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MemoryBackend::new(ChainId(1));
//! let signer = SignatureScheme::EcdsaSecp256k1.generate_signer();
//! let params = InitParams::new(AccountId::from("owner"), signer.authority_key());
//! let mut gateway = Gateway::initialize(backend, EcdsaVerifier, params)?;
//! ```

pub mod access;
pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod gateway;
pub mod identifier;
pub mod instructions;
pub mod logging;
pub mod nullifier;
pub mod shared;
pub mod signature;
pub mod storage;
pub mod types;

pub use access::{Operation, Permission};
pub use config::{ConfigError, GatewaySettings, Network};
pub use error::{AmountIssue, ErrorKind, GatewayError, Result};
pub use events::GatewayEvent;
pub use gateway::{Gateway, InitParams};
pub use instructions::{DepositData, RequestWithdrawalData};
pub use logging::{init_logging, LogLevel, LoggingError};
pub use shared::SharedGateway;
pub use signature::{
    AuthoritySigner, EcdsaVerifier, Ed25519Verifier, SchnorrVerifier, SignatureError,
    SignatureScheme, SignatureVerifier, WithdrawalAuthorization,
};
pub use storage::{LedgerBackend, MemoryBackend, StateChange, StorageError};
pub use types::*;

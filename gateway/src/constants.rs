//! Protocol constants for the gateway ledger
//!
//! Defaults match the values the deployed gateways were initialised with.

// =============================================================================
// Deposit Limits
// =============================================================================

/// Default minimum deposit, in the token's smallest unit
pub const DEFAULT_MIN_DEPOSIT: u128 = 1_000_000;

/// Default maximum deposit, in the token's smallest unit
pub const DEFAULT_MAX_DEPOSIT: u128 = 1_000_000_000_000;

// =============================================================================
// Fees
// =============================================================================

/// Default bridge fee (0.3%)
pub const DEFAULT_BRIDGE_FEE_BPS: u16 = 30;

/// Fee ceiling (1%)
pub const MAX_BRIDGE_FEE_BPS: u16 = 100;

/// Basis-point denominator
pub const BPS_DENOMINATOR: u128 = 10_000;

// =============================================================================
// Field Bounds
// =============================================================================

/// Longest caller/recipient identity accepted, in bytes.
/// Keeps the canonical message's u16 length prefixes well in range.
pub const MAX_ACCOUNT_ID_LEN: usize = 256;

/// Longest token identity accepted, in bytes
pub const MAX_TOKEN_ID_LEN: usize = 128;

// =============================================================================
// Identifier Domain Tags
// =============================================================================

pub const DEPOSIT_ID_TAG: &[u8] = b"zerobridge:deposit:v1";

pub const WITHDRAWAL_ID_TAG: &[u8] = b"zerobridge:withdrawal:v1";

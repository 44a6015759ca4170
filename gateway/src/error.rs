//! Gateway Error Types
//!
//! Every failure of a gateway operation is total: no record, balance, nullifier
//! or transfer is applied when one of these is returned.

use thiserror::Error;

use crate::access::Operation;
use crate::storage::StorageError;
use crate::types::{Amount, ChainId, Hash32, Nullifier, TokenId, WithdrawalId};

/// Coarse error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any state is read
    Validation,
    /// Signature, nullifier or role check failed
    Authorization,
    /// The request conflicts with current ledger state
    StateConflict,
    /// The gateway or its host refused the operation
    Operational,
}

/// Why an amount was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountIssue {
    #[error("amount must be greater than zero")]
    Zero,

    #[error("amount below minimum of {min}")]
    TooSmall { min: Amount },

    #[error("amount above maximum of {max}")]
    TooLarge { max: Amount },
}

/// Root error type for gateway operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    // Validation
    #[error("invalid amount: {0}")]
    InvalidAmount(AmountIssue),

    #[error("invalid token identity")]
    InvalidToken,

    #[error("invalid recipient")]
    InvalidRecipient,

    #[error("invalid privacy destination")]
    InvalidPrivacyDestination,

    #[error("nullifier must be non-zero")]
    InvalidNullifier,

    #[error("proof root must be non-zero")]
    InvalidProofRoot,

    #[error("target chain {0} is the local chain")]
    SameChainTarget(ChainId),

    #[error("bridge fee {bps} bps exceeds maximum of {max} bps")]
    FeeTooHigh { bps: u16, max: u16 },

    #[error("invalid deposit limits: min {min}, max {max}")]
    InvalidDepositLimits { min: Amount, max: Amount },

    #[error("invalid authority key: {0}")]
    InvalidAuthorityKey(String),

    // Authorization
    #[error("authority signature does not verify")]
    InvalidAuthoritySignature,

    #[error("nullifier {0} already used (double-spend attempt)")]
    NullifierReused(Nullifier),

    #[error("caller not authorized for {0}")]
    Unauthorized(Operation),

    // State conflicts
    #[error("withdrawal request {0} not found")]
    WithdrawalNotFound(WithdrawalId),

    #[error("withdrawal request {0} already executed")]
    AlreadyExecuted(WithdrawalId),

    #[error("insufficient locked balance for {token}: locked {locked}, requested {requested}")]
    InsufficientLockedBalance {
        token: TokenId,
        locked: Amount,
        requested: Amount,
    },

    #[error("insufficient liquidity for {token}: available {available}, requested {requested}")]
    InsufficientLiquidity {
        token: TokenId,
        available: Amount,
        requested: Amount,
    },

    #[error("identifier {0} already exists")]
    IdentifierCollision(Hash32),

    #[error("operation requires the bridge to be paused")]
    MustBePaused,

    #[error("gateway already initialized")]
    AlreadyInitialized,

    #[error("gateway not initialized")]
    NotInitialized,

    #[error("arithmetic overflow")]
    Overflow,

    // Operational
    #[error("bridge is paused")]
    BridgePaused,

    #[error("custody transfer failed: {0}")]
    TransferFailed(String),

    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Transfer(msg) => GatewayError::TransferFailed(msg),
            other => GatewayError::Storage(other),
        }
    }
}

impl GatewayError {
    /// Error class
    pub fn kind(&self) -> ErrorKind {
        use GatewayError::*;
        match self {
            InvalidAmount(_)
            | InvalidToken
            | InvalidRecipient
            | InvalidPrivacyDestination
            | InvalidNullifier
            | InvalidProofRoot
            | SameChainTarget(_)
            | FeeTooHigh { .. }
            | InvalidDepositLimits { .. }
            | InvalidAuthorityKey(_) => ErrorKind::Validation,

            InvalidAuthoritySignature | NullifierReused(_) | Unauthorized(_) => {
                ErrorKind::Authorization
            }

            WithdrawalNotFound(_)
            | AlreadyExecuted(_)
            | InsufficientLockedBalance { .. }
            | InsufficientLiquidity { .. }
            | IdentifierCollision(_)
            | MustBePaused
            | AlreadyInitialized
            | NotInitialized
            | Overflow => ErrorKind::StateConflict,

            BridgePaused | TransferFailed(_) | Storage(_) => ErrorKind::Operational,
        }
    }

    /// Check if the host, not the request, caused the failure
    ///
    /// Resubmitting the identical call can succeed once the host-side
    /// condition clears: a storage outage ends, or the wallet or custody
    /// account a transfer draws on is funded. Nothing is retried here.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Storage(_) | GatewayError::TransferFailed(_))
    }

    /// Stable error code for hosts and relayers
    pub fn error_code(&self) -> &'static str {
        use GatewayError::*;
        match self {
            InvalidAmount(AmountIssue::Zero) => "ZERO_AMOUNT",
            InvalidAmount(AmountIssue::TooSmall { .. }) => "AMOUNT_TOO_SMALL",
            InvalidAmount(AmountIssue::TooLarge { .. }) => "AMOUNT_TOO_LARGE",
            InvalidToken => "INVALID_TOKEN",
            InvalidRecipient => "INVALID_RECIPIENT",
            InvalidPrivacyDestination => "INVALID_PRIVACY_DESTINATION",
            InvalidNullifier => "INVALID_NULLIFIER",
            InvalidProofRoot => "INVALID_PROOF_ROOT",
            SameChainTarget(_) => "SAME_CHAIN_TARGET",
            FeeTooHigh { .. } => "FEE_TOO_HIGH",
            InvalidDepositLimits { .. } => "INVALID_DEPOSIT_LIMITS",
            InvalidAuthorityKey(_) => "INVALID_AUTHORITY_KEY",
            InvalidAuthoritySignature => "INVALID_AUTHORITY_SIGNATURE",
            NullifierReused(_) => "NULLIFIER_REUSED",
            Unauthorized(_) => "UNAUTHORIZED",
            WithdrawalNotFound(_) => "WITHDRAWAL_NOT_FOUND",
            AlreadyExecuted(_) => "ALREADY_EXECUTED",
            InsufficientLockedBalance { .. } => "INSUFFICIENT_LOCKED_BALANCE",
            InsufficientLiquidity { .. } => "INSUFFICIENT_LIQUIDITY",
            IdentifierCollision(_) => "IDENTIFIER_COLLISION",
            MustBePaused => "MUST_BE_PAUSED",
            AlreadyInitialized => "ALREADY_INITIALIZED",
            NotInitialized => "NOT_INITIALIZED",
            Overflow => "OVERFLOW",
            BridgePaused => "BRIDGE_PAUSED",
            TransferFailed(_) => "TRANSFER_FAILED",
            Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GatewayError::InvalidAmount(AmountIssue::Zero).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GatewayError::NullifierReused(Hash32::ZERO).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(GatewayError::MustBePaused.kind(), ErrorKind::StateConflict);
        assert_eq!(GatewayError::BridgePaused.kind(), ErrorKind::Operational);
    }

    #[test]
    fn test_transfer_storage_error_maps_to_transfer_failed() {
        let err: GatewayError = StorageError::Transfer("insufficient funds".into()).into();
        assert_eq!(err.error_code(), "TRANSFER_FAILED");
        assert!(err.is_retryable());

        let err: GatewayError = StorageError::Backend("disk full".into()).into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(!GatewayError::InvalidAuthoritySignature.is_retryable());
        assert!(!GatewayError::AlreadyExecuted(Hash32::ZERO).is_retryable());
        assert!(GatewayError::TransferFailed("timeout".into()).is_retryable());
        assert!(!GatewayError::InsufficientLockedBalance {
            token: TokenId::from("uosmo"),
            locked: 1,
            requested: 2,
        }
        .is_retryable());
    }

    #[test]
    fn test_amount_detail_in_message() {
        let err = GatewayError::InvalidAmount(AmountIssue::TooSmall { min: 1_000_000 });
        assert!(err.to_string().contains("1000000"));
        assert_eq!(err.error_code(), "AMOUNT_TOO_SMALL");
    }
}

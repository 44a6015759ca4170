//! Gateway instructions
//!
//! Each instruction follows the same shape: guard (role + pause), validate
//! input, read state, stage every write into one `StateChange`, commit.

pub mod admin;
pub mod deposit;
pub mod execute_withdrawal;
pub mod liquidity;
pub mod request_withdrawal;

pub use deposit::DepositData;
pub use request_withdrawal::RequestWithdrawalData;

use crate::constants::{MAX_ACCOUNT_ID_LEN, MAX_TOKEN_ID_LEN};
use crate::error::{AmountIssue, GatewayError, Result};
use crate::types::{AccountId, Amount, TokenId};

pub(crate) fn validate_token(token: &TokenId) -> Result<()> {
    if token.is_empty() || token.as_str().len() > MAX_TOKEN_ID_LEN {
        return Err(GatewayError::InvalidToken);
    }
    Ok(())
}

pub(crate) fn validate_account(account: &AccountId) -> Result<()> {
    if account.is_empty() || account.len() > MAX_ACCOUNT_ID_LEN {
        return Err(GatewayError::InvalidRecipient);
    }
    Ok(())
}

pub(crate) fn validate_nonzero(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(GatewayError::InvalidAmount(AmountIssue::Zero));
    }
    Ok(())
}

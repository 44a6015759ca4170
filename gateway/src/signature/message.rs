//! Canonical withdrawal authorization message
//!
//! ```text
//! withdrawal_id   32 bytes
//! recipient       u16 BE length + bytes
//! token           u16 BE length + UTF-8 bytes
//! amount          u128 BE
//! nullifier       32 bytes
//! chain_id        u64 BE (the executing chain)
//! ```
//!
//! Every scheme hashes exactly these bytes, so a Coordinator signs once per
//! request and the signature is bound to one chain.

use serde::{Deserialize, Serialize};

use super::SignatureError;
use crate::types::{AccountId, Amount, ChainId, Nullifier, TokenId, WithdrawalId, WithdrawalRequest};

/// The fields an authority signature commits to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalAuthorization {
    pub withdrawal_id: WithdrawalId,
    pub recipient: AccountId,
    pub token: TokenId,
    pub amount: Amount,
    pub nullifier: Nullifier,
    pub chain_id: ChainId,
}

impl WithdrawalAuthorization {
    /// Authorization for executing `request` on `chain_id`
    pub fn from_request(request: &WithdrawalRequest, chain_id: ChainId) -> Self {
        Self {
            withdrawal_id: request.withdrawal_id,
            recipient: request.recipient.clone(),
            token: request.token.clone(),
            amount: request.amount,
            nullifier: request.nullifier,
            chain_id,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SignatureError> {
        let recipient = self.recipient.as_bytes();
        let token = self.token.as_str().as_bytes();

        let mut buf = Vec::with_capacity(32 + 2 + recipient.len() + 2 + token.len() + 16 + 32 + 8);
        buf.extend_from_slice(self.withdrawal_id.as_bytes());
        put_var(&mut buf, "recipient", recipient)?;
        put_var(&mut buf, "token", token)?;
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(self.nullifier.as_bytes());
        buf.extend_from_slice(&self.chain_id.0.to_be_bytes());
        Ok(buf)
    }
}

fn put_var(buf: &mut Vec<u8>, field: &'static str, bytes: &[u8]) -> Result<(), SignatureError> {
    let len = u16::try_from(bytes.len()).map_err(|_| SignatureError::FieldTooLong(field))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

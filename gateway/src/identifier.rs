//! Deposit and withdrawal identifier derivation
//!
//! An identifier is Keccak-256 over:
//!
//! ```text
//! domain tag
//! caller      (u32 LE length + bytes)
//! token       (u32 LE length + UTF-8 bytes)
//! amount      (u128 LE)
//! class nonce (u64 LE)
//! extras      deposit: target chain id (u64 LE) + recipient (32)
//!             withdrawal: nullifier (32)
//! entropy     block height (u64 LE) + timestamp (i64 LE) + block hash (32)
//! ```
//!
//! Identifiers are unique, not secret, and not required to be reproducible
//! by callers. Collisions with stored records are rejected by the caller of
//! [`derive_identifier`], never overwritten.

use sha3::{Digest, Keccak256};

use crate::types::{AccountId, Amount, ChainContext, ChainId, Hash32, Nullifier, OperationClass, TokenId};

/// Class-specific fields mixed into the identifier
#[derive(Debug, Clone, Copy)]
pub enum IdentifierExtras<'a> {
    Deposit {
        target_chain_id: ChainId,
        recipient: &'a Hash32,
    },
    Withdrawal {
        nullifier: &'a Nullifier,
    },
}

impl IdentifierExtras<'_> {
    pub fn class(&self) -> OperationClass {
        match self {
            IdentifierExtras::Deposit { .. } => OperationClass::Deposit,
            IdentifierExtras::Withdrawal { .. } => OperationClass::Withdrawal,
        }
    }
}

/// Caller-supplied identifier inputs
#[derive(Debug, Clone, Copy)]
pub struct IdentifierInput<'a> {
    pub caller: &'a AccountId,
    pub token: &'a TokenId,
    pub amount: Amount,
    pub nonce: u64,
    pub extras: IdentifierExtras<'a>,
}

impl IdentifierInput<'_> {
    /// Bytes hashed into the identifier
    pub fn preimage(&self, ctx: &ChainContext) -> Vec<u8> {
        let mut buf = Vec::with_capacity(192 + self.caller.len() + self.token.as_str().len());

        buf.extend_from_slice(self.extras.class().domain_tag());
        put_var(&mut buf, self.caller.as_bytes());
        put_var(&mut buf, self.token.as_str().as_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());

        match self.extras {
            IdentifierExtras::Deposit {
                target_chain_id,
                recipient,
            } => {
                buf.extend_from_slice(&target_chain_id.0.to_le_bytes());
                buf.extend_from_slice(recipient.as_bytes());
            }
            IdentifierExtras::Withdrawal { nullifier } => {
                buf.extend_from_slice(nullifier.as_bytes());
            }
        }

        buf.extend_from_slice(&ctx.block_height.to_le_bytes());
        buf.extend_from_slice(&ctx.timestamp.to_le_bytes());
        buf.extend_from_slice(ctx.block_hash.as_bytes());
        buf
    }
}

/// Derive an identifier for the given inputs under the current host context
pub fn derive_identifier(input: &IdentifierInput<'_>, ctx: &ChainContext) -> Hash32 {
    Hash32(Keccak256::digest(input.preimage(ctx)).into())
}

fn put_var(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ChainContext {
        ChainContext {
            chain_id: ChainId(1),
            block_height: 100,
            timestamp: 1_700_000_000,
            block_hash: Hash32([7u8; 32]),
        }
    }

    #[test]
    fn test_nonce_changes_identifier() {
        let caller = AccountId::from("alice");
        let token = TokenId::from("uosmo");
        let recipient = Hash32([1u8; 32]);
        let extras = IdentifierExtras::Deposit {
            target_chain_id: ChainId(2),
            recipient: &recipient,
        };

        let a = IdentifierInput { caller: &caller, token: &token, amount: 1_000, nonce: 0, extras };
        let b = IdentifierInput { nonce: 1, ..a };

        assert_ne!(derive_identifier(&a, &ctx()), derive_identifier(&b, &ctx()));
        assert_eq!(derive_identifier(&a, &ctx()), derive_identifier(&a, &ctx()));
    }

    #[test]
    fn test_classes_are_domain_separated() {
        let caller = AccountId::from("alice");
        let token = TokenId::from("uosmo");
        let value = Hash32([9u8; 32]);

        let deposit = IdentifierInput {
            caller: &caller,
            token: &token,
            amount: 5,
            nonce: 0,
            extras: IdentifierExtras::Deposit { target_chain_id: ChainId(0), recipient: &value },
        };
        let withdrawal = IdentifierInput {
            extras: IdentifierExtras::Withdrawal { nullifier: &value },
            ..deposit
        };

        assert_ne!(
            derive_identifier(&deposit, &ctx()),
            derive_identifier(&withdrawal, &ctx())
        );
    }

    #[test]
    fn test_length_prefix_prevents_field_shifting() {
        let token = TokenId::from("x");
        let nullifier = Hash32([3u8; 32]);
        let extras = IdentifierExtras::Withdrawal { nullifier: &nullifier };

        let ab = AccountId::from("ab");
        let a = AccountId::from("a");
        let bx = TokenId::from("bx");

        let first = IdentifierInput { caller: &ab, token: &token, amount: 1, nonce: 0, extras };
        let second = IdentifierInput { caller: &a, token: &bx, amount: 1, nonce: 0, extras };

        assert_ne!(first.preimage(&ctx()), second.preimage(&ctx()));
    }

    #[test]
    fn test_withdrawal_identifier_known_answer() {
        let caller = AccountId::from("osmo1sender");
        let token = TokenId::from("uosmo");
        let nullifier = Hash32([0x22u8; 32]);
        let input = IdentifierInput {
            caller: &caller,
            token: &token,
            amount: 1_000_000,
            nonce: 7,
            extras: IdentifierExtras::Withdrawal { nullifier: &nullifier },
        };
        let ctx = ChainContext {
            chain_id: ChainId(1),
            block_height: 42,
            timestamp: 1_700_000_000,
            block_hash: Hash32([0x33u8; 32]),
        };

        let preimage = input.preimage(&ctx);
        assert_eq!(&preimage[24..28], &11u32.to_le_bytes());
        assert_eq!(&preimage[64..72], &7u64.to_le_bytes());
        assert_eq!(
            derive_identifier(&input, &ctx).to_hex(),
            "876315b81af4c2e0e4e28f26b5a507cf86fb5d11b2edca6c76ced34eaa58e530"
        );
    }

    #[test]
    fn test_entropy_changes_identifier() {
        let caller = AccountId::from("bob");
        let token = TokenId::from("usdc");
        let nullifier = Hash32([4u8; 32]);
        let input = IdentifierInput {
            caller: &caller,
            token: &token,
            amount: 42,
            nonce: 3,
            extras: IdentifierExtras::Withdrawal { nullifier: &nullifier },
        };

        let mut later = ctx();
        later.block_height += 1;

        assert_ne!(derive_identifier(&input, &ctx()), derive_identifier(&input, &later));
    }
}

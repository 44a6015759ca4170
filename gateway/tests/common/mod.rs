//! Shared fixtures for gateway integration tests

#![allow(dead_code)]

use zerobridge_gateway::{
    AccountId, Amount, AuthoritySigner, ChainId, DepositData, DepositId, Gateway, Hash32,
    InitParams, MemoryBackend, RequestWithdrawalData, Result, SignatureScheme, SignatureVerifier,
    TokenId, WithdrawalAuthorization, WithdrawalId,
};

pub const LOCAL_CHAIN: ChainId = ChainId(1);
pub const REMOTE_CHAIN: ChainId = ChainId(2);

pub type TestGateway = Gateway<MemoryBackend, Box<dyn SignatureVerifier>>;

pub fn owner() -> AccountId {
    AccountId::from("owner")
}

pub fn token() -> TokenId {
    TokenId::from("uosmo")
}

pub fn nullifier(tag: u8) -> Hash32 {
    Hash32([tag; 32])
}

/// A gateway on `chain` with a live authority signer
pub struct Harness {
    pub gateway: TestGateway,
    pub signer: Box<dyn AuthoritySigner>,
}

impl Harness {
    pub fn new(scheme: SignatureScheme) -> Self {
        Self::with_params(scheme, LOCAL_CHAIN, |p| p)
    }

    pub fn with_params(
        scheme: SignatureScheme,
        chain: ChainId,
        configure: impl FnOnce(InitParams) -> InitParams,
    ) -> Self {
        let signer = scheme.generate_signer();
        let params = configure(InitParams::new(owner(), signer.authority_key()));
        let gateway = Gateway::initialize(MemoryBackend::new(chain), scheme.verifier(), params)
            .expect("initialize");
        Self { gateway, signer }
    }

    pub fn fund(&mut self, who: &str, amount: Amount) {
        self.gateway
            .backend_mut()
            .mint(&AccountId::from(who), &token(), amount);
    }

    pub fn deposit(&mut self, who: &str, amount: Amount) -> Result<DepositId> {
        self.gateway.deposit(
            &AccountId::from(who),
            DepositData {
                token: token(),
                amount,
                target_chain_id: REMOTE_CHAIN,
                recipient: Hash32([0xaa; 32]),
                privacy_destination: Hash32([0xbb; 32]),
            },
        )
    }

    pub fn request(&mut self, who: &str, amount: Amount, tag: u8) -> Result<WithdrawalId> {
        self.gateway.request_withdrawal(
            &AccountId::from(who),
            RequestWithdrawalData {
                token: token(),
                amount,
                nullifier: nullifier(tag),
                proof_blob: vec![0x70; 16],
                proof_root: Hash32([0x52; 32]),
            },
        )
    }

    /// Authorization for `id` as stored, bound to this gateway's chain
    pub fn authorization(&self, id: &WithdrawalId) -> WithdrawalAuthorization {
        let request = self
            .gateway
            .withdrawal_request(id)
            .expect("query")
            .expect("request exists");
        WithdrawalAuthorization::from_request(&request, self.gateway.chain_id())
    }

    pub fn sign(&self, message: &WithdrawalAuthorization) -> Vec<u8> {
        self.signer.sign_authorization(message).expect("sign")
    }

    pub fn authorize(&self, id: &WithdrawalId) -> Vec<u8> {
        self.sign(&self.authorization(id))
    }

    pub fn locked(&self) -> Amount {
        self.gateway.locked_balance(&token()).expect("locked balance")
    }

    pub fn wallet(&self, who: &str) -> Amount {
        self.gateway
            .backend()
            .balance_of(&AccountId::from(who), &token())
    }
}

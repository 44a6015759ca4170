//! Gateway state machine
//!
//! [`Gateway`] composes a [`LedgerBackend`] with a [`SignatureVerifier`].
//! State-changing operations live in [`crate::instructions`], one file per
//! instruction; this file holds construction, the shared guard and queries.

use crate::access::{self, Operation};
use crate::balance::BalanceLedger;
use crate::constants::{
    DEFAULT_BRIDGE_FEE_BPS, DEFAULT_MAX_DEPOSIT, DEFAULT_MIN_DEPOSIT, MAX_BRIDGE_FEE_BPS,
};
use crate::error::{GatewayError, Result};
use crate::logging;
use crate::nullifier::NullifierRegistry;
use crate::signature::SignatureVerifier;
use crate::storage::{LedgerBackend, StateChange};
use crate::types::{
    AccountId, Amount, AuthorityKey, BridgeStats, ChainContext, ChainId, DepositId, DepositRecord,
    GatewayConfig, Nullifier, TokenId, WithdrawalId, WithdrawalRequest, WithdrawalStatus,
};

/// Initialize parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitParams {
    pub owner: AccountId,
    pub authority: AuthorityKey,
    pub bridge_fee_bps: u16,
    pub min_deposit: Amount,
    pub max_deposit: Amount,
}

impl InitParams {
    /// Default fee and deposit limits
    pub fn new(owner: AccountId, authority: AuthorityKey) -> Self {
        Self {
            owner,
            authority,
            bridge_fee_bps: DEFAULT_BRIDGE_FEE_BPS,
            min_deposit: DEFAULT_MIN_DEPOSIT,
            max_deposit: DEFAULT_MAX_DEPOSIT,
        }
    }

    pub fn with_fee_bps(mut self, bps: u16) -> Self {
        self.bridge_fee_bps = bps;
        self
    }

    pub fn with_deposit_limits(mut self, min: Amount, max: Amount) -> Self {
        self.min_deposit = min;
        self.max_deposit = max;
        self
    }
}

pub(crate) fn validate_deposit_limits(min: Amount, max: Amount) -> Result<()> {
    if min == 0 || min > max {
        return Err(GatewayError::InvalidDepositLimits { min, max });
    }
    Ok(())
}

pub(crate) fn validate_fee(bps: u16) -> Result<()> {
    if bps > MAX_BRIDGE_FEE_BPS {
        return Err(GatewayError::FeeTooHigh {
            bps,
            max: MAX_BRIDGE_FEE_BPS,
        });
    }
    Ok(())
}

/// A gateway ledger instance on one chain
pub struct Gateway<B, V> {
    pub(crate) backend: B,
    pub(crate) verifier: V,
}

impl<B: LedgerBackend, V: SignatureVerifier> Gateway<B, V> {
    /// Write the initial configuration. Fails with `AlreadyInitialized` if
    /// `backend` already carries one.
    pub fn initialize(mut backend: B, verifier: V, params: InitParams) -> Result<Self> {
        if backend.config()?.is_some() {
            return Err(GatewayError::AlreadyInitialized);
        }

        validate_fee(params.bridge_fee_bps)?;
        validate_deposit_limits(params.min_deposit, params.max_deposit)?;
        verifier
            .validate_key(&params.authority)
            .map_err(|e| GatewayError::InvalidAuthorityKey(e.to_string()))?;

        let config = GatewayConfig {
            owner: params.owner,
            authority: params.authority,
            paused: false,
            bridge_fee_bps: params.bridge_fee_bps,
            min_deposit: params.min_deposit,
            max_deposit: params.max_deposit,
        };

        let owner = config.owner.to_string();
        let details = serde_json::json!({
            "chain_id": backend.chain_context().chain_id.0,
            "scheme": verifier.scheme().as_str(),
            "authority": config.authority.to_hex(),
            "bridge_fee_bps": config.bridge_fee_bps,
        });

        backend.commit(StateChange {
            config: Some(config),
            stats: Some(BridgeStats::default()),
            ..StateChange::default()
        })?;

        logging::log_admin_event("initialize", &owner, details);

        Ok(Self { backend, verifier })
    }

    /// Open an initialized backend
    pub fn open(backend: B, verifier: V) -> Result<Self> {
        if backend.config()?.is_none() {
            return Err(GatewayError::NotInitialized);
        }
        Ok(Self { backend, verifier })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct host access (advancing blocks, funding accounts in tests)
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn into_parts(self) -> (B, V) {
        (self.backend, self.verifier)
    }

    pub fn chain_context(&self) -> ChainContext {
        self.backend.chain_context()
    }

    pub fn chain_id(&self) -> ChainId {
        self.backend.chain_context().chain_id
    }

    pub(crate) fn load_config(&self) -> Result<GatewayConfig> {
        self.backend.config()?.ok_or(GatewayError::NotInitialized)
    }

    /// Role and pause check for `op`; returns the current config
    pub(crate) fn guard(&self, op: Operation, caller: Option<&AccountId>) -> Result<GatewayConfig> {
        let config = self.load_config()?;
        let is_lp = match caller {
            Some(account) if op.permission() == access::Permission::LiquidityProvider => {
                self.backend.is_liquidity_provider(account)?
            }
            _ => false,
        };

        access::authorize(op, caller, &config, is_lp).map_err(|err| {
            if matches!(err, GatewayError::Unauthorized(_)) {
                logging::log_security_event(
                    "unauthorized",
                    false,
                    serde_json::json!({
                        "operation": op.as_str(),
                        "caller": caller.map(|c| c.to_string()),
                    }),
                    None,
                );
            }
            err
        })?;

        Ok(config)
    }

    pub(crate) fn nullifiers(&self) -> NullifierRegistry<'_, B> {
        NullifierRegistry::new(&self.backend)
    }

    pub(crate) fn balances(&self) -> BalanceLedger<'_, B> {
        BalanceLedger::new(&self.backend)
    }

    pub(crate) fn commit(&mut self, change: StateChange) -> Result<()> {
        self.backend.commit(change).map_err(GatewayError::from)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> Result<GatewayConfig> {
        self.load_config()
    }

    pub fn locked_balance(&self, token: &TokenId) -> Result<Amount> {
        self.balances().locked(token)
    }

    pub fn available_liquidity(&self, token: &TokenId) -> Result<Amount> {
        self.balances().available_liquidity(token)
    }

    pub fn is_nullifier_used(&self, nullifier: &Nullifier) -> Result<bool> {
        self.nullifiers().is_used(nullifier)
    }

    pub fn deposit_record(&self, id: &DepositId) -> Result<Option<DepositRecord>> {
        Ok(self.backend.deposit(id)?)
    }

    pub fn withdrawal_request(&self, id: &WithdrawalId) -> Result<Option<WithdrawalRequest>> {
        Ok(self.backend.withdrawal(id)?)
    }

    pub fn withdrawal_status(&self, id: &WithdrawalId) -> Result<WithdrawalStatus> {
        Ok(self
            .backend
            .withdrawal(id)?
            .map(|w| w.status())
            .unwrap_or(WithdrawalStatus::NonExistent))
    }

    pub fn stats(&self) -> Result<BridgeStats> {
        Ok(self.backend.stats()?)
    }

    pub fn is_liquidity_provider(&self, account: &AccountId) -> Result<bool> {
        Ok(self.backend.is_liquidity_provider(account)?)
    }

    /// Unexecuted requests referencing `nullifier`. Several may exist; at
    /// most one will ever execute.
    pub fn pending_requests_for_nullifier(&self, nullifier: &Nullifier) -> Result<Vec<WithdrawalRequest>> {
        Ok(self
            .backend
            .withdrawals_by_nullifier(nullifier)?
            .into_iter()
            .filter(|w| !w.executed)
            .collect())
    }
}

//! Gateway Settings
//!
//! Settings load from `ZEROBRIDGE_*` environment variables or from a TOML
//! file with the same keys in lower case (without the prefix). Values left
//! unset fall back to the network preset.
//!
//! # Environment Variables
//!
//! - `ZEROBRIDGE_NETWORK` - "mainnet", "testnet" or "devnet" (default: "devnet")
//! - `ZEROBRIDGE_CHAIN_ID` - this gateway's chain id (devnet default: 31337)
//! - `ZEROBRIDGE_OWNER` - owner account, UTF-8 or 0x-hex
//! - `ZEROBRIDGE_AUTHORITY_KEY` - hex authority key (20-byte address or 33-byte
//!   SEC1 key for ECDSA, 32 bytes for Schnorr and Ed25519)
//! - `ZEROBRIDGE_SIGNATURE_SCHEME` - "ecdsa-secp256k1", "schnorr-bip340" or "ed25519"
//! - `ZEROBRIDGE_BRIDGE_FEE_BPS`, `ZEROBRIDGE_MIN_DEPOSIT`, `ZEROBRIDGE_MAX_DEPOSIT`
//! - `ZEROBRIDGE_LOG_LEVEL` - trace, debug, info, warn, error
//! - `ZEROBRIDGE_LOG_JSON` - "1"/"true" for JSON log lines
//!
//! Owner and authority key are required outside devnet.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{DEFAULT_BRIDGE_FEE_BPS, DEFAULT_MAX_DEPOSIT, DEFAULT_MIN_DEPOSIT};
use crate::gateway::{validate_deposit_limits, validate_fee, InitParams};
use crate::signature::{SignatureScheme, SignatureVerifier};
use crate::types::{AccountId, Amount, AuthorityKey, ChainId};

const ENV_PREFIX: &str = "ZEROBRIDGE_";

/// Devnet authority: the ECDSA address of secret key 0x..01
const DEVNET_AUTHORITY: &str = "7e5f4552091a69125d5dfcb7b8c2659029395bdf";
const DEVNET_OWNER: &str = "devnet-owner";
const DEVNET_CHAIN_ID: u64 = 31337;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("network mismatch: expected {0}, got {1}")]
    NetworkMismatch(String, String),

    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Network environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "devnet" | "dev" => Ok(Network::Devnet),
            _ => Err(ConfigError::InvalidValue(
                "network".to_string(),
                format!("unknown network: {}", s),
            )),
        }
    }
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    pub fn default_fee_bps(&self) -> u16 {
        DEFAULT_BRIDGE_FEE_BPS
    }

    pub fn default_deposit_limits(&self) -> (Amount, Amount) {
        match self {
            Network::Mainnet => (DEFAULT_MIN_DEPOSIT, DEFAULT_MAX_DEPOSIT),
            Network::Testnet => (1_000, DEFAULT_MAX_DEPOSIT * 10),
            Network::Devnet => (1, DEFAULT_MAX_DEPOSIT * 1_000),
        }
    }

    pub fn default_chain_id(&self) -> Option<ChainId> {
        match self {
            Network::Devnet => Some(ChainId(DEVNET_CHAIN_ID)),
            _ => None,
        }
    }

    pub fn default_log_json(&self) -> bool {
        matches!(self, Network::Mainnet)
    }
}

/// Amount given either as a TOML integer or as a decimal string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AmountValue {
    Int(u64),
    Text(String),
}

impl AmountValue {
    fn resolve(self, key: &str) -> Result<Amount, ConfigError> {
        match self {
            AmountValue::Int(v) => Ok(v as Amount),
            AmountValue::Text(s) => parse_value(key, &s),
        }
    }
}

/// Unresolved settings; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    network: Option<String>,
    chain_id: Option<u64>,
    owner: Option<String>,
    authority_key: Option<String>,
    signature_scheme: Option<String>,
    bridge_fee_bps: Option<u16>,
    min_deposit: Option<AmountValue>,
    max_deposit: Option<AmountValue>,
    log_level: Option<String>,
    log_json: Option<bool>,
}

/// Resolved gateway settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub network: Network,
    pub chain_id: ChainId,
    pub owner: AccountId,
    pub authority_key: AuthorityKey,
    pub scheme: SignatureScheme,
    pub bridge_fee_bps: u16,
    pub min_deposit: Amount,
    pub max_deposit: Amount,
    pub log_level: String,
    pub log_json: bool,
}

impl GatewaySettings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`, which receives full variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let raw = RawSettings {
            network: var("NETWORK"),
            chain_id: var("CHAIN_ID").map(|v| parse_value("ZEROBRIDGE_CHAIN_ID", &v)).transpose()?,
            owner: var("OWNER"),
            authority_key: var("AUTHORITY_KEY"),
            signature_scheme: var("SIGNATURE_SCHEME"),
            bridge_fee_bps: var("BRIDGE_FEE_BPS")
                .map(|v| parse_value("ZEROBRIDGE_BRIDGE_FEE_BPS", &v))
                .transpose()?,
            min_deposit: var("MIN_DEPOSIT").map(AmountValue::Text),
            max_deposit: var("MAX_DEPOSIT").map(AmountValue::Text),
            log_level: var("LOG_LEVEL"),
            log_json: var("LOG_JSON").map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")),
        };
        raw.resolve()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(contents)?;
        raw.resolve()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for production readiness
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.network != Network::Mainnet {
            return Err(ConfigError::NetworkMismatch(
                "mainnet".to_string(),
                self.network.as_str().to_string(),
            ));
        }

        if self.authority_key.to_hex() == DEVNET_AUTHORITY {
            return Err(ConfigError::InvalidValue(
                "authority_key".to_string(),
                "devnet authority key not allowed on mainnet".to_string(),
            ));
        }

        if self.chain_id.0 == DEVNET_CHAIN_ID {
            return Err(ConfigError::InvalidValue(
                "chain_id".to_string(),
                "devnet chain id not allowed on mainnet".to_string(),
            ));
        }

        Ok(())
    }

    /// Initialize parameters for [`crate::Gateway::initialize`].
    /// Fee, limits and key are checked here so a bad file fails at load time.
    pub fn init_params(&self) -> Result<InitParams, ConfigError> {
        validate_fee(self.bridge_fee_bps)
            .map_err(|e| ConfigError::InvalidValue("bridge_fee_bps".to_string(), e.to_string()))?;
        validate_deposit_limits(self.min_deposit, self.max_deposit)
            .map_err(|e| ConfigError::InvalidValue("deposit limits".to_string(), e.to_string()))?;
        self.scheme
            .verifier()
            .validate_key(&self.authority_key)
            .map_err(|e| ConfigError::InvalidValue("authority_key".to_string(), e.to_string()))?;

        Ok(InitParams::new(self.owner.clone(), self.authority_key.clone())
            .with_fee_bps(self.bridge_fee_bps)
            .with_deposit_limits(self.min_deposit, self.max_deposit))
    }

    pub fn verifier(&self) -> Box<dyn SignatureVerifier> {
        self.scheme.verifier()
    }

    /// Configuration summary with no secret material
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "network": self.network.as_str(),
            "chain_id": self.chain_id.0,
            "owner": self.owner.to_string(),
            "scheme": self.scheme.as_str(),
            "authority_key": self.authority_key.to_hex(),
            "bridge_fee_bps": self.bridge_fee_bps,
            "min_deposit": self.min_deposit.to_string(),
            "max_deposit": self.max_deposit.to_string(),
            "log_level": self.log_level,
        })
    }
}

impl RawSettings {
    fn resolve(self) -> Result<GatewaySettings, ConfigError> {
        let network: Network = self.network.as_deref().unwrap_or("devnet").parse()?;

        let chain_id = self
            .chain_id
            .map(ChainId)
            .or_else(|| network.default_chain_id())
            .ok_or_else(|| ConfigError::MissingEnvVar("ZEROBRIDGE_CHAIN_ID".to_string()))?;

        let owner = required_or_devnet_default(self.owner, "ZEROBRIDGE_OWNER", DEVNET_OWNER, network)?;
        let owner = AccountId::parse(&owner)
            .map_err(|e| ConfigError::InvalidValue("owner".to_string(), e.to_string()))?;

        let authority_key = required_or_devnet_default(
            self.authority_key,
            "ZEROBRIDGE_AUTHORITY_KEY",
            DEVNET_AUTHORITY,
            network,
        )?;
        let authority_key = AuthorityKey::from_hex(&authority_key)
            .map_err(|e| ConfigError::InvalidValue("authority_key".to_string(), e.to_string()))?;

        let scheme = match self.signature_scheme {
            Some(s) => s
                .parse::<SignatureScheme>()
                .map_err(|e| ConfigError::InvalidValue("signature_scheme".to_string(), e.to_string()))?,
            None => SignatureScheme::EcdsaSecp256k1,
        };

        let (default_min, default_max) = network.default_deposit_limits();
        let min_deposit = match self.min_deposit {
            Some(v) => v.resolve("min_deposit")?,
            None => default_min,
        };
        let max_deposit = match self.max_deposit {
            Some(v) => v.resolve("max_deposit")?,
            None => default_max,
        };

        Ok(GatewaySettings {
            network,
            chain_id,
            owner,
            authority_key,
            scheme,
            bridge_fee_bps: self.bridge_fee_bps.unwrap_or_else(|| network.default_fee_bps()),
            min_deposit,
            max_deposit,
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            log_json: self.log_json.unwrap_or_else(|| network.default_log_json()),
        })
    }
}

/// Required value, or the devnet default on devnet only
fn required_or_devnet_default(
    value: Option<String>,
    var_name: &str,
    devnet_default: &str,
    network: Network,
) -> Result<String, ConfigError> {
    match value {
        Some(v) => Ok(v),
        None if network == Network::Devnet => Ok(devnet_default.to_string()),
        None => Err(ConfigError::MissingEnvVar(var_name.to_string())),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), format!("cannot parse {:?}", value)))
}

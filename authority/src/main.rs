//! Gateway Authority CLI
//!
//! Key management and withdrawal signing for the ZeroBridge Coordinator.

use clap::{Args, Parser, Subcommand};
use zerobridge_authority::{
    parse_authorization, sign_authorization, vectors, verify_authorization, Keystore,
};
use zerobridge_gateway::{
    init_logging, AuthorityKey, AuthoritySigner, LogLevel, SignatureScheme, WithdrawalAuthorization,
};

#[derive(Parser)]
#[command(name = "gateway-authority")]
#[command(about = "Authority key management and withdrawal signing for ZeroBridge gateways")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// trace, debug, info, warn or error (`RUST_LOG` takes precedence)
    #[arg(long, global = true, env = "ZEROBRIDGE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

/// Fields of a withdrawal authorization
#[derive(Args, Debug)]
struct MessageArgs {
    /// Withdrawal id (32-byte hex)
    #[arg(long)]
    withdrawal_id: String,

    /// Recipient account (UTF-8 or 0x-hex)
    #[arg(long)]
    recipient: String,

    /// Token identifier
    #[arg(long)]
    token: String,

    /// Amount in the token's smallest unit
    #[arg(long)]
    amount: u128,

    /// Nullifier (32-byte hex)
    #[arg(long)]
    nullifier: String,

    /// Chain the withdrawal executes on
    #[arg(long)]
    chain_id: u64,
}

impl MessageArgs {
    fn to_authorization(&self) -> Result<WithdrawalAuthorization, Box<dyn std::error::Error>> {
        Ok(parse_authorization(
            &self.withdrawal_id,
            &self.recipient,
            &self.token,
            self.amount,
            &self.nullifier,
            self.chain_id,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new authority key and store it encrypted
    Keygen {
        /// ecdsa-secp256k1, schnorr-bip340 or ed25519
        #[arg(short, long, default_value = "ecdsa-secp256k1")]
        scheme: SignatureScheme,

        /// Path to encrypted key file
        #[arg(short, long, default_value = "config/authority.key.json")]
        key_file: String,

        /// Key password (or set ZEROBRIDGE_KEY_PASSWORD env var)
        #[arg(short, long, env = "ZEROBRIDGE_KEY_PASSWORD")]
        password: String,
    },

    /// Print scheme and authority key of a key file
    Show {
        #[arg(short, long, default_value = "config/authority.key.json")]
        key_file: String,
    },

    /// Sign a withdrawal authorization
    SignWithdrawal {
        #[arg(short, long, default_value = "config/authority.key.json")]
        key_file: String,

        #[arg(short, long, env = "ZEROBRIDGE_KEY_PASSWORD")]
        password: String,

        #[command(flatten)]
        message: MessageArgs,
    },

    /// Verify a signature the way a gateway would
    Verify {
        #[arg(short, long)]
        scheme: SignatureScheme,

        /// Authority key configured on the gateway (hex)
        #[arg(short, long)]
        authority_key: String,

        /// Signature (hex)
        #[arg(long)]
        signature: String,

        #[command(flatten)]
        message: MessageArgs,
    },

    /// Print the canonical message and every scheme's digest
    Message {
        #[command(flatten)]
        message: MessageArgs,
    },

    /// Print shared test vectors as JSON
    Vectors,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(LogLevel::from(cli.log_level.as_str()), cli.log_json)?;

    match cli.command {
        Commands::Keygen {
            scheme,
            key_file,
            password,
        } => {
            let signer = scheme.generate_signer();
            Keystore::new(&key_file).save(signer.as_ref(), &password)?;
            print_json(&serde_json::json!({
                "scheme": scheme.as_str(),
                "authority_key": signer.authority_key().to_hex(),
                "key_file": key_file,
            }))?;
        }
        Commands::Show { key_file } => {
            print_json(&Keystore::new(&key_file).info()?)?;
        }
        Commands::SignWithdrawal {
            key_file,
            password,
            message,
        } => {
            let signer: Box<dyn AuthoritySigner> = Keystore::new(&key_file).load(&password)?;
            let signed = sign_authorization(signer.as_ref(), message.to_authorization()?)?;
            print_json(&signed)?;
        }
        Commands::Verify {
            scheme,
            authority_key,
            signature,
            message,
        } => {
            let authority = AuthorityKey::from_hex(&authority_key)?;
            let signature = hex::decode(signature.trim_start_matches("0x"))?;
            let authorization = message.to_authorization()?;
            match verify_authorization(scheme, &authority, &authorization, &signature) {
                Ok(()) => println!("valid"),
                Err(e) => {
                    tracing::warn!(scheme = %scheme, error = %e, "Signature rejected");
                    return Err(format!("invalid signature: {}", e).into());
                }
            }
        }
        Commands::Message { message } => {
            let canonical = message.to_authorization()?.to_bytes()?;
            let digests: serde_json::Map<String, serde_json::Value> = SignatureScheme::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), hex::encode(s.digest(&canonical)).into()))
                .collect();
            print_json(&serde_json::json!({
                "canonical": hex::encode(&canonical),
                "digests": digests,
            }))?;
        }
        Commands::Vectors => {
            print_json(&vectors::generate()?)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

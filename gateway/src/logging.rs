//! Structured Logging for the Gateway
//!
//! Provides structured logging with:
//! - JSON output for log aggregation
//! - Correlation IDs (deposit / withdrawal identifiers)
//! - Security event logging (signature and nullifier rejections)
//!
//! # Usage
//!
//! ```rust,ignore
//! use zerobridge_gateway::logging::{init_logging, LogLevel};
//!
//! init_logging(LogLevel::Info, true)?; // JSON mode for production
//! tracing::info!(target: "zerobridge::withdrawal", withdrawal_id = %id, "Executing");
//! ```

use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::types::Amount;

pub const TARGET_DEPOSIT: &str = "zerobridge::deposit";
pub const TARGET_WITHDRAWAL: &str = "zerobridge::withdrawal";
pub const TARGET_ADMIN: &str = "zerobridge::admin";
pub const TARGET_SECURITY: &str = "zerobridge::security";

// ============================================================================
// Log Levels
// ============================================================================

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

// ============================================================================
// Structured Event Types
// ============================================================================

/// Event categories for structured logging
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Deposit,
    Withdrawal,
    Liquidity,
    /// Owner actions (pause, fee, authority rotation)
    Admin,
    /// Signature, nullifier and role rejections
    Security,
}

/// Structured log event
#[derive(Debug, Serialize)]
pub struct LogEvent {
    /// Event timestamp (RFC 3339)
    pub timestamp: String,
    pub level: String,
    pub category: EventCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Error details for error events
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: level.as_str().to_uppercase(),
            category,
            message: message.into(),
            correlation_id: None,
            data: None,
            error: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error = Some(ErrorDetails {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\": \"failed to serialize log\", \"message\": \"{}\"}}",
                self.message
            )
        })
    }
}

// ============================================================================
// Event Logging
// ============================================================================

/// Log a security-related event
pub fn log_security_event(
    event_type: &str,
    success: bool,
    details: serde_json::Value,
    correlation_id: Option<&str>,
) {
    let level = if success { LogLevel::Info } else { LogLevel::Warn };
    let mut event = LogEvent::new(level, EventCategory::Security, event_type).with_data(
        serde_json::json!({
            "success": success,
            "details": details
        }),
    );

    if let Some(id) = correlation_id {
        event = event.with_correlation_id(id);
    }

    if success {
        tracing::info!(target: TARGET_SECURITY, "{}", event.to_json());
    } else {
        tracing::warn!(target: TARGET_SECURITY, "{}", event.to_json());
    }
}

/// Log a deposit event. Amounts are logged as decimal strings (u128).
pub fn log_deposit_event(
    event_type: &str,
    deposit_id: &str,
    token: &str,
    net_amount: Amount,
    fee: Amount,
    target_chain_id: u64,
) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Deposit, event_type)
        .with_correlation_id(deposit_id)
        .with_data(serde_json::json!({
            "deposit_id": deposit_id,
            "token": token,
            "net_amount": net_amount.to_string(),
            "fee": fee.to_string(),
            "target_chain_id": target_chain_id,
        }));

    tracing::info!(target: TARGET_DEPOSIT, "{}", event.to_json());
}

/// Log a withdrawal lifecycle event
pub fn log_withdrawal_event(
    event_type: &str,
    withdrawal_id: &str,
    token: &str,
    amount: Amount,
    recipient: &str,
    success: bool,
    error: Option<(&str, &str)>,
) {
    let level = if success { LogLevel::Info } else { LogLevel::Error };
    let mut event = LogEvent::new(level, EventCategory::Withdrawal, event_type)
        .with_correlation_id(withdrawal_id)
        .with_data(serde_json::json!({
            "withdrawal_id": withdrawal_id,
            "token": token,
            "amount": amount.to_string(),
            "recipient": recipient,
            "success": success,
        }));

    if let Some((code, message)) = error {
        event = event.with_error(code, message);
    }

    if success {
        tracing::info!(target: TARGET_WITHDRAWAL, "{}", event.to_json());
    } else {
        tracing::error!(target: TARGET_WITHDRAWAL, "{}", event.to_json());
    }
}

/// Log a liquidity provider top-up or draw
pub fn log_liquidity_event(event_type: &str, provider: &str, token: &str, amount: Amount) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Liquidity, event_type).with_data(
        serde_json::json!({
            "provider": provider,
            "token": token,
            "amount": amount.to_string(),
        }),
    );

    tracing::info!(target: TARGET_ADMIN, "{}", event.to_json());
}

/// Log an owner action
pub fn log_admin_event(action: &str, actor: &str, details: serde_json::Value) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Admin, action).with_data(
        serde_json::json!({
            "actor": actor,
            "details": details,
        }),
    );

    tracing::info!(target: TARGET_ADMIN, "{}", event.to_json());
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set. Output goes to stderr so tools
/// printing results on stdout stay machine-readable. Fails if a global
/// subscriber is already installed.
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str();
        EnvFilter::new(format!(
            "zerobridge={level},zerobridge_gateway={level},zerobridge_authority={level},gateway_authority={level}"
        ))
    });

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Initialize logging from gateway settings
pub fn init_from_settings(settings: &crate::config::GatewaySettings) -> Result<(), LoggingError> {
    init_logging(LogLevel::from(settings.log_level.as_str()), settings.log_json)
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Correlation ID for operations that have no identifier yet
pub fn generate_correlation_id() -> String {
    format!(
        "{:x}-{:04x}",
        chrono::Utc::now().timestamp_millis() & 0xFFFF_FFFF,
        rand::random::<u16>()
    )
}

use rust_decimal::Decimal;
use thiserror::Error;

/// Typed error hierarchy for the lending engine.
///
/// The engine core is lenient by default and only produces the amount, asset
/// and network variants when strict validation is requested. Application
/// code (config loading, the host binary) wraps with `anyhow::Context`.
#[derive(Error, Debug)]
pub enum EngineError {
    // -- Amounts ------------------------------------------------------------
    #[error("invalid amount {raw:?}: {reason}")]
    InvalidAmount { raw: String, reason: String },

    #[error("insufficient {asset} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: String,
        requested: Decimal,
        available: Decimal,
    },

    // -- Reference data -----------------------------------------------------
    #[error("unknown asset: {symbol}")]
    UnknownAsset { symbol: String },

    #[error("unsupported network: {network_id}")]
    UnsupportedNetwork { network_id: u64 },

    // -- Requests -----------------------------------------------------------
    #[error("unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid account key: {0}")]
    InvalidAccountKey(String),

    // -- Store --------------------------------------------------------------
    #[error("position store error: {reason}")]
    Store { reason: String },

    // -- Configuration ------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl EngineError {
    /// Stable machine-readable code for the host boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::UnknownAsset { .. } => "unknown_asset",
            Self::UnsupportedNetwork { .. } => "unsupported_network",
            Self::UnknownTransactionType(_) => "unknown_transaction_type",
            Self::MissingField(_) => "missing_field",
            Self::InvalidAccountKey(_) => "invalid_account_key",
            Self::Store { .. } => "store_error",
            Self::Config(_) => "config_error",
            Self::SerdeJson(_) => "invalid_json",
        }
    }
}

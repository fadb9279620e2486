//! JSON-lines request boundary.
//!
//! One request object per line, tagged by `op`. Each line gets exactly one
//! response line: the operation's result, or `{"error": ..., "code": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::{LendingEngine, PreviewRequest, TransactionRequest};
use crate::errors::EngineError;
use crate::types::TransactionType;

fn default_network_id() -> u64 {
    1
}

/// Amount as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(serde_json::Number),
}

impl AmountField {
    fn into_raw(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketsParams {
    #[serde(default = "default_network_id")]
    pub network_id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountParams {
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewParams {
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub asset: Option<String>,
    pub amount: Option<AmountField>,
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub asset: Option<String>,
    pub amount: Option<AmountField>,
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    pub address: Option<String>,
    #[serde(default)]
    pub use_permit: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ApiRequest {
    Markets(MarketsParams),
    Positions(AccountParams),
    Portfolio(AccountParams),
    Preview(PreviewParams),
    Transaction(TransactionParams),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, EngineError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(EngineError::MissingField(field))
}

fn required_type(value: Option<String>) -> Result<TransactionType, EngineError> {
    required(value, "type")?.parse()
}

/// Dispatch one decoded request.
pub fn handle_request(engine: &LendingEngine, request: ApiRequest) -> Result<Value, EngineError> {
    let value = match request {
        ApiRequest::Markets(p) => serde_json::to_value(engine.markets(p.network_id)?)?,
        ApiRequest::Positions(p) => {
            let address = required(p.address, "address")?;
            serde_json::to_value(engine.positions(p.network_id, &address)?)?
        }
        ApiRequest::Portfolio(p) => {
            let address = required(p.address, "address")?;
            serde_json::to_value(engine.summary(p.network_id, &address)?)?
        }
        ApiRequest::Preview(p) => {
            let request = PreviewRequest {
                tx_type: required_type(p.tx_type)?,
                asset: required(p.asset, "asset")?,
                amount: p.amount.map_or_else(|| "0".to_string(), AmountField::into_raw),
                network_id: p.network_id,
                address: required(p.address, "address")?,
            };
            serde_json::to_value(engine.preview(&request)?)?
        }
        ApiRequest::Transaction(p) => {
            let request = TransactionRequest {
                tx_type: required_type(p.tx_type)?,
                asset: required(p.asset, "asset")?,
                amount: p
                    .amount
                    .map(AmountField::into_raw)
                    .ok_or(EngineError::MissingField("amount"))?,
                network_id: p.network_id,
                address: required(p.address, "address")?,
                use_permit: p.use_permit,
            };
            serde_json::to_value(engine.execute(&request)?)?
        }
    };
    Ok(value)
}

/// Decode, dispatch and encode one request line.
pub fn handle_line(engine: &LendingEngine, line: &str) -> String {
    let result = serde_json::from_str::<ApiRequest>(line)
        .map_err(EngineError::from)
        .and_then(|request| handle_request(engine, request));

    match result {
        Ok(value) => value.to_string(),
        Err(e) => error_line(&e),
    }
}

fn error_line(e: &EngineError) -> String {
    let body = ErrorBody {
        error: e.to_string(),
        code: e.code(),
    };
    serde_json::to_string(&body)
        .unwrap_or_else(|_| json!({"error": "internal error", "code": "internal"}).to_string())
}

//! Transaction executor: approval flow, transaction hash and receipt.
//!
//! There is no chain behind the executor. The receipt hash is a random
//! identifier in transaction-hash format and the status is always success
//! once the effect has been written.

use rand::RngCore;

use crate::constants::TX_HASH_BYTES;
use crate::types::{ApprovalMode, Receipt, TransactionType, TxStatus};

/// Allowance flow for a transaction. Never affects accounting.
pub fn approval_mode(tx_type: TransactionType, supports_permit: bool, use_permit: bool) -> ApprovalMode {
    if !tx_type.pulls_tokens() {
        ApprovalMode::None
    } else if use_permit && supports_permit {
        ApprovalMode::Permit
    } else {
        ApprovalMode::Approve
    }
}

/// `0x` followed by 64 random hex digits.
pub fn generate_tx_hash() -> String {
    let mut bytes = [0u8; TX_HASH_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

/// Receipt for a committed transaction, stamped with the current time.
pub fn build_receipt(
    tx_type: TransactionType,
    asset: &str,
    raw_amount: &str,
    approval: ApprovalMode,
) -> Receipt {
    Receipt {
        hash: generate_tx_hash(),
        status: TxStatus::Success,
        tx_type,
        asset: asset.to_string(),
        amount: raw_amount.to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        approval,
    }
}

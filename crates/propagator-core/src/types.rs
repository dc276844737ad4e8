//! Domain types returned by nodes.
//!
//! The dispatcher never looks inside these; they are passed through from
//! whichever node answered.

use bitcoin::{Amount, ScriptBuf, Txid};
use serde::Serialize;
use time::OffsetDateTime;

// ==============================================================================
// Unspent Outputs
// ==============================================================================

/// A spendable output belonging to the queried address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utxo {
    pub txid: Txid,
    pub vout: u32,
    pub address: String,
    pub script_pub_key: ScriptBuf,
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub value: Amount,
    /// `None` while the funding transaction is still in the mempool.
    pub height: Option<u32>,
    pub confirmations: u64,
}

// ==============================================================================
// Transaction Lookup
// ==============================================================================

/// Time, confirmations and OP_RETURN payload of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub txid: Txid,
    /// Payload embedded in the transaction's OP_RETURN output, decoded as
    /// text. Empty when the transaction carries no OP_RETURN output.
    pub data: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub confirmations: u64,
}

impl TransactionRecord {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmations > 0
    }
}

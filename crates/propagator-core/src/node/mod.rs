//! Backend node abstraction.
//!
//! Defines the [`Node`] trait every backend implements and provides a REST
//! implementation against the Insight API ([`InsightNode`]) plus a test mock
//! (`mock::MockNode`).

mod insight;
#[cfg(test)]
pub mod mock;

pub use insight::{parse_network, InsightNode};

use async_trait::async_trait;
use bitcoin::Txid;

use crate::error::CoreError;
use crate::types::{TransactionRecord, Utxo};

/// The operations a backend must offer to be used by a
/// [`Propagator`](crate::Propagator).
///
/// Implementations must report unreachability (connect failures, timeouts,
/// server-side unavailability) as [`CoreError::Transport`] and use a
/// different variant for anything the backend answered and rejected. The
/// dispatcher fails over on the former only.
#[async_trait]
pub trait Node: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch the unspent outputs of `address`.
    async fn get_unspent(&self, address: &str) -> Result<Vec<Utxo>, CoreError>;

    /// Broadcast a signed, consensus-serialized transaction and return its id.
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<Txid, CoreError>;

    /// Fetch the time, confirmations and OP_RETURN payload of a transaction.
    async fn get_transaction(&self, txid: &Txid) -> Result<TransactionRecord, CoreError>;
}

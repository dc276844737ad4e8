use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bitcoin::Txid;
use time::OffsetDateTime;

use crate::error::{CoreError, TransportError};
use crate::test_util::{sample_utxo, txid_from_byte};
use crate::types::{TransactionRecord, Utxo};

use super::Node;

/// Domain failure a [`MockNode`] answers with once it is reachable.
#[derive(Debug, Clone, Copy)]
pub enum Rejection {
    InvalidAddress,
    Broadcast,
    NotFound,
    InvalidTransaction,
}

/// A scripted node for dispatcher tests. Counts every call and fails with a
/// transport error for the first `unreachable_calls` of them.
pub struct MockNode {
    name: String,
    unreachable_calls: usize,
    rejection: Option<Rejection>,
    delay: Option<Duration>,
    utxos: Vec<Utxo>,
    txid: Txid,
    calls: AtomicUsize,
}

impl MockNode {
    pub fn builder(name: &str) -> MockNodeBuilder {
        MockNodeBuilder {
            name: name.to_owned(),
            unreachable_calls: 0,
            rejection: None,
            delay: None,
            utxos: vec![sample_utxo(1)],
            txid: txid_from_byte(0xaa),
        }
    }

    /// Node that answers every call successfully.
    pub fn healthy(name: &str) -> Self {
        Self::builder(name).build()
    }

    /// Node whose every call fails with a transport error.
    pub fn unreachable(name: &str) -> Self {
        Self::builder(name).unreachable_for(usize::MAX).build()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    async fn enter(&self) -> Result<(), CoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if call < self.unreachable_calls {
            return Err(TransportError::Unreachable(format!("{} is down", self.name)).into());
        }
        match self.rejection {
            None => Ok(()),
            Some(Rejection::InvalidAddress) => {
                Err(CoreError::InvalidAddress(format!("{} rejected address", self.name)))
            }
            Some(Rejection::Broadcast) => Err(CoreError::TransactionBroadcast(format!(
                "{} rejected transaction",
                self.name
            ))),
            Some(Rejection::NotFound) => Err(CoreError::TransactionNotFound(self.txid)),
            Some(Rejection::InvalidTransaction) => Err(CoreError::InvalidTransaction(format!(
                "{} returned garbage",
                self.name
            ))),
        }
    }
}

pub struct MockNodeBuilder {
    name: String,
    unreachable_calls: usize,
    rejection: Option<Rejection>,
    delay: Option<Duration>,
    utxos: Vec<Utxo>,
    txid: Txid,
}

impl MockNodeBuilder {
    pub fn unreachable_for(mut self, calls: usize) -> Self {
        self.unreachable_calls = calls;
        self
    }

    pub fn rejecting(mut self, rejection: Rejection) -> Self {
        self.rejection = Some(rejection);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_utxos(mut self, utxos: Vec<Utxo>) -> Self {
        self.utxos = utxos;
        self
    }

    pub fn with_txid(mut self, txid: Txid) -> Self {
        self.txid = txid;
        self
    }

    pub fn build(self) -> MockNode {
        MockNode {
            name: self.name,
            unreachable_calls: self.unreachable_calls,
            rejection: self.rejection,
            delay: self.delay,
            utxos: self.utxos,
            txid: self.txid,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Node for MockNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_unspent(&self, _address: &str) -> Result<Vec<Utxo>, CoreError> {
        self.enter().await?;
        Ok(self.utxos.clone())
    }

    async fn broadcast(&self, _raw_tx: &[u8]) -> Result<Txid, CoreError> {
        self.enter().await?;
        Ok(self.txid)
    }

    async fn get_transaction(&self, txid: &Txid) -> Result<TransactionRecord, CoreError> {
        self.enter().await?;
        Ok(TransactionRecord {
            txid: *txid,
            data: format!("from {}", self.name),
            time: OffsetDateTime::UNIX_EPOCH,
            confirmations: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_for_recovers_after_scripted_failures() {
        let node = MockNode::builder("flaky").unreachable_for(2).build();
        assert!(node.broadcast(&[]).await.unwrap_err().is_transport());
        assert!(node.broadcast(&[]).await.unwrap_err().is_transport());
        assert_eq!(node.broadcast(&[]).await.unwrap(), node.txid());
        assert_eq!(node.calls(), 3);
    }

    #[tokio::test]
    async fn rejection_applies_once_reachable() {
        let node = MockNode::builder("strict")
            .rejecting(Rejection::NotFound)
            .build();
        let err = node
            .get_transaction(&txid_from_byte(1))
            .await
            .expect_err("must reject");
        assert!(matches!(err, CoreError::TransactionNotFound(_)));
    }
}

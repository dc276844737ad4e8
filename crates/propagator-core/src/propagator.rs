//! Failover dispatch across backend nodes.
//!
//! A [`Propagator`] holds an ordered list of [`Node`]s and forwards each
//! operation to the first one that can be reached. Transport failures move
//! on to the next node, wrapping around until every node has used its
//! attempt budget; any other failure is returned as-is. After a success,
//! the nodes tried before the one that answered are rotated to the back of
//! the list so later calls start with a node that is known to work.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bitcoin::{Transaction, Txid};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::node::{parse_network, InsightNode, Node};
use crate::types::{TransactionRecord, Utxo};

/// Dispatcher that fails over between nodes and favours the last one that
/// worked.
///
/// Rotation of the node list happens under a lock, so concurrent calls on
/// one `Propagator` always leave the list a rotation of its previous order.
/// The lock is never held while a node is being called.
pub struct Propagator {
    nodes: Mutex<Vec<Arc<dyn Node>>>,
    attempts: NonZeroUsize,
}

impl Propagator {
    pub fn builder() -> PropagatorBuilder {
        PropagatorBuilder::default()
    }

    /// Dispatcher over `nodes` with one attempt per node.
    pub fn new(nodes: Vec<Arc<dyn Node>>) -> Result<Self, CoreError> {
        Self::builder().nodes(nodes).build()
    }

    /// Dispatcher over the default Insight node of `network`.
    pub fn for_network(network: &str) -> Result<Self, CoreError> {
        Self::builder().network(network).build()
    }

    /// Maximum attempts per node within one call.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    /// The nodes in their current priority order.
    pub async fn nodes(&self) -> Vec<Arc<dyn Node>> {
        self.nodes.lock().await.clone()
    }

    pub async fn node_names(&self) -> Vec<String> {
        self.nodes
            .lock()
            .await
            .iter()
            .map(|node| node.name().to_owned())
            .collect()
    }

    /// Serialize a signed transaction and broadcast it.
    pub async fn broadcast_transaction(&self, tx: &Transaction) -> Result<Txid, CoreError> {
        let raw_tx = bitcoin::consensus::serialize(tx);
        self.broadcast(&raw_tx).await
    }

    async fn run<T, F, Fut>(&self, op: &'static str, call: F) -> Result<T, CoreError>
    where
        F: Fn(Arc<dyn Node>) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let candidates = self.nodes.lock().await.clone();
        let total = candidates.len().saturating_mul(self.attempts.get());

        for attempt in 0..total {
            let node = Arc::clone(&candidates[attempt % candidates.len()]);
            match call(Arc::clone(&node)).await {
                Ok(value) => {
                    self.promote(&node).await;
                    debug!(node = node.name(), op, attempt, "node answered");
                    return Ok(value);
                }
                Err(err) if err.is_transport() => {
                    warn!(node = node.name(), op, attempt, total, error = %err, "node unreachable; trying next");
                }
                Err(err) => {
                    debug!(node = node.name(), op, kind = %err.kind(), error = %err, "node rejected request");
                    return Err(err);
                }
            }
        }

        warn!(op, attempts = total, "no node could be reached");
        Err(CoreError::Connection { attempts: total })
    }

    /// Rotate every node ahead of `node` to the back, keeping their order.
    async fn promote(&self, node: &Arc<dyn Node>) {
        let mut nodes = self.nodes.lock().await;
        if let Some(position) = nodes.iter().position(|n| Arc::ptr_eq(n, node)) {
            if position > 0 {
                nodes.rotate_left(position);
                debug!(node = node.name(), skipped = position, "promoted node to front");
            }
        }
    }
}

#[async_trait]
impl Node for Propagator {
    fn name(&self) -> &str {
        "propagator"
    }

    async fn get_unspent(&self, address: &str) -> Result<Vec<Utxo>, CoreError> {
        self.run("get_unspent", |node| async move { node.get_unspent(address).await })
            .await
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> Result<Txid, CoreError> {
        self.run("broadcast", |node| async move { node.broadcast(raw_tx).await })
            .await
    }

    async fn get_transaction(&self, txid: &Txid) -> Result<TransactionRecord, CoreError> {
        self.run("get_transaction", |node| async move {
            node.get_transaction(txid).await
        })
        .await
    }
}

// ==============================================================================
// Builder
// ==============================================================================

/// Configuration for a [`Propagator`]. Exactly one of [`network`] and
/// [`nodes`] must be set.
///
/// [`network`]: PropagatorBuilder::network
/// [`nodes`]: PropagatorBuilder::nodes
#[derive(Default)]
pub struct PropagatorBuilder {
    network: Option<String>,
    nodes: Option<Vec<Arc<dyn Node>>>,
    attempts: Option<usize>,
    timeout: Option<Duration>,
}

impl PropagatorBuilder {
    /// Use the public Insight node of this network (`mainnet` or `testnet`).
    pub fn network(mut self, network: &str) -> Self {
        self.network = Some(network.to_owned());
        self
    }

    pub fn nodes(mut self, nodes: Vec<Arc<dyn Node>>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Attempts per node within one call. Defaults to 1.
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Request timeout of the default Insight node.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Propagator, CoreError> {
        let attempts = NonZeroUsize::new(self.attempts.unwrap_or(1))
            .ok_or_else(|| CoreError::Config("attempts must be a positive integer".to_owned()))?;

        let nodes = match (self.network, self.nodes) {
            (Some(_), Some(_)) => {
                return Err(CoreError::Config(
                    "network and nodes are mutually exclusive".to_owned(),
                ));
            }
            (None, None) => {
                return Err(CoreError::Config(
                    "either a network or a list of nodes is required".to_owned(),
                ));
            }
            (Some(network), None) => {
                let node = InsightNode::new(parse_network(&network)?, self.timeout)?;
                vec![Arc::new(node) as Arc<dyn Node>]
            }
            (None, Some(nodes)) => nodes,
        };

        if nodes.is_empty() {
            return Err(CoreError::Config("at least one node is required".to_owned()));
        }

        debug!(nodes = nodes.len(), attempts = attempts.get(), "propagator configured");
        Ok(Propagator {
            nodes: Mutex::new(nodes),
            attempts,
        })
    }
}

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network, Txid};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use tracing::{debug, trace};

use crate::error::{CoreError, TransportError};
use crate::types::{TransactionRecord, Utxo};

use super::super::Node;
use super::connection::{default_base_url, parse_base_url};
use super::parsing::{parse_transaction, parse_txid, parse_utxos};
use super::protocol::{BroadcastRequest, UtxoRequest};

/// Request timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Node backed by an Insight block-explorer REST API.
///
/// Unreachable hosts, timeouts, HTTP 5xx, 408 and 429 responses are reported
/// as transport errors so a dispatcher can move on; other 4xx responses are
/// mapped to the domain error of the operation.
pub struct InsightNode {
    client: reqwest::Client,
    base_url: String,
    name: String,
    network: Network,
    limiter: Option<DirectRateLimiter>,
}

impl InsightNode {
    /// Node for the public Insight endpoint of `network` (mainnet or testnet).
    pub fn new(network: Network, timeout: Option<Duration>) -> Result<Self, CoreError> {
        Self::with_base_url(default_base_url(network)?, network, timeout)
    }

    /// Node for a self-hosted or third-party Insight endpoint, e.g.
    /// `http://127.0.0.1:3001/insight-api`.
    ///
    /// `network` is used to validate addresses before they are sent.
    pub fn with_base_url(
        base_url: &str,
        network: Network,
        timeout: Option<Duration>,
    ) -> Result<Self, CoreError> {
        let (base_url, name) = parse_base_url(base_url)?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::Config(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            name,
            network,
            limiter: None,
        })
    }

    /// Limit outbound requests to `requests_per_second`.
    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Result<Self, CoreError> {
        let limit = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| CoreError::Config("requests_per_second must be at least 1".to_owned()))?;
        self.limiter = Some(RateLimiter::direct(Quota::per_second(limit)));
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    fn check_address(&self, address: &str) -> Result<(), CoreError> {
        let unchecked: Address<NetworkUnchecked> = address
            .parse()
            .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;
        unchecked
            .require_network(self.network)
            .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;
        Ok(())
    }

    /// Send `request` and return the body of a successful response.
    ///
    /// Unavailability is returned as a transport error; any other non-2xx
    /// status is handed to `reject` to build the operation's domain error.
    async fn send<F>(
        &self,
        op: &'static str,
        request: reqwest::RequestBuilder,
        reject: F,
    ) -> Result<String, CoreError>
    where
        F: FnOnce(StatusCode, String) -> CoreError,
    {
        self.wait_for_rate_limit().await;
        debug!(node = %self.name, op, "insight request");

        let response = request.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::Http)?;
        debug!(node = %self.name, op, %status, body_len = body.len(), "insight response");
        trace!(node = %self.name, op, body = %body, "insight response body");

        if status.is_success() {
            return Ok(body);
        }
        if is_unavailable(status) {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Err(reject(status, body))
    }
}

#[async_trait]
impl Node for InsightNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_unspent(&self, address: &str) -> Result<Vec<Utxo>, CoreError> {
        self.check_address(address)?;

        let request = self
            .client
            .post(format!("{}/addrs/utxo", self.base_url))
            .json(&UtxoRequest { addrs: address });
        let body = self
            .send("get_unspent", request, |status, body| {
                CoreError::InvalidAddress(format!("{address}: HTTP {status}: {body}"))
            })
            .await?;

        parse_utxos(&body)
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> Result<Txid, CoreError> {
        let request = self
            .client
            .post(format!("{}/tx/send", self.base_url))
            .json(&BroadcastRequest {
                rawtx: hex::encode(raw_tx),
            });
        let body = self
            .send("broadcast", request, |status, body| {
                CoreError::TransactionBroadcast(format!("HTTP {status}: {body}"))
            })
            .await?;

        parse_txid(&body)
    }

    async fn get_transaction(&self, txid: &Txid) -> Result<TransactionRecord, CoreError> {
        let request = self.client.get(format!("{}/tx/{txid}", self.base_url));
        let body = self
            .send("get_transaction", request, |status, body| {
                normalize_lookup_rejection(txid, status, body)
            })
            .await?;

        parse_transaction(txid, &body)
    }
}

// ==============================================================================
// Status Classification
// ==============================================================================

/// Statuses meaning "this node cannot serve right now"; another node may.
fn is_unavailable(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Insight answers an unknown txid with 404; anything else it rejects is
/// treated as a malformed lookup.
fn normalize_lookup_rejection(txid: &Txid, status: StatusCode, body: String) -> CoreError {
    if status == StatusCode::NOT_FOUND {
        CoreError::TransactionNotFound(*txid)
    } else {
        CoreError::InvalidTransaction(format!("lookup of {txid} failed with HTTP {status}: {body}"))
    }
}

//! REST client for Insight-compatible block explorers.
//!
//! Implements [`Node`](super::Node) over the Insight HTTP API using
//! `reqwest`, with per-request timeouts, optional outbound rate limiting,
//! local address validation, and status-code classification into
//! transport versus domain errors.

mod client;
mod connection;
mod parsing;
mod protocol;

pub use client::InsightNode;
pub use connection::parse_network;

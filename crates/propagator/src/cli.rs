use bitcoin::Txid;
use clap::{Parser, Subcommand};

/// Propagator: query and broadcast Bitcoin transactions through failover
/// Insight nodes.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Network selector (`mainnet`/`livenet`, `testnet`, `signet`, `regtest`).
    #[arg(long, default_value = "testnet", env = "PROPAGATOR_NETWORK")]
    pub network: String,

    /// Insight API base URL (repeatable, tried in order). Defaults to the
    /// public endpoint of `--network`.
    #[arg(long = "node-url", env = "PROPAGATOR_NODE_URLS", value_delimiter = ',')]
    pub node_urls: Vec<String>,

    /// Attempts per node before giving up.
    #[arg(long, default_value = "1", env = "PROPAGATOR_ATTEMPTS")]
    pub attempts: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "5", env = "PROPAGATOR_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Maximum outbound requests per second to each node.
    #[arg(long, env = "PROPAGATOR_REQUESTS_PER_SECOND")]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the unspent outputs of an address.
    Unspent {
        address: String,
    },

    /// Broadcast a signed, hex-encoded raw transaction.
    Broadcast {
        raw_tx: String,
    },

    /// Show the time, confirmations and OP_RETURN payload of a transaction.
    Tx {
        txid: Txid,
    },

    /// Decode the OP_RETURN payload of a hex-encoded output script offline.
    Decode {
        script: String,
    },
}

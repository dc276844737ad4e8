mod cli;

use std::sync::Arc;
use std::time::Duration;

use bitcoin::Transaction;
use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::json;

use propagator_core::node::parse_network;
use propagator_core::{op_return_payload, CoreError, ErrorKind, InsightNode, Node, Propagator};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    match &args.command {
        Command::Decode { script } => {
            let payload = op_return_payload(script).context("decode OP_RETURN script")?;
            print_json(&json!({
                "hex": hex::encode(&payload),
                "text": String::from_utf8_lossy(&payload),
            }))?;
        }
        Command::Unspent { address } => {
            let propagator = build_propagator(&args).await?;
            let utxos = propagator
                .get_unspent(address)
                .await
                .map_err(|err| report(err, "fetch unspent outputs"))?;
            print_json(&utxos)?;
        }
        Command::Broadcast { raw_tx } => {
            let bytes = hex::decode(raw_tx.trim()).context("raw transaction is not valid hex")?;
            let tx: Transaction = bitcoin::consensus::deserialize(&bytes)
                .context("raw transaction is not a consensus-encoded transaction")?;
            let propagator = build_propagator(&args).await?;
            let txid = propagator
                .broadcast_transaction(&tx)
                .await
                .map_err(|err| report(err, "broadcast transaction"))?;
            print_json(&json!({ "txid": txid }))?;
        }
        Command::Tx { txid } => {
            let propagator = build_propagator(&args).await?;
            let record = propagator
                .get_transaction(txid)
                .await
                .map_err(|err| report(err, "look up transaction"))?;
            print_json(&record)?;
        }
    }

    Ok(())
}

async fn build_propagator(args: &Cli) -> eyre::Result<Propagator> {
    let network = parse_network(&args.network).context("parse --network")?;
    let timeout = Some(Duration::from_secs(args.timeout_secs));

    let mut insight_nodes = Vec::with_capacity(args.node_urls.len().max(1));
    if args.node_urls.is_empty() {
        insight_nodes.push(InsightNode::new(network, timeout).context("default Insight node")?);
    } else {
        for url in &args.node_urls {
            insight_nodes.push(
                InsightNode::with_base_url(url, network, timeout)
                    .with_context(|| format!("configure node `{url}`"))?,
            );
        }
    }

    let nodes = insight_nodes
        .into_iter()
        .map(|node| match args.requests_per_second {
            Some(limit) => node.with_requests_per_second(limit),
            None => Ok(node),
        })
        .map(|node| node.map(|node| Arc::new(node) as Arc<dyn Node>))
        .collect::<Result<Vec<_>, CoreError>>()
        .context("configure rate limit")?;

    let propagator = Propagator::builder()
        .nodes(nodes)
        .attempts(args.attempts)
        .build()
        .context("configure propagator")?;

    tracing::info!(
        nodes = ?propagator.node_names().await,
        attempts = propagator.attempts(),
        "propagator ready"
    );
    Ok(propagator)
}

/// Attach an actionable hint to the failures a user can do something about.
fn report(err: CoreError, action: &str) -> eyre::Report {
    let hint = match err.kind() {
        ErrorKind::Connection => Some(
            "hint: no node could be reached; check network access, --node-url, or raise --attempts / --timeout-secs",
        ),
        ErrorKind::InvalidAddress => {
            Some("hint: verify the address belongs to the network selected with --network")
        }
        _ => None,
    };
    let report = eyre!("{}: {err}", err.kind()).wrap_err(format!("failed to {action}"));
    match hint {
        Some(hint) => report.wrap_err(hint),
        None => report,
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> eyre::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("render JSON output")?;
    println!("{rendered}");
    Ok(())
}

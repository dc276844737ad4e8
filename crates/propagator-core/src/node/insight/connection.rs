use bitcoin::Network;
use reqwest::Url;

use crate::error::CoreError;

const MAINNET_URL: &str = "https://insight.bitpay.com/api";
const TESTNET_URL: &str = "https://test-insight.bitpay.com/api";

/// Parse a network selector such as `mainnet` or `testnet`.
pub fn parse_network(name: &str) -> Result<Network, CoreError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mainnet" | "livenet" | "main" | "bitcoin" => Ok(Network::Bitcoin),
        "testnet" | "test" => Ok(Network::Testnet),
        "signet" => Ok(Network::Signet),
        "regtest" => Ok(Network::Regtest),
        _ => Err(CoreError::UnknownNetwork(name.to_owned())),
    }
}

/// Public Insight endpoint for `network`. Only mainnet and testnet have one.
pub(super) fn default_base_url(network: Network) -> Result<&'static str, CoreError> {
    match network {
        Network::Bitcoin => Ok(MAINNET_URL),
        Network::Testnet => Ok(TESTNET_URL),
        other => Err(CoreError::UnknownNetwork(format!(
            "{other} has no public Insight endpoint; pass a base URL"
        ))),
    }
}

/// Validate an Insight base URL and derive a short node name from its host.
///
/// Returns the URL without a trailing slash so endpoint paths can be
/// appended directly.
pub(super) fn parse_base_url(base_url: &str) -> Result<(String, String), CoreError> {
    let parsed = Url::parse(base_url).map_err(|e| {
        CoreError::Config(format!(
            "invalid node URL `{base_url}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CoreError::Config(format!(
                "unsupported node URL scheme `{other}`; expected http or https"
            )));
        }
    }

    let name = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_owned(),
        (None, _) => {
            return Err(CoreError::Config(format!(
                "node URL `{base_url}` has no host"
            )));
        }
    };

    Ok((base_url.trim_end_matches('/').to_owned(), name))
}

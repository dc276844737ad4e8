//! Request and response bodies of the Insight REST API.

#[derive(serde::Serialize)]
pub(super) struct UtxoRequest<'a> {
    pub(super) addrs: &'a str,
}

#[derive(serde::Serialize)]
pub(super) struct BroadcastRequest {
    pub(super) rawtx: String,
}

#[derive(serde::Deserialize)]
pub(super) struct BroadcastResponse {
    pub(super) txid: String,
}

#[derive(serde::Deserialize)]
pub(super) struct InsightUtxo {
    pub(super) address: String,
    pub(super) txid: String,
    pub(super) vout: u32,
    #[serde(rename = "scriptPubKey")]
    pub(super) script_pub_key: String,
    /// BTC as a float. Older deployments only report this.
    pub(super) amount: Option<f64>,
    pub(super) satoshis: Option<u64>,
    pub(super) height: Option<u32>,
    #[serde(default)]
    pub(super) confirmations: u64,
}

#[derive(serde::Deserialize)]
pub(super) struct InsightTx {
    pub(super) vout: Vec<InsightVout>,
    pub(super) time: i64,
    #[serde(default)]
    pub(super) confirmations: u64,
}

#[derive(serde::Deserialize)]
pub(super) struct InsightVout {
    #[serde(rename = "scriptPubKey")]
    pub(super) script_pub_key: InsightScript,
}

#[derive(serde::Deserialize)]
pub(super) struct InsightScript {
    pub(super) hex: String,
}

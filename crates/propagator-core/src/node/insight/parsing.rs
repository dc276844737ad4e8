use bitcoin::{Amount, ScriptBuf, Txid};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::CoreError;
use crate::script::op_return_text;
use crate::types::{TransactionRecord, Utxo};

use super::protocol::{InsightTx, InsightUtxo};

/// First byte of every data-carrying output script.
const OP_RETURN_HEX: &str = "6a";

pub(super) fn parse_utxos(body: &str) -> Result<Vec<Utxo>, CoreError> {
    let raw: Vec<InsightUtxo> = serde_json::from_str(body)
        .map_err(|e| CoreError::InvalidResponse(format!("decode utxo list: {e}; body={body}")))?;
    raw.into_iter().map(parse_utxo).collect()
}

fn parse_utxo(raw: InsightUtxo) -> Result<Utxo, CoreError> {
    let txid: Txid = raw
        .txid
        .parse()
        .map_err(|e| CoreError::InvalidResponse(format!("invalid utxo txid: {e}")))?;
    let script_pub_key = ScriptBuf::from_hex(&raw.script_pub_key)
        .map_err(|e| CoreError::InvalidResponse(format!("invalid utxo scriptPubKey: {e}")))?;
    let value = match (raw.satoshis, raw.amount) {
        (Some(sats), _) => Amount::from_sat(sats),
        (None, Some(btc)) => Amount::from_btc(btc)
            .map_err(|e| CoreError::InvalidResponse(format!("invalid utxo amount {btc}: {e}")))?,
        (None, None) => {
            return Err(CoreError::InvalidResponse(format!(
                "utxo {txid}:{} has no amount",
                raw.vout
            )));
        }
    };

    Ok(Utxo {
        txid,
        vout: raw.vout,
        address: raw.address,
        script_pub_key,
        value,
        height: raw.height,
        confirmations: raw.confirmations,
    })
}

pub(super) fn parse_txid(body: &str) -> Result<Txid, CoreError> {
    let response: super::protocol::BroadcastResponse = serde_json::from_str(body).map_err(|e| {
        CoreError::InvalidResponse(format!("decode broadcast response: {e}; body={body}"))
    })?;
    response
        .txid
        .parse()
        .map_err(|e| CoreError::InvalidResponse(format!("invalid broadcast txid: {e}")))
}

pub(super) fn parse_transaction(txid: &Txid, body: &str) -> Result<TransactionRecord, CoreError> {
    let raw: InsightTx = serde_json::from_str(body)
        .map_err(|e| CoreError::InvalidTransaction(format!("decode transaction {txid}: {e}")))?;

    let time = OffsetDateTime::from_unix_timestamp(raw.time)
        .map_err(|e| CoreError::InvalidTransaction(format!("invalid time {}: {e}", raw.time)))?;

    let data = match raw
        .vout
        .iter()
        .map(|out| out.script_pub_key.hex.as_str())
        .find(|hex| hex.starts_with(OP_RETURN_HEX))
    {
        Some(script) => op_return_text(script).map_err(|e| {
            CoreError::InvalidTransaction(format!("OP_RETURN of {txid} is not decodable: {e}"))
        })?,
        None => {
            debug!(%txid, outputs = raw.vout.len(), "transaction has no OP_RETURN output");
            String::new()
        }
    };

    Ok(TransactionRecord {
        txid: *txid,
        data,
        time,
        confirmations: raw.confirmations,
    })
}

//! Shared test helpers for `propagator-core` unit tests.

use std::sync::Arc;

use bitcoin::hashes::Hash;
use bitcoin::{Amount, ScriptBuf, Txid};

use crate::node::mock::MockNode;
use crate::node::Node;
use crate::types::Utxo;

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

/// A confirmed P2WPKH output worth `sats`.
pub fn sample_utxo(sats: u64) -> Utxo {
    // OP_0 PUSH20 <20-byte-hash>
    let mut script = vec![0x00, 0x14];
    script.extend(1..=20u8);
    Utxo {
        txid: txid_from_byte(0x11),
        vout: 0,
        address: "tb1qqypqxpq9qcrsszg2pvxq6rs0zqg3yyc5tmpzjl".to_owned(),
        script_pub_key: ScriptBuf::from_bytes(script),
        value: Amount::from_sat(sats),
        height: Some(100),
        confirmations: 6,
    }
}

/// Erase a list of mocks into the node list a dispatcher takes, keeping the
/// typed handles for call counting.
pub fn node_list(mocks: &[&Arc<MockNode>]) -> Vec<Arc<dyn Node>> {
    mocks
        .iter()
        .map(|mock| Arc::clone(mock) as Arc<dyn Node>)
        .collect()
}

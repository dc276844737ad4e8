pub mod error;
pub mod node;
pub mod propagator;
pub mod script;
pub mod types;

#[cfg(test)]
mod test_util;

pub use error::{CoreError, ErrorKind, TransportError};
pub use node::{InsightNode, Node};
pub use propagator::{Propagator, PropagatorBuilder};
pub use script::{op_return_payload, op_return_text, ScriptError};
pub use types::{TransactionRecord, Utxo};

use bitcoin::Txid;

use crate::script::ScriptError;

/// Stable tag for every [`CoreError`]. The dispatcher only fails over on
/// [`ErrorKind::Transport`]; every other kind is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Transport,
    InvalidAddress,
    TransactionBroadcast,
    TransactionNotFound,
    InvalidTransaction,
    InvalidResponse,
    Config,
    UnknownNetwork,
    Script,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Connection => "ConnectionError",
            Self::Transport => "TransportError",
            Self::InvalidAddress => "InvalidAddressError",
            Self::TransactionBroadcast => "TransactionBroadcastError",
            Self::TransactionNotFound => "TransactionNotFoundError",
            Self::InvalidTransaction => "InvalidTransactionError",
            Self::InvalidResponse => "InvalidResponseError",
            Self::Config => "ConfigError",
            Self::UnknownNetwork => "UnknownNetworkError",
            Self::Script => "ScriptError",
        };
        f.write_str(name)
    }
}

/// Failures that mean "the node could not be reached", as opposed to the node
/// answering and rejecting the request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("node unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("could not connect to any node after {attempts} attempts")]
    Connection { attempts: usize },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction broadcast rejected: {0}")]
    TransactionBroadcast(String),

    #[error("the transaction with ID '{0}' wasn't found")]
    TransactionNotFound(Txid),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("invalid node response: {0}")]
    InvalidResponse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

impl CoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Transport(_) => ErrorKind::Transport,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::TransactionBroadcast(_) => ErrorKind::TransactionBroadcast,
            Self::TransactionNotFound(_) => ErrorKind::TransactionNotFound,
            Self::InvalidTransaction(_) => ErrorKind::InvalidTransaction,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::Config(_) => ErrorKind::Config,
            Self::UnknownNetwork(_) => ErrorKind::UnknownNetwork,
            Self::Script(_) => ErrorKind::Script,
        }
    }

    /// Whether a dispatcher should move on to the next node.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::txid_from_byte;

    #[test]
    fn only_transport_errors_are_retryable() {
        let transport = CoreError::from(TransportError::Unreachable("refused".into()));
        assert!(transport.is_transport());

        let terminal = [
            CoreError::Connection { attempts: 2 },
            CoreError::InvalidAddress("bad".into()),
            CoreError::TransactionBroadcast("non-standard".into()),
            CoreError::TransactionNotFound(txid_from_byte(1)),
            CoreError::InvalidTransaction("garbled".into()),
            CoreError::InvalidResponse("not json".into()),
            CoreError::Config("no nodes".into()),
            CoreError::UnknownNetwork("regtest".into()),
            CoreError::Script(ScriptError::MissingLength),
        ];
        for err in terminal {
            assert!(!err.is_transport(), "{} must be terminal", err.kind());
        }
    }

    #[test]
    fn status_errors_keep_transport_kind() {
        let err: CoreError = TransportError::Status {
            status: 503,
            body: "maintenance".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn connection_error_message_mentions_nodes() {
        let err = CoreError::Connection { attempts: 4 };
        assert_eq!(err.kind().to_string(), "ConnectionError");
        assert_eq!(
            err.to_string(),
            "could not connect to any node after 4 attempts"
        );
    }
}

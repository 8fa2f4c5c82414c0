use repwatch_store::StoreError;
use repwatch_types::{RepAddress, RepwatchError};
use thiserror::Error;

/// Failure reported by an external collaborator (ledger node, uptime
/// provider, crawler, wallet).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum KnownListError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("malformed known representative list: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("wallet accounts unavailable: {0}")]
    Accounts(#[source] SourceError),

    #[error("ledger info for {account} failed: {source}")]
    Ledger {
        account: RepAddress,
        #[source]
        source: SourceError,
    },

    #[error("amount error: {0}")]
    Amount(#[from] RepwatchError),

    #[error("known list error: {0}")]
    KnownList(#[from] KnownListError),

    #[error("configuration error: {0}")]
    Config(String),
}

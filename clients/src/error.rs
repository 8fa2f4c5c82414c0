use repwatch_monitor::SourceError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The node answered with an `error` field.
    #[error("node error: {0}")]
    Node(String),

    #[error("client setup failed: {0}")]
    Setup(String),
}

impl ClientError {
    /// Classify a transport error the way the collaborators report it.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::Unreachable(format!("connection failed: {e}"))
        } else {
            Self::RequestFailed(e.to_string())
        }
    }
}

impl From<ClientError> for SourceError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Unreachable(msg) => SourceError::Unreachable(msg),
            ClientError::RequestFailed(msg) => SourceError::RequestFailed(msg),
            ClientError::InvalidResponse(msg) => SourceError::InvalidResponse(msg),
            ClientError::Node(msg) => SourceError::RequestFailed(format!("node error: {msg}")),
            ClientError::Setup(msg) => SourceError::Other(msg),
        }
    }
}

// Error types for the pledge submission flow

use thiserror::Error;

use super::types::Address;

/// Raw failure reported by the chain-interaction layer.
///
/// Wallet providers report user rejection through `code`; node and
/// library failures usually only carry a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ChainError {
    pub code: Option<i64>,
    pub message: String,
}

impl ChainError {
    /// EIP-1193 code for "user rejected the request"
    pub const USER_REJECTED_CODE: i64 = 4001;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::with_code(
            Self::USER_REJECTED_CODE,
            "MetaMask Tx Signature: User denied transaction signature.",
        )
    }
}

/// Malformed wizard input, caught before any chain call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pledge amount is required")]
    MissingAmount,
    #[error("pledge amount `{0}` is not a valid decimal number")]
    InvalidAmount(String),
    #[error("pledge amount `{value}` has more than {decimals} decimal places")]
    TooPrecise { value: String, decimals: u32 },
    #[error("pledge amount `{0}` is too large")]
    AmountOverflow(String),
    #[error("pledge amount must be greater than zero")]
    ZeroAmount,
    #[error("share count is required")]
    MissingShares,
    #[error("share count `{0}` is not a whole number")]
    InvalidShares(String),
    #[error("`{0}` is not a valid address")]
    InvalidAddress(String),
}

/// Failure persisting the application record to the backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build backend client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend rejected application with HTTP {status}")]
    Rejected { status: u16 },
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("organization {0} not found")]
    NotFound(Address),
    #[error("organization metadata query failed: {0}")]
    Query(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("a pledge submission is already in flight for this form")]
    AttemptInFlight,
}

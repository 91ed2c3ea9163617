// Maps raw chain failures onto user-facing categories and messages

use regex::Regex;
use std::sync::LazyLock;

use super::errors::{ChainError, ValidationError};
use super::types::{ErrorCategory, TxHash};

static CONFIRMATION_TIMEOUT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Transaction was not mined within \d+ blocks")
        .expect("confirmation timeout pattern is valid")
});

/// Classify a chain failure. Precedence: user rejection, then confirmation
/// timeout, then unknown. Never returns `ValidationFailure`.
pub fn classify(error: &ChainError) -> ErrorCategory {
    if error.code == Some(ChainError::USER_REJECTED_CODE) {
        return ErrorCategory::UserRejected;
    }

    if CONFIRMATION_TIMEOUT_MARKER.is_match(&error.message) {
        return ErrorCategory::ConfirmationTimeout;
    }

    ErrorCategory::Unknown
}

impl ErrorCategory {
    /// Human-readable message, annotated with the in-flight hash when one
    /// was captured before the failure.
    pub fn message(&self, hash: Option<&TxHash>) -> String {
        match (self, hash) {
            (ErrorCategory::UserRejected, None) => {
                "Approval rejected by user. Please try again.".to_string()
            }
            (ErrorCategory::UserRejected, Some(hash)) => {
                format!("Approval rejected by user. Please try again. TX hash: {hash}")
            }
            (ErrorCategory::ConfirmationTimeout, None) => {
                "Transaction is taking a long time to be mined.".to_string()
            }
            (ErrorCategory::ConfirmationTimeout, Some(hash)) => {
                format!("Transaction is taking a long time to be mined. TX hash: {hash}")
            }
            (ErrorCategory::ValidationFailure, _) => {
                "Invalid pledge. Please check the form and try again.".to_string()
            }
            (ErrorCategory::Unknown, _) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Message for input rejected before any chain call
pub fn validation_message(error: &ValidationError) -> String {
    format!("Invalid pledge: {error}. Please check the form and try again.")
}

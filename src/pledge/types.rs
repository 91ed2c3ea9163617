// Core types for the pledge submission workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{ChainError, ValidationError};

/// Account or contract address (`0x` + 40 hex digits), stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Left-padded 32-byte ABI word, without the `0x` prefix
    pub fn to_abi_word(&self) -> String {
        format!("{:0>64}", &self.0[2..])
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidAddress(s.to_string()))?;

        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(s.to_string()));
        }

        Ok(Address(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction hash as reported by the wallet on broadcast
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token amount in base units (wei for 18-decimal tokens)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub fn base_units(&self) -> u128 {
        self.0
    }

    /// Convert a human decimal string ("1.5") into base units for a token
    /// with `decimals` decimal places.
    pub fn parse_decimal(value: &str, decimals: u32) -> Result<Self, ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::MissingAmount);
        }

        let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(ValidationError::InvalidAmount(value.to_string()));
        }

        let fraction_len = fraction.len() as u32;
        if fraction_len > decimals {
            return Err(ValidationError::TooPrecise {
                value: value.to_string(),
                decimals,
            });
        }

        let overflow = || ValidationError::AmountOverflow(value.to_string());
        let scale = 10u128.checked_pow(decimals).ok_or_else(overflow)?;

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| overflow())?
        };
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let digits = fraction.parse::<u128>().map_err(|_| overflow())?;
            digits * 10u128.pow(decimals - fraction_len)
        };

        let total = whole_units
            .checked_mul(scale)
            .and_then(|units| units.checked_add(fraction_units))
            .ok_or_else(overflow)?;

        if total == 0 {
            return Err(ValidationError::ZeroAmount);
        }

        Ok(Self(total))
    }

    /// 32-byte ABI word, without the `0x` prefix
    pub fn to_abi_word(&self) -> String {
        format!("{:064x}", self.0)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw values collected by the wizard's pledge step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeForm {
    pub pledge: String,
    pub shares: String,
}

impl PledgeForm {
    pub fn new(pledge: impl Into<String>, shares: impl Into<String>) -> Self {
        Self {
            pledge: pledge.into(),
            shares: shares.into(),
        }
    }
}

/// Validated pledge, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PledgeRequest {
    pledge_amount: String,
    amount: TokenAmount,
    share_count: u64,
    applicant_address: Address,
    organization_address: Address,
}

impl PledgeRequest {
    pub fn from_form(
        form: &PledgeForm,
        applicant_address: &Address,
        organization_address: &Address,
        token_decimals: u32,
    ) -> Result<Self, ValidationError> {
        let pledge_amount = form.pledge.trim().to_string();
        let amount = TokenAmount::parse_decimal(&pledge_amount, token_decimals)?;

        let shares = form.shares.trim();
        if shares.is_empty() {
            return Err(ValidationError::MissingShares);
        }
        if !shares.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidShares(shares.to_string()));
        }
        let share_count = shares
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidShares(shares.to_string()))?;

        Ok(Self {
            pledge_amount,
            amount,
            share_count,
            applicant_address: applicant_address.clone(),
            organization_address: organization_address.clone(),
        })
    }

    pub fn pledge_amount(&self) -> &str {
        &self.pledge_amount
    }

    pub fn amount(&self) -> TokenAmount {
        self.amount
    }

    pub fn share_count(&self) -> u64 {
        self.share_count
    }

    pub fn applicant_address(&self) -> &Address {
        &self.applicant_address
    }

    pub fn organization_address(&self) -> &Address {
        &self.organization_address
    }
}

/// Advisory status of the backend application mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    New,
    Confirmed,
    Rejected,
}

/// Backend mirror of a pledge submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub pledge: String,
    pub shares: u64,
    pub applicant_address: Address,
    #[serde(rename = "molochContractAddress")]
    pub organization_address: Address,
    pub status: ApplicationStatus,
}

impl ApplicationRecord {
    pub fn new(request: &PledgeRequest) -> Self {
        Self {
            pledge: request.pledge_amount().to_string(),
            shares: request.share_count(),
            applicant_address: request.applicant_address().clone(),
            organization_address: request.organization_address().clone(),
            status: ApplicationStatus::New,
        }
    }
}

/// Network confirmation that a transaction was included in a block
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` when the transaction was mined but reverted
    pub status: bool,
    pub raw: serde_json::Value,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status
    }
}

/// Lifecycle events emitted by the transaction driver, in order
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionEvent {
    HashAvailable(TxHash),
    Confirmed(TransactionReceipt),
    Failed(ChainError),
}

/// User-facing failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    UserRejected,
    ConfirmationTimeout,
    Unknown,
    /// Malformed form input; never produced by classifying a chain failure
    ValidationFailure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::UserRejected => "user_rejected",
            ErrorCategory::ConfirmationTimeout => "confirmation_timeout",
            ErrorCategory::Unknown => "unknown",
            ErrorCategory::ValidationFailure => "validation_failure",
        };
        f.write_str(name)
    }
}

/// Terminal result of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success {
        redirect_target: String,
    },
    Failure {
        category: ErrorCategory,
        message: String,
        hash: Option<TxHash>,
    },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            SubmissionOutcome::Failure { category, .. } => Some(*category),
            SubmissionOutcome::Success { .. } => None,
        }
    }
}

/// State observed by the presentation layer; written only by the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub loading: bool,
    pub error_message: Option<String>,
    pub hash: Option<TxHash>,
}

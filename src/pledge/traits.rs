// Traits for dependency injection - every collaborator of the workflow is
// injected so the submission flow can be driven deterministically in tests

use async_trait::async_trait;
use std::sync::Arc;

use super::errors::{BackendError, ChainError, MetadataError};
use super::types::{
    Address, ApplicationRecord, TokenAmount, TransactionReceipt, TxHash, WorkflowState,
};

/// Deposit-token contract binding
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TokenContract: Send + Sync {
    /// Ask the wallet to sign and broadcast `approve(spender, amount)`.
    /// Resolves with the transaction hash once broadcast.
    async fn approve(
        &self,
        spender: &Address,
        amount: TokenAmount,
        from: &Address,
    ) -> Result<TxHash, ChainError>;

    /// Wait until the transaction is included in a block. Gives up with a
    /// `ChainError` once the binding's block-wait window has passed.
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TransactionReceipt, ChainError>;
}

/// Backend persistence of the application mirror
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ApplicationRecordWriter: Send + Sync {
    async fn persist(&self, record: &ApplicationRecord) -> Result<(), BackendError>;
}

/// Kind of application form the organization uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationKind {
    Standard,
    Euma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMetadata {
    pub deposit_token_address: Address,
    pub application_kind: ApplicationKind,
}

/// Source of organization metadata (deposit token, application kind)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OrganizationMetadataSource: Send + Sync {
    async fn query(&self, organization: &Address) -> Result<OrganizationMetadata, MetadataError>;
}

/// Resolves a token binding for a deposit-token address
pub trait TokenBindingFactory: Send + Sync {
    fn token_contract(&self, token_address: &Address) -> Arc<dyn TokenContract>;
}

/// Receives every WorkflowState change, in order
pub trait StateObserver: Send + Sync {
    fn state_changed(&self, state: &WorkflowState);
}

// Two-stage approval protocol against the deposit token:
// Stage A broadcasts `approve`, Stage B waits for inclusion.

use std::sync::Arc;
use tracing::{debug, info};

use super::errors::ChainError;
use super::traits::TokenContract;
use super::types::{PledgeRequest, TransactionEvent, TransactionReceipt, TxHash};

#[derive(Clone)]
pub struct PledgeTransactionDriver {
    token: Arc<dyn TokenContract>,
}

impl PledgeTransactionDriver {
    pub fn new(token: Arc<dyn TokenContract>) -> Self {
        Self { token }
    }

    /// Start a submission attempt. Nothing touches the chain until the
    /// first call to [`TransactionHandle::next_event`].
    pub fn submit(&self, request: PledgeRequest) -> TransactionHandle {
        TransactionHandle {
            token: Arc::clone(&self.token),
            stage: Stage::Approval(request),
            hash: None,
            confirmed: false,
            receipt: None,
        }
    }
}

enum Stage {
    Approval(PledgeRequest),
    Confirmation(TxHash),
    Finished,
}

/// One attempt's on-chain transaction.
///
/// Yields at most one `HashAvailable`, then exactly one of `Confirmed` or
/// `Failed`, then `None` forever.
pub struct TransactionHandle {
    token: Arc<dyn TokenContract>,
    stage: Stage,
    hash: Option<TxHash>,
    confirmed: bool,
    receipt: Option<TransactionReceipt>,
}

impl TransactionHandle {
    pub async fn next_event(&mut self) -> Option<TransactionEvent> {
        // The stage is consumed up front; a dropped future leaves the handle finished.
        match std::mem::replace(&mut self.stage, Stage::Finished) {
            Stage::Approval(request) => {
                debug!(
                    spender = %request.organization_address(),
                    from = %request.applicant_address(),
                    amount = %request.amount(),
                    "Requesting token approval"
                );
                match self
                    .token
                    .approve(
                        request.organization_address(),
                        request.amount(),
                        request.applicant_address(),
                    )
                    .await
                {
                    Ok(hash) => {
                        info!(tx_hash = %hash, "Approval transaction broadcast");
                        self.hash = Some(hash.clone());
                        self.stage = Stage::Confirmation(hash.clone());
                        Some(TransactionEvent::HashAvailable(hash))
                    }
                    Err(error) => Some(TransactionEvent::Failed(error)),
                }
            }
            Stage::Confirmation(hash) => match self.token.wait_for_receipt(&hash).await {
                Ok(receipt) if receipt.succeeded() => {
                    info!(tx_hash = %hash, block = ?receipt.block_number, "Approval confirmed");
                    self.confirmed = true;
                    self.receipt = Some(receipt.clone());
                    Some(TransactionEvent::Confirmed(receipt))
                }
                Ok(receipt) => {
                    self.receipt = Some(receipt);
                    Some(TransactionEvent::Failed(ChainError::new(format!(
                        "Transaction {hash} has been reverted by the EVM"
                    ))))
                }
                Err(error) => Some(TransactionEvent::Failed(error)),
            },
            Stage::Finished => None,
        }
    }

    pub fn hash(&self) -> Option<&TxHash> {
        self.hash.as_ref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn receipt(&self) -> Option<&TransactionReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Finished)
    }
}

// Mock implementations for testing - no chain, no network

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::pledge::errors::{BackendError, ChainError};
use crate::pledge::traits::*;
use crate::pledge::types::*;

pub fn address(n: u8) -> Address {
    format!("0x{:040x}", n).parse().unwrap()
}

pub fn test_request(pledge: &str, shares: &str) -> PledgeRequest {
    PledgeRequest::from_form(&PledgeForm::new(pledge, shares), &address(0x1), &address(0x2), 18)
        .unwrap()
}

pub fn receipt_for(hash: &str, status: bool) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: TxHash::new(hash),
        block_number: Some(42),
        status,
        raw: serde_json::json!({ "transactionHash": hash }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    Approve {
        spender: Address,
        amount: TokenAmount,
        from: Address,
    },
    WaitForReceipt(TxHash),
}

/// Token binding that answers every call with a scripted result
#[derive(Debug)]
pub struct ScriptedTokenContract {
    approve_result: Result<TxHash, ChainError>,
    receipt_result: Result<TransactionReceipt, ChainError>,
    receipt_delay: Option<Duration>,
    calls: Mutex<Vec<TokenCall>>,
}

impl ScriptedTokenContract {
    pub fn with_receipt(hash: &str, receipt_result: Result<TransactionReceipt, ChainError>) -> Self {
        Self {
            approve_result: Ok(TxHash::new(hash)),
            receipt_result,
            receipt_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn confirming(hash: &str) -> Self {
        Self::with_receipt(hash, Ok(receipt_for(hash, true)))
    }

    pub fn rejecting_approval(error: ChainError) -> Self {
        Self {
            approve_result: Err(error),
            receipt_result: Err(ChainError::new("receipt must not be requested")),
            receipt_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_receipt_delay(mut self, delay: Duration) -> Self {
        self.receipt_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<TokenCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenContract for ScriptedTokenContract {
    async fn approve(
        &self,
        spender: &Address,
        amount: TokenAmount,
        from: &Address,
    ) -> Result<TxHash, ChainError> {
        self.calls.lock().unwrap().push(TokenCall::Approve {
            spender: spender.clone(),
            amount,
            from: from.clone(),
        });
        self.approve_result.clone()
    }

    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TransactionReceipt, ChainError> {
        self.calls
            .lock()
            .unwrap()
            .push(TokenCall::WaitForReceipt(hash.clone()));
        if let Some(delay) = self.receipt_delay {
            tokio::time::sleep(delay).await;
        }
        self.receipt_result.clone()
    }
}

/// Writer that records every persisted application
#[derive(Debug, Default)]
pub struct RecordingWriter {
    records: Mutex<Vec<ApplicationRecord>>,
    fail: bool,
    notify: Notify,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Wait until at least `count` records were persisted
    pub async fn wait_for_records(&self, count: usize) -> Vec<ApplicationRecord> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.notify.notified();
                if self.records.lock().unwrap().len() >= count {
                    break;
                }
                notified.await;
            }
        })
        .await
        .expect("timed out waiting for application records");
        self.records()
    }
}

#[async_trait]
impl ApplicationRecordWriter for RecordingWriter {
    async fn persist(&self, record: &ApplicationRecord) -> Result<(), BackendError> {
        self.records.lock().unwrap().push(record.clone());
        self.notify.notify_waiters();
        if self.fail {
            return Err(BackendError::Other("backend unavailable".to_string()));
        }
        Ok(())
    }
}

/// Writer whose backend never acknowledges
#[derive(Debug, Default)]
pub struct StalledWriter {
    started: Mutex<usize>,
    release: Notify,
}

impl StalledWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> usize {
        *self.started.lock().unwrap()
    }
}

#[async_trait]
impl ApplicationRecordWriter for StalledWriter {
    async fn persist(&self, _record: &ApplicationRecord) -> Result<(), BackendError> {
        *self.started.lock().unwrap() += 1;
        // Nothing ever notifies, so the write stays pending
        self.release.notified().await;
        Ok(())
    }
}

/// Observer that keeps every state it was shown
#[derive(Debug, Default)]
pub struct RecordingObserver {
    states: Mutex<Vec<WorkflowState>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<WorkflowState> {
        self.states.lock().unwrap().clone()
    }

    /// Number of loading true -> false transitions observed
    pub fn loading_drops(&self) -> usize {
        self.states()
            .windows(2)
            .filter(|pair| pair[0].loading && !pair[1].loading)
            .count()
    }
}

impl StateObserver for RecordingObserver {
    fn state_changed(&self, state: &WorkflowState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

/// Binding factory handing out one shared token contract
pub struct StaticTokenBindings {
    token: Arc<dyn TokenContract>,
    requested: Mutex<Vec<Address>>,
}

impl StaticTokenBindings {
    pub fn new(token: Arc<dyn TokenContract>) -> Self {
        Self {
            token,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_tokens(&self) -> Vec<Address> {
        self.requested.lock().unwrap().clone()
    }
}

impl TokenBindingFactory for StaticTokenBindings {
    fn token_contract(&self, token_address: &Address) -> Arc<dyn TokenContract> {
        self.requested.lock().unwrap().push(token_address.clone());
        Arc::clone(&self.token)
    }
}

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ChainConfig;
use crate::pledge::{
    Address, ChainError, TokenAmount, TokenBindingFactory, TokenContract, TransactionReceipt,
    TxHash,
};

/// `approve(address,uint256)`
const APPROVE_SELECTOR: &str = "095ea7b3";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
}

/// ERC-20 binding speaking Ethereum JSON-RPC to a wallet-backed node.
/// Signing is left to the node (`eth_sendTransaction`).
#[derive(Debug)]
pub struct JsonRpcTokenContract {
    client: reqwest::Client,
    rpc_url: String,
    token: Address,
    block_wait_window: u64,
    poll_interval: Duration,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcTokenContract {
    pub fn new(client: reqwest::Client, config: &ChainConfig, token: Address) -> Self {
        Self {
            client,
            rpc_url: config.rpc_url.clone(),
            token,
            block_wait_window: config.block_wait_window,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn token(&self) -> &Address {
        &self.token
    }

    /// Node query bounded by the configured request timeout
    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        self.send(method, params, Some(self.request_timeout)).await
    }

    async fn send(
        &self,
        method: &str,
        params: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "JSON-RPC request");
        let mut request = self.client.post(&self.rpc_url).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ChainError::new(format!("{method} request failed: {e}")))?;

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::new(format!("{method} returned an invalid response: {e}")))?;

        if let Some(error) = envelope.error {
            return Err(ChainError::with_code(error.code, error.message));
        }
        Ok(envelope.result)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        let value = self.call("eth_blockNumber", json!([])).await?;
        value
            .as_str()
            .and_then(parse_quantity)
            .ok_or_else(|| ChainError::new(format!("eth_blockNumber returned {value}")))
    }

    fn timeout_error(&self) -> ChainError {
        ChainError::new(format!(
            "Transaction was not mined within {} blocks, please make sure your transaction was properly sent. Be aware that it might still be mined!",
            self.block_wait_window
        ))
    }
}

#[async_trait]
impl TokenContract for JsonRpcTokenContract {
    async fn approve(
        &self,
        spender: &Address,
        amount: TokenAmount,
        from: &Address,
    ) -> Result<TxHash, ChainError> {
        let data = format!(
            "0x{APPROVE_SELECTOR}{}{}",
            spender.to_abi_word(),
            amount.to_abi_word()
        );
        let transaction = json!({
            "from": from.as_str(),
            "to": self.token.as_str(),
            "data": data,
        });

        // Unbounded: the node waits on the wallet user to sign
        let value = self
            .send("eth_sendTransaction", json!([transaction]), None)
            .await?;
        value
            .as_str()
            .map(TxHash::new)
            .ok_or_else(|| ChainError::new(format!("eth_sendTransaction returned {value}")))
    }

    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TransactionReceipt, ChainError> {
        let start_block = self.block_number().await?;

        loop {
            let value = self
                .call("eth_getTransactionReceipt", json!([hash.as_str()]))
                .await?;

            if !value.is_null() {
                let receipt: RpcReceipt = serde_json::from_value(value.clone())
                    .map_err(|e| ChainError::new(format!("invalid receipt for {hash}: {e}")))?;
                return Ok(TransactionReceipt {
                    transaction_hash: TxHash::new(receipt.transaction_hash),
                    block_number: receipt.block_number.as_deref().and_then(parse_quantity),
                    // Pre-Byzantium receipts carry no status
                    status: receipt.status.as_deref() != Some("0x0"),
                    raw: value,
                });
            }

            let current_block = self.block_number().await?;
            if current_block.saturating_sub(start_block) >= self.block_wait_window {
                warn!(tx_hash = %hash, start_block, current_block, "Gave up waiting for receipt");
                return Err(self.timeout_error());
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Creates JSON-RPC bindings sharing one HTTP client
#[derive(Debug, Clone)]
pub struct JsonRpcBindings {
    client: reqwest::Client,
    config: ChainConfig,
}

impl JsonRpcBindings {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl TokenBindingFactory for JsonRpcBindings {
    fn token_contract(&self, token_address: &Address) -> Arc<dyn TokenContract> {
        Arc::new(JsonRpcTokenContract::new(
            self.client.clone(),
            &self.config,
            token_address.clone(),
        ))
    }
}

fn parse_quantity(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}

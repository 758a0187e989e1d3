//! JSON-RPC plumbing for the deployment pipeline.

use std::time::{Duration, Instant};

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Timeout for a single RPC request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between polling attempts while waiting for a receipt or a
/// confirmation block.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum time to wait for a transaction to be mined and confirmed.
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(600);

/// A transaction receipt, reduced to the fields the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub block_number: u64,
    /// Set only for contract-creation transactions.
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub status: u64,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == 1
    }
}

/// Deserialize a u64 from a hex quantity string (with 0x prefix).
fn deserialize_quantity<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}

/// HTTP JSON-RPC client for the Ethereum node the run deploys through.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: Url,
}

impl RpcClient {
    pub fn new(url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Make a JSON-RPC call and deserialize the result.
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", method))?;

        let result: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = result.get("error") {
            anyhow::bail!(
                "RPC error from {}: {}",
                method,
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
            );
        }

        let result_value = result
            .get("result")
            .context("No result in response")?
            .clone();

        serde_json::from_value(result_value)
            .with_context(|| format!("Failed to deserialize {} result", method))
    }

    /// Accounts managed by the node. The first one signs every transaction
    /// of the run.
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", vec![]).await
    }

    pub async fn block_number(&self) -> Result<u64> {
        let hex: String = self.request("eth_blockNumber", vec![]).await?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .with_context(|| format!("Failed to parse block number '{}'", hex))
    }

    /// Submit a transaction signed by the node. A `to` of `None` is a
    /// contract creation.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Option<Address>,
        data: &Bytes,
    ) -> Result<B256> {
        let mut tx = serde_json::json!({
            "from": from,
            "data": data,
        });
        if let Some(to) = to {
            tx["to"] = serde_json::json!(to);
        }
        self.request("eth_sendTransaction", vec![tx]).await
    }

    pub async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", vec![serde_json::json!(tx_hash)])
            .await
    }

    /// Execute a read-only call against a contract.
    pub async fn call(&self, to: Address, data: &Bytes) -> Result<Bytes> {
        self.request(
            "eth_call",
            vec![
                serde_json::json!({ "to": to, "data": data }),
                serde_json::json!("latest"),
            ],
        )
        .await
    }

    /// Wait until `tx_hash` is mined, has not reverted, and has reached
    /// `confirmations` blocks (1 = just mined).
    pub async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        confirmations: u64,
    ) -> Result<TransactionReceipt> {
        let start = Instant::now();

        let receipt = loop {
            if start.elapsed() > CONFIRMATION_TIMEOUT {
                anyhow::bail!("Timed out waiting for transaction {} to be mined", tx_hash);
            }
            match self.transaction_receipt(tx_hash).await? {
                Some(receipt) => break receipt,
                None => {
                    tracing::trace!(tx_hash = %tx_hash, "Receipt not available yet, retrying...");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        };

        if !receipt.succeeded() {
            anyhow::bail!(
                "Transaction {} reverted in block {}",
                tx_hash,
                receipt.block_number
            );
        }

        let target_block = receipt.block_number + confirmations.saturating_sub(1);
        loop {
            let head = self.block_number().await?;
            if head >= target_block {
                break;
            }
            if start.elapsed() > CONFIRMATION_TIMEOUT {
                anyhow::bail!(
                    "Timed out waiting for {} confirmations of {}",
                    confirmations,
                    tx_hash
                );
            }
            tracing::trace!(
                tx_hash = %tx_hash,
                head,
                target_block,
                "Waiting for confirmations..."
            );
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_deserialization() {
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber": "0x1a4",
            "contractAddress": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "status": "0x1",
        }))
        .unwrap();

        assert_eq!(receipt.block_number, 420);
        assert!(receipt.succeeded());
        assert!(receipt.contract_address.is_some());
    }

    #[test]
    fn test_receipt_reverted_status() {
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0x2222222222222222222222222222222222222222222222222222222222222222",
            "blockNumber": "0x10",
            "contractAddress": null,
            "status": "0x0",
        }))
        .unwrap();

        assert!(!receipt.succeeded());
        assert!(receipt.contract_address.is_none());
    }

    #[test]
    fn test_quantity_deserialization_rejects_garbage() {
        let result: std::result::Result<TransactionReceipt, _> =
            serde_json::from_value(serde_json::json!({
                "transactionHash": "0x2222222222222222222222222222222222222222222222222222222222222222",
                "blockNumber": "not-a-number",
                "contractAddress": null,
                "status": "0x1",
            }));
        assert!(result.is_err());
    }
}

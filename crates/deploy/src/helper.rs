//! Thin wrapper around the chain: contract deployment and confirmed calls.
//!
//! Every transaction goes through [`DeploymentHelper::send_and_confirm`],
//! which blocks until the configured confirmation depth is reached, so the
//! orchestrator above stays a plain sequential pipeline.

use std::path::PathBuf;

use alloy_core::primitives::{Address, Bytes};
use alloy_core::sol_types::{SolCall, SolValue};
use anyhow::{Context, Result};

use crate::address_book::AddressBook;
use crate::artifacts::ContractArtifact;
use crate::config::DeployConfig;
use crate::contracts::{IOwnable, names};
use crate::rpc::RpcClient;

pub struct DeploymentHelper {
    rpc: RpcClient,
    artifacts_dir: PathBuf,
    output_file: PathBuf,
    confirmations: u64,
    /// The node account signing every transaction of the run.
    deployer: Address,
    book: AddressBook,
    /// Shared admin for all transparent proxies, deployed on first use.
    proxy_admin: Option<Address>,
}

impl DeploymentHelper {
    /// Bind a helper to the node behind `rpc`, signing as the node's first
    /// account.
    pub async fn new(rpc: RpcClient, artifacts_dir: PathBuf, config: &DeployConfig) -> Result<Self> {
        let accounts = rpc.accounts().await.context("Failed to list node accounts")?;
        let deployer = *accounts
            .first()
            .context("Node exposes no unlocked accounts to sign with")?;

        let book = AddressBook::load_or_default(&config.output_file)?;

        tracing::info!(
            deployer = %deployer,
            rpc_url = %rpc.url(),
            confirmations = config.tx_confirmations,
            "Deployment helper ready"
        );

        Ok(Self {
            rpc,
            artifacts_dir,
            output_file: config.output_file.clone(),
            confirmations: config.tx_confirmations,
            deployer,
            book,
            proxy_admin: None,
        })
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }

    /// Address of the shared proxy admin, if any upgradeable contract has
    /// been deployed this run.
    pub fn proxy_admin(&self) -> Option<Address> {
        self.proxy_admin
    }

    /// Deploy a plain contract from its artifact, with ABI-encoded
    /// constructor arguments appended to the creation bytecode.
    ///
    /// `label` is the name the deployment is recorded under; it differs from
    /// `contract` when the same artifact is deployed more than once.
    pub async fn deploy_contract(
        &mut self,
        contract: &str,
        label: &str,
        constructor_args: &[u8],
    ) -> Result<Address> {
        let artifact = ContractArtifact::load(&self.artifacts_dir, contract)?;
        let code = Bytes::from([artifact.bytecode.as_ref(), constructor_args].concat());
        self.deploy_raw(label, &code).await
    }

    /// Deploy a contract behind a transparent proxy and invoke its
    /// initializer through the proxy constructor.
    ///
    /// The first upgradeable deployment of a run also deploys the shared
    /// `ProxyAdmin`. The proxy address is what gets recorded under `label`
    /// and returned; the implementation is recorded alongside it.
    pub async fn deploy_upgradeable(
        &mut self,
        contract: &str,
        label: &str,
        init_calldata: Bytes,
    ) -> Result<Address> {
        let proxy_admin = match self.proxy_admin {
            Some(address) => address,
            None => {
                let address = self
                    .deploy_contract(names::PROXY_ADMIN, names::PROXY_ADMIN, &[])
                    .await
                    .context("Failed to deploy the shared proxy admin")?;
                self.proxy_admin = Some(address);
                address
            }
        };

        let implementation = self
            .deploy_contract(contract, &format!("{}Implementation", label), &[])
            .await
            .with_context(|| format!("Failed to deploy implementation for {}", label))?;

        let constructor_args =
            (implementation, proxy_admin, init_calldata).abi_encode_params();
        let proxy = self
            .deploy_contract(names::TRANSPARENT_PROXY, label, &constructor_args)
            .await
            .with_context(|| format!("Failed to deploy proxy for {}", label))?;

        Ok(proxy)
    }

    /// Submit a transaction from the deployer account and block until it
    /// reaches the configured confirmation depth.
    pub async fn send_and_confirm(&self, label: &str, to: Address, data: Bytes) -> Result<()> {
        tracing::debug!(label, to = %to, "Submitting transaction...");
        let tx_hash = self
            .rpc
            .send_transaction(self.deployer, Some(to), &data)
            .await
            .with_context(|| format!("Failed to submit transaction: {}", label))?;

        let receipt = self
            .rpc
            .wait_for_receipt(tx_hash, self.confirmations)
            .await
            .with_context(|| format!("Transaction failed: {}", label))?;

        tracing::info!(
            label,
            tx_hash = %receipt.transaction_hash,
            block = receipt.block_number,
            "Transaction confirmed"
        );
        Ok(())
    }

    /// Read the `owner()` of an Ownable contract.
    pub async fn owner_of(&self, contract: Address) -> Result<Address> {
        let data = Bytes::from(IOwnable::ownerCall {}.abi_encode());
        let raw = self
            .rpc
            .call(contract, &data)
            .await
            .with_context(|| format!("Failed to query owner of {}", contract))?;
        let owner = IOwnable::ownerCall::abi_decode_returns(&raw, true)
            .context("Failed to decode owner() return data")?;
        Ok(owner._0)
    }

    async fn deploy_raw(&mut self, label: &str, code: &Bytes) -> Result<Address> {
        tracing::info!(label, "Deploying contract...");
        let tx_hash = self
            .rpc
            .send_transaction(self.deployer, None, code)
            .await
            .with_context(|| format!("Failed to submit deployment of {}", label))?;

        let receipt = self
            .rpc
            .wait_for_receipt(tx_hash, self.confirmations)
            .await
            .with_context(|| format!("Deployment of {} failed", label))?;

        let address = receipt
            .contract_address
            .with_context(|| format!("Deployment receipt for {} carries no address", label))?;

        self.book.record(label, address);
        self.book.save(&self.output_file)?;

        tracing::info!(label, address = %address, "Contract deployed");
        Ok(address)
    }
}

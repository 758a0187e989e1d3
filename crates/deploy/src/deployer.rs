//! The deployment orchestrator: deploy, wire, hand over.
//!
//! The sequence is strictly sequential. Each phase awaits every transaction
//! of the previous one; on-chain nonce ordering and cross-step address
//! dependencies require it. Any failure aborts the remainder of the run.

use alloy_core::primitives::{Address, Bytes};
use alloy_core::sol_types::{SolCall, SolValue};
use anyhow::{Context, Result};
use comfy_table::Table;

use crate::config::DeployConfig;
use crate::contracts::{
    IChainlinkWrapper, ICustomOracleWrapper, IOwnable, IPriceFeed, ITwapOracleWrapper, names,
};
use crate::helper::DeploymentHelper;

/// Decimals registered for the primary asset on testnet runs.
///
/// Deliberately hardcoded instead of read from the token contract, to
/// exercise the custom wrapper with a mismatching value. Never used on the
/// mainnet path.
const TESTNET_PRIMARY_DECIMALS: u8 = 18;

/// Call payloads the custom wrapper issues against the testnet gOHM mock
/// oracle: current price, last price, and decimals. The last-update read is
/// disabled (empty payload).
const TESTNET_CURRENT_PRICE_CALL: [u8; 4] = [0x9d, 0x1b, 0x46, 0x4a];
const TESTNET_LAST_PRICE_CALL: [u8; 4] = [0x05, 0x3f, 0x14, 0xda];
const TESTNET_DECIMALS_CALL: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

/// Handles for the contracts deployed by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedContracts {
    pub verification: Address,
    pub price_feed: Address,
    pub custom_oracle: Address,
    pub chainlink_oracle: Address,
    pub twap_oracle: Address,
}

/// A configuration transaction waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub label: &'static str,
    pub to: Address,
    pub data: Bytes,
}

/// Orchestrates the full deployment: five contracts, the oracle wiring, and
/// the ownership handover to the configured admin.
pub struct Deployer {
    config: DeployConfig,
    helper: DeploymentHelper,
}

impl Deployer {
    pub fn new(config: DeployConfig, helper: DeploymentHelper) -> Self {
        Self { config, helper }
    }

    pub async fn run(mut self) -> Result<()> {
        self.config.validate()?;

        tracing::info!(
            testnet = self.config.is_testnet,
            admin = %self.config.admin_address,
            "Starting oracle suite deployment..."
        );

        let contracts = self.deploy_contracts().await?;
        self.configure_oracles(&contracts).await?;
        self.configure_price_feed(&contracts).await?;
        self.transfer_ownership(&contracts).await?;

        print_summary(&contracts, self.helper.proxy_admin());
        Ok(())
    }

    /// Phase 1: deploy the verification module, the aggregator, and the
    /// three wrappers, in dependency order.
    async fn deploy_contracts(&mut self) -> Result<DeployedContracts> {
        let verification = self
            .helper
            .deploy_upgradeable(names::ORACLE_VERIFICATION, names::ORACLE_VERIFICATION, Bytes::new())
            .await
            .context("Failed to deploy the oracle verification module")?;

        let price_feed = self
            .helper
            .deploy_upgradeable(
                names::PRICE_FEED,
                names::PRICE_FEED,
                IPriceFeed::setUpCall { verificator: verification }.abi_encode().into(),
            )
            .await
            .context("Failed to deploy the price feed aggregator")?;

        let custom_oracle = self
            .helper
            .deploy_upgradeable(
                names::CUSTOM_ORACLE_WRAPPER,
                names::CUSTOM_ORACLE_WRAPPER,
                ICustomOracleWrapper::setUpCall {}.abi_encode().into(),
            )
            .await
            .context("Failed to deploy the custom oracle wrapper")?;

        let chainlink_oracle = self
            .helper
            .deploy_upgradeable(
                names::CHAINLINK_WRAPPER,
                names::CHAINLINK_WRAPPER,
                IChainlinkWrapper::setUpCall {
                    flagSEQ: self.config.chainlink_seq_flag,
                    flagsContract: self.config.chainlink_flags_contract,
                }
                .abi_encode()
                .into(),
            )
            .await
            .context("Failed to deploy the Chainlink wrapper")?;

        // validate() has already established the twap section is present.
        let twap = self
            .config
            .twap
            .as_ref()
            .context("TWAP wrapper constructor parameters are missing")?;
        let twap_oracle = self
            .helper
            .deploy_contract(
                names::TWAP_ORACLE_WRAPPER,
                names::TWAP_ORACLE_WRAPPER,
                &(
                    twap.weth,
                    twap.chainlink_eth,
                    twap.chainlink_seq_flag,
                    twap.chainlink_flags_contract,
                )
                    .abi_encode_params(),
            )
            .await
            .context("Failed to deploy the TWAP oracle wrapper")?;

        Ok(DeployedContracts {
            verification,
            price_feed,
            custom_oracle,
            chainlink_oracle,
            twap_oracle,
        })
    }

    /// Phase 2: register the sub-oracles with the wrappers.
    async fn configure_oracles(&self, contracts: &DeployedContracts) -> Result<()> {
        tracing::info!("Registering sub-oracles with the wrappers...");
        for call in oracle_registrations(&self.config, contracts) {
            self.helper.send_and_confirm(call.label, call.to, call.data).await?;
        }
        Ok(())
    }

    /// Phase 3: point the aggregator at the wrappers for each asset.
    async fn configure_price_feed(&self, contracts: &DeployedContracts) -> Result<()> {
        tracing::info!("Registering assets with the price feed aggregator...");
        for call in price_feed_registrations(&self.config, contracts) {
            self.helper.send_and_confirm(call.label, call.to, call.data).await?;
        }
        Ok(())
    }

    /// Phase 4: hand every contract the deployer still owns to the admin
    /// address, then the shared proxy admin.
    async fn transfer_ownership(&self, contracts: &DeployedContracts) -> Result<()> {
        tracing::info!(admin = %self.config.admin_address, "Transferring ownership...");

        let owned: [(&'static str, Address); 3] = [
            ("price feed aggregator", contracts.price_feed),
            ("custom oracle wrapper", contracts.custom_oracle),
            ("chainlink wrapper", contracts.chainlink_oracle),
        ];

        let transfer_data: Bytes = IOwnable::transferOwnershipCall {
            newOwner: self.config.admin_address,
        }
        .abi_encode()
        .into();

        for (label, contract) in owned {
            let owner = self
                .helper
                .owner_of(contract)
                .await
                .with_context(|| format!("Failed to read owner of the {}", label))?;

            if owner == self.helper.deployer() {
                self.helper
                    .send_and_confirm(label, contract, transfer_data.clone())
                    .await
                    .with_context(|| format!("Failed to transfer ownership of the {}", label))?;
            } else {
                tracing::info!(label, owner = %owner, "Ownership already transferred, skipping");
            }
        }

        if let Some(proxy_admin) = self.helper.proxy_admin() {
            self.helper
                .send_and_confirm("proxy admin", proxy_admin, transfer_data)
                .await
                .context("Failed to transfer proxy admin ownership")?;
        }

        Ok(())
    }
}

/// The wrapper registration plan for a configuration.
///
/// Kept as data so the branching (testnet primary path, optional Dopex and
/// GMX modules) is checkable without a node.
fn oracle_registrations(config: &DeployConfig, contracts: &DeployedContracts) -> Vec<PendingCall> {
    let mut calls = Vec::new();

    if config.is_testnet {
        calls.push(PendingCall {
            label: "custom wrapper: gOHM (testnet)",
            to: contracts.custom_oracle,
            data: ICustomOracleWrapper::addOracleCall {
                token: config.gohm,
                externalOracle: config.gohm_chainlink.price_oracle,
                decimals: TESTNET_PRIMARY_DECIMALS,
                callCurrentPrice: Bytes::from_static(&TESTNET_CURRENT_PRICE_CALL),
                callLastPrice: Bytes::from_static(&TESTNET_LAST_PRICE_CALL),
                callLastUpdate: Bytes::new(),
                callDecimals: Bytes::from_static(&TESTNET_DECIMALS_CALL),
            }
            .abi_encode()
            .into(),
        });
    } else {
        calls.push(PendingCall {
            label: "chainlink wrapper: gOHM",
            to: contracts.chainlink_oracle,
            data: IChainlinkWrapper::addOracleCall {
                token: config.gohm,
                priceAggregator: config.gohm_chainlink.price_oracle,
                indexAggregator: config.gohm_chainlink.index_oracle,
            }
            .abi_encode()
            .into(),
        });
    }

    calls.push(PendingCall {
        label: "chainlink wrapper: native asset",
        to: contracts.chainlink_oracle,
        data: IChainlinkWrapper::addOracleCall {
            token: Address::ZERO,
            priceAggregator: config.eth_chainlink.price_oracle,
            indexAggregator: Address::ZERO,
        }
        .abi_encode()
        .into(),
    });

    calls.push(PendingCall {
        label: "chainlink wrapper: renBTC",
        to: contracts.chainlink_oracle,
        data: IChainlinkWrapper::addOracleCall {
            token: config.rent_btc,
            priceAggregator: config.btc_chainlink.price_oracle,
            indexAggregator: Address::ZERO,
        }
        .abi_encode()
        .into(),
    });

    if let (Some(dopex), Some(oracle)) = (config.dopex, config.dopex_oracle.as_ref()) {
        calls.push(PendingCall {
            label: "custom wrapper: Dopex push oracle",
            to: contracts.custom_oracle,
            data: ICustomOracleWrapper::addOracleCall {
                token: dopex,
                externalOracle: oracle.contract,
                decimals: oracle.decimals,
                callCurrentPrice: oracle.current_price_call.clone(),
                callLastPrice: oracle.last_price_call.clone(),
                callLastUpdate: oracle.last_update_call.clone(),
                callDecimals: oracle.decimals_call.clone(),
            }
            .abi_encode()
            .into(),
        });
    }

    if let Some(gmx) = &config.gmx {
        calls.push(PendingCall {
            label: "twap wrapper: GMX",
            to: contracts.twap_oracle,
            data: ITwapOracleWrapper::addOracleCall {
                token: gmx.token,
                pool: gmx.pool,
            }
            .abi_encode()
            .into(),
        });
    }

    calls
}

/// The aggregator registration plan: native asset, gOHM, and renBTC, all
/// answered by the Chainlink wrapper.
fn price_feed_registrations(
    config: &DeployConfig,
    contracts: &DeployedContracts,
) -> Vec<PendingCall> {
    let assets: [(&'static str, Address); 3] = [
        ("price feed: native asset", Address::ZERO),
        ("price feed: gOHM", config.gohm),
        ("price feed: renBTC", config.rent_btc),
    ];

    assets
        .into_iter()
        .map(|(label, token)| PendingCall {
            label,
            to: contracts.price_feed,
            data: IPriceFeed::addOracleCall {
                token,
                primaryOracle: contracts.chainlink_oracle,
                secondaryOracle: Address::ZERO,
            }
            .abi_encode()
            .into(),
        })
        .collect()
}

fn print_summary(contracts: &DeployedContracts, proxy_admin: Option<Address>) {
    let mut table = Table::new();
    table.set_header(vec!["Contract", "Address"]);
    table.add_row(vec![names::ORACLE_VERIFICATION.to_string(), contracts.verification.to_string()]);
    table.add_row(vec![names::PRICE_FEED.to_string(), contracts.price_feed.to_string()]);
    table.add_row(vec![names::CUSTOM_ORACLE_WRAPPER.to_string(), contracts.custom_oracle.to_string()]);
    table.add_row(vec![names::CHAINLINK_WRAPPER.to_string(), contracts.chainlink_oracle.to_string()]);
    table.add_row(vec![names::TWAP_ORACLE_WRAPPER.to_string(), contracts.twap_oracle.to_string()]);
    if let Some(proxy_admin) = proxy_admin {
        table.add_row(vec![names::PROXY_ADMIN.to_string(), proxy_admin.to_string()]);
    }

    tracing::info!("Deployment complete!");
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;

    fn contracts() -> DeployedContracts {
        DeployedContracts {
            verification: Address::repeat_byte(0x01),
            price_feed: Address::repeat_byte(0x02),
            custom_oracle: Address::repeat_byte(0x03),
            chainlink_oracle: Address::repeat_byte(0x04),
            twap_oracle: Address::repeat_byte(0x05),
        }
    }

    #[test]
    fn test_testnet_primary_registration_targets_custom_wrapper() {
        let config = DeployConfig::testnet();
        let plan = oracle_registrations(&config, &contracts());

        // Primary + native asset + renBTC; no optional modules on testnet.
        assert_eq!(plan.len(), 3);

        let primary = &plan[0];
        assert_eq!(primary.to, contracts().custom_oracle);
        let call = ICustomOracleWrapper::addOracleCall::abi_decode(&primary.data, true).unwrap();
        assert_eq!(call.decimals, TESTNET_PRIMARY_DECIMALS);
        assert_eq!(call.callCurrentPrice.as_ref(), &TESTNET_CURRENT_PRICE_CALL[..]);
        assert_eq!(call.callLastPrice.as_ref(), &TESTNET_LAST_PRICE_CALL[..]);
        assert!(call.callLastUpdate.is_empty());
        assert_eq!(call.callDecimals.as_ref(), &TESTNET_DECIMALS_CALL[..]);
    }

    #[test]
    fn test_mainnet_primary_registration_targets_chainlink_wrapper() {
        let config = DeployConfig::mainnet();
        let plan = oracle_registrations(&config, &contracts());

        let primary = &plan[0];
        assert_eq!(primary.to, contracts().chainlink_oracle);
        let call = IChainlinkWrapper::addOracleCall::abi_decode(&primary.data, true).unwrap();
        assert_eq!(call.token, config.gohm);
        assert_eq!(call.priceAggregator, config.gohm_chainlink.price_oracle);
        assert_eq!(call.indexAggregator, config.gohm_chainlink.index_oracle);
    }

    #[test]
    fn test_dopex_and_gmx_registered_iff_configured() {
        let mainnet = DeployConfig::mainnet();
        let plan = oracle_registrations(&mainnet, &contracts());
        // Primary + native + renBTC + Dopex + GMX.
        assert_eq!(plan.len(), 5);
        assert!(plan.iter().any(|c| c.label.contains("Dopex")));
        assert!(plan.iter().any(|c| c.label.contains("GMX")));

        let mut no_optionals = mainnet.clone();
        no_optionals.dopex = None;
        no_optionals.dopex_oracle = None;
        no_optionals.gmx = None;
        let plan = oracle_registrations(&no_optionals, &contracts());
        assert_eq!(plan.len(), 3);
        assert!(!plan.iter().any(|c| c.label.contains("Dopex")));
        assert!(!plan.iter().any(|c| c.label.contains("GMX")));
    }

    #[test]
    fn test_dopex_registration_carries_push_oracle_parameters() {
        let config = DeployConfig::mainnet();
        let plan = oracle_registrations(&config, &contracts());

        let dopex = plan.iter().find(|c| c.label.contains("Dopex")).unwrap();
        assert_eq!(dopex.to, contracts().custom_oracle);
        let call = ICustomOracleWrapper::addOracleCall::abi_decode(&dopex.data, true).unwrap();
        let oracle = config.dopex_oracle.as_ref().unwrap();
        assert_eq!(call.token, config.dopex.unwrap());
        assert_eq!(call.externalOracle, oracle.contract);
        assert_eq!(call.decimals, oracle.decimals);
        assert_eq!(call.callCurrentPrice, oracle.current_price_call);
        assert!(call.callLastUpdate.is_empty());
    }

    #[test]
    fn test_gmx_registration_targets_twap_wrapper() {
        let config = DeployConfig::mainnet();
        let plan = oracle_registrations(&config, &contracts());

        let gmx = plan.iter().find(|c| c.label.contains("GMX")).unwrap();
        assert_eq!(gmx.to, contracts().twap_oracle);
        let call = ITwapOracleWrapper::addOracleCall::abi_decode(&gmx.data, true).unwrap();
        assert_eq!(call.token, config.gmx.unwrap().token);
        assert_eq!(call.pool, config.gmx.unwrap().pool);
    }

    #[test]
    fn test_price_feed_registers_three_assets_through_chainlink_wrapper() {
        for config in [DeployConfig::mainnet(), DeployConfig::testnet()] {
            let plan = price_feed_registrations(&config, &contracts());
            assert_eq!(plan.len(), 3);

            for call in &plan {
                assert_eq!(call.to, contracts().price_feed);
                let decoded = IPriceFeed::addOracleCall::abi_decode(&call.data, true).unwrap();
                assert_eq!(decoded.primaryOracle, contracts().chainlink_oracle);
                assert_eq!(decoded.secondaryOracle, Address::ZERO);
            }

            let tokens: Vec<Address> = plan
                .iter()
                .map(|c| IPriceFeed::addOracleCall::abi_decode(&c.data, true).unwrap().token)
                .collect();
            assert_eq!(tokens, vec![Address::ZERO, config.gohm, config.rent_btc]);
        }
    }
}

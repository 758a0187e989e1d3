//! Per-network deployment configuration.
//!
//! A [`DeployConfig`] is built from one of the built-in network presets or
//! loaded from a TOML file, and stays read-only for the rest of the run.
//! The one exception is the testnet entry path, which backfills the
//! addresses of mock contracts deployed earlier in the same run.

use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, Bytes, address, bytes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Immutable per-run deployment settings.
///
/// Scalar fields come first so the TOML round-trip emits values before
/// tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Whether this run targets a testnet.
    pub is_testnet: bool,
    /// Path of the address book written after each deployment.
    pub output_file: PathBuf,
    /// Number of blocks a transaction must reach before the next step runs.
    pub tx_confirmations: u64,
    /// Chainlink sequencer uptime flag address.
    pub chainlink_seq_flag: Address,
    /// Chainlink flags contract address.
    pub chainlink_flags_contract: Address,
    /// Address receiving ownership of the deployed contracts.
    pub admin_address: Address,

    /// renBTC token address. Zero on testnet until the mock is deployed.
    pub rent_btc: Address,
    /// gOHM token address. Zero on testnet until the mock is deployed.
    pub gohm: Address,
    /// DPX token address. The Dopex registration is skipped when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dopex: Option<Address>,

    /// Chainlink ETH/USD feed.
    pub eth_chainlink: ChainlinkFeed,
    /// Chainlink BTC/USD feed.
    pub btc_chainlink: ChainlinkFeed,
    /// Chainlink gOHM feed (price + index).
    pub gohm_chainlink: ChainlinkFeed,

    /// Push-oracle parameters backing the Dopex registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dopex_oracle: Option<PushOracle>,
    /// Constructor parameters for the TWAP oracle wrapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twap: Option<TwapDeploy>,
    /// GMX token/pool pair registered against the TWAP wrapper.
    /// The registration is skipped when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmx: Option<TwapFeed>,
}

/// A Chainlink price source: the aggregator itself plus an optional index
/// aggregator (zero address when the asset has no index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainlinkFeed {
    pub price_oracle: Address,
    pub index_oracle: Address,
}

/// Parameters for registering an external push-based oracle with the custom
/// wrapper: the oracle contract, its decimals, and the raw call payloads the
/// wrapper issues against it. An empty payload disables that read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushOracle {
    pub contract: Address,
    pub decimals: u8,
    pub current_price_call: Bytes,
    pub last_price_call: Bytes,
    pub last_update_call: Bytes,
    pub decimals_call: Bytes,
}

/// Constructor parameters for the TWAP oracle wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapDeploy {
    pub weth: Address,
    pub chainlink_eth: Address,
    pub chainlink_seq_flag: Address,
    pub chainlink_flags_contract: Address,
}

/// A token/pool pair priced through the TWAP wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapFeed {
    pub token: Address,
    pub pool: Address,
}

impl DeployConfig {
    /// The Arbitrum mainnet deployment configuration.
    pub fn mainnet() -> Self {
        Self {
            is_testnet: false,
            output_file: PathBuf::from("mainnet_deployments.json"),
            tx_confirmations: 3,
            chainlink_seq_flag: address!("a438451D6458044c3c8CD2f6f31c91ac882A6d91"),
            chainlink_flags_contract: address!("3C14e07Edd0dC67442FA96f1Ec6999c57E810a83"),
            admin_address: address!("4A4651B31d747D1DdbDDADCF1b1E24a5f6dcc7b0"),
            rent_btc: address!("dbf31df14b66535af65aac99c32e9ea844e14501"),
            gohm: address!("8d9ba570d6cb60c7e3e0f31343efe75ab8e65fb1"),
            dopex: Some(address!("6C2C06790b3E3E3c38e12Ee22F8183b37a13EE55")),
            eth_chainlink: ChainlinkFeed {
                price_oracle: address!("639Fe6ab55C921f74e7fac1ee960C0B6293ba612"),
                index_oracle: Address::ZERO,
            },
            btc_chainlink: ChainlinkFeed {
                price_oracle: address!("6ce185860a4963106506C203335A2910413708e9"),
                index_oracle: Address::ZERO,
            },
            gohm_chainlink: ChainlinkFeed {
                price_oracle: address!("761aaeBf021F19F198D325D7979965D0c7C9e53b"),
                index_oracle: address!("48C4721354A3B29D80EF03C65E6644A37338a0B1"),
            },
            dopex_oracle: Some(PushOracle {
                contract: address!("252C07E0356d3B1a8cE273E39885b094053137b9"),
                decimals: 8,
                current_price_call: bytes!("e1aa6036"),
                last_price_call: bytes!("053f14da"),
                last_update_call: Bytes::new(),
                decimals_call: Bytes::new(),
            }),
            twap: Some(TwapDeploy {
                weth: address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
                chainlink_eth: address!("639Fe6ab55C921f74e7fac1ee960C0B6293ba612"),
                chainlink_seq_flag: address!("a438451D6458044c3c8CD2f6f31c91ac882A6d91"),
                chainlink_flags_contract: address!("3C14e07Edd0dC67442FA96f1Ec6999c57E810a83"),
            }),
            gmx: Some(TwapFeed {
                token: address!("fc5A1A6EB076a2C7aD06eD22C90d7E710E35ad0a"),
                pool: address!("80A9ae39310abf666A87C743d6ebBD0E8C42158E"),
            }),
        }
    }

    /// The Arbitrum testnet deployment configuration.
    ///
    /// Token addresses and the gOHM feed start out zero; the testnet entry
    /// path deploys mocks and backfills them before the orchestrator runs.
    pub fn testnet() -> Self {
        Self {
            is_testnet: true,
            output_file: PathBuf::from("testnet_deployments.json"),
            tx_confirmations: 1,
            chainlink_seq_flag: address!("a438451D6458044c3c8CD2f6f31c91ac882A6d91"),
            chainlink_flags_contract: address!("491B1dDA0A8fa069bbC1125133A975BF4e85a91b"),
            admin_address: address!("87209dc4B76b14B67BC5E5e5c0737E7d002a219c"),
            rent_btc: Address::ZERO,
            gohm: Address::ZERO,
            dopex: None,
            eth_chainlink: ChainlinkFeed {
                price_oracle: address!("5f0423B1a6935dc5596e7A24d98532b67A0AeFd8"),
                index_oracle: Address::ZERO,
            },
            btc_chainlink: ChainlinkFeed {
                price_oracle: address!("0c9973e7a27d00e656B9f153348dA46CaD70d03d"),
                index_oracle: Address::ZERO,
            },
            gohm_chainlink: ChainlinkFeed {
                price_oracle: Address::ZERO,
                index_oracle: Address::ZERO,
            },
            dopex_oracle: None,
            twap: Some(TwapDeploy {
                weth: Address::ZERO,
                chainlink_eth: address!("5f0423B1a6935dc5596e7A24d98532b67A0AeFd8"),
                chainlink_seq_flag: address!("a438451D6458044c3c8CD2f6f31c91ac882A6d91"),
                chainlink_flags_contract: address!("491B1dDA0A8fa069bbC1125133A975BF4e85a91b"),
            }),
            gmx: None,
        }
    }

    /// Check cross-field consistency before a run starts.
    ///
    /// The TWAP wrapper is always deployed, so its constructor parameters
    /// are required; a Dopex asset without its oracle parameters cannot be
    /// registered.
    pub fn validate(&self) -> Result<()> {
        if self.twap.is_none() {
            anyhow::bail!("TWAP wrapper constructor parameters (twap) are missing");
        }
        if self.dopex.is_some() && self.dopex_oracle.is_none() {
            anyhow::bail!("dopex asset is configured but dopex_oracle parameters are missing");
        }
        Ok(())
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deploy config to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_preset() {
        let config = DeployConfig::mainnet();
        assert!(!config.is_testnet);
        assert_eq!(config.tx_confirmations, 3);
        assert!(config.dopex.is_some());
        assert!(config.dopex_oracle.is_some());
        assert!(config.gmx.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testnet_preset_placeholders() {
        let config = DeployConfig::testnet();
        assert!(config.is_testnet);
        assert_eq!(config.tx_confirmations, 1);
        assert_eq!(config.rent_btc, Address::ZERO);
        assert_eq!(config.gohm, Address::ZERO);
        assert_eq!(config.gohm_chainlink.price_oracle, Address::ZERO);
        assert!(config.dopex.is_none());
        assert!(config.gmx.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dopex_without_oracle() {
        let mut config = DeployConfig::mainnet();
        config.dopex_oracle = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_twap() {
        let mut config = DeployConfig::testnet();
        config.twap = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        for config in [DeployConfig::mainnet(), DeployConfig::testnet()] {
            let content = toml::to_string_pretty(&config).unwrap();
            let parsed: DeployConfig = toml::from_str(&content).unwrap();
            assert_eq!(parsed, config);
        }
    }

    #[test]
    fn test_save_and_load_file_round_trip() {
        let dir = tempdir::TempDir::new("feedstack-config").unwrap();
        let path = dir.path().join("custom-network.toml");

        let config = DeployConfig::mainnet();
        config.save_to_file(&path).unwrap();

        let loaded = DeployConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = DeployConfig::load_from_file(Path::new("/nonexistent/net.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/net.toml"));
    }
}

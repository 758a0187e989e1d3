//! feedstack is a CLI tool that deploys the price-oracle contract suite and
//! wires it together in one run.

mod cli;

use std::io::Write;

use alloy_core::primitives::{Address, U256};
use alloy_core::sol_types::SolCall;
use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Network};
use feedstack_deploy::contracts::{IMockERC20, IMockOracle, names};
use feedstack_deploy::{ChainlinkFeed, DeployConfig, Deployer, DeploymentHelper, RpcClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let mut config = match &cli.config {
        Some(path) => DeployConfig::load_from_file(path)?,
        None => match cli.network {
            Network::Mainnet => DeployConfig::mainnet(),
            Network::Testnet => DeployConfig::testnet(),
        },
    };

    if !config.is_testnet && !cli.yes {
        if !confirm_mainnet_deployment()? {
            tracing::info!("User cancelled the deployment");
            return Ok(());
        }
        tracing::info!("User approved the deployment");
    }

    let rpc = RpcClient::new(cli.rpc_url.clone())?;
    let mut helper = DeploymentHelper::new(rpc, cli.artifacts.clone(), &config).await?;

    if config.is_testnet {
        bootstrap_testnet_mocks(&mut helper, &mut config).await?;
    }

    Deployer::new(config, helper).run().await?;

    Ok(())
}

/// Ask for an explicit go-ahead on stdin. Anything but `y` cancels.
fn confirm_mainnet_deployment() -> Result<bool> {
    print!("You are about to deploy on the mainnet, is it fine? [y/N] ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation answer")?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Deploy the mock tokens and the mock gOHM oracle a testnet run wires
/// against, and backfill their addresses into the configuration.
async fn bootstrap_testnet_mocks(
    helper: &mut DeploymentHelper,
    config: &mut DeployConfig,
) -> Result<()> {
    tracing::info!("Deploying testnet mocks...");

    let gohm_token = helper
        .deploy_upgradeable(
            names::MOCK_ERC20,
            "gohm",
            IMockERC20::setUpCall {
                name: "gohm".to_string(),
                symbol: "gohm".to_string(),
                decimals: 18,
            }
            .abi_encode()
            .into(),
        )
        .await
        .context("Failed to deploy the mock gOHM token")?;

    let btc_token = helper
        .deploy_upgradeable(
            names::MOCK_ERC20,
            "btc",
            IMockERC20::setUpCall {
                name: "btc".to_string(),
                symbol: "btc".to_string(),
                decimals: 8,
            }
            .abi_encode()
            .into(),
        )
        .await
        .context("Failed to deploy the mock BTC token")?;

    let gohm_oracle = helper
        .deploy_contract(names::MOCK_ORACLE, "gohmOracle", &[])
        .await
        .context("Failed to deploy the mock gOHM oracle")?;

    helper
        .send_and_confirm(
            "mock gOHM oracle setUp",
            gohm_oracle,
            IMockOracle::setUpCall {
                price: U256::from(2_735_860_000_000u64),
                lastPrice: U256::from(2_735_860_000_000u64),
                decimals: 9,
            }
            .abi_encode()
            .into(),
        )
        .await?;

    config.rent_btc = btc_token;
    config.gohm = gohm_token;
    config.gohm_chainlink = ChainlinkFeed {
        price_oracle: gohm_oracle,
        index_oracle: Address::ZERO,
    };

    tracing::info!(
        gohm = %gohm_token,
        btc = %btc_token,
        gohm_oracle = %gohm_oracle,
        "Testnet mocks deployed and backfilled into the configuration"
    );

    Ok(())
}

use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Target network for a deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Network {
    Mainnet,
    Testnet,
}

#[derive(Parser)]
#[command(name = "feedstack")]
#[command(
    author,
    version,
    about = "Deploy and wire the price-oracle contract suite"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "FEEDSTACK_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The network preset to deploy.
    ///
    /// A mainnet run asks for confirmation on stdin before touching the
    /// chain; a testnet run first deploys mock tokens and a mock gOHM
    /// oracle and wires the suite against them.
    #[arg(long, env = "FEEDSTACK_NETWORK", default_value_t = Network::Testnet)]
    pub network: Network,

    /// The URL of the JSON-RPC endpoint to deploy through.
    ///
    /// The node's first unlocked account signs every transaction.
    #[arg(long, alias = "rpc", env = "FEEDSTACK_RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: Url,

    /// Directory containing the compiled contract artifacts (<Name>.json).
    #[arg(long, env = "FEEDSTACK_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Path to a TOML deployment configuration to use instead of the
    /// built-in network preset.
    #[arg(long, alias = "conf", env = "FEEDSTACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the interactive confirmation gate on mainnet deployments.
    #[arg(short = 'y', long, env = "FEEDSTACK_YES")]
    pub yes: bool,
}

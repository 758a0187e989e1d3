//! feedstack-deploy - Deployment library for the price-oracle suite.
//!
//! This crate deploys the oracle verification module, the price-feed
//! aggregator and the oracle wrappers, registers the sub-oracles with them,
//! and hands ownership of everything to the configured admin address.

mod address_book;
mod artifacts;
pub mod config;
pub mod contracts;
mod deployer;
mod helper;
mod rpc;

pub use address_book::AddressBook;
pub use artifacts::ContractArtifact;
pub use config::{ChainlinkFeed, DeployConfig, PushOracle, TwapDeploy, TwapFeed};
pub use deployer::{DeployedContracts, Deployer, PendingCall};
pub use helper::DeploymentHelper;
pub use rpc::{RpcClient, TransactionReceipt};

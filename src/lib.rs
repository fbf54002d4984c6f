// Regtest transaction orchestrator
// Wallet provisioning, funding, transfer and reconciliation against a regtest node

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod reconcile;
pub mod report;
pub mod rpc;
pub mod wallet;

// Re-exports for convenience
pub use cli::{Cli, CliHandler, Commands, Options};
pub use config::Config;
pub use crate::core::{Hash256, TransactionRecord};
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
pub use rpc::{Connect, Endpoint, HttpConnector, NodeClient, RpcError, RpcErrorKind, Transport, WalletClient};

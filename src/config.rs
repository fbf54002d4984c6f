// Run configuration

use crate::error::{Error, Result};
use crate::rpc::Endpoint;
use bitcoincore_rpc::bitcoin::{Amount, Denomination};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a run needs, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// General (non-wallet) endpoint
    pub endpoint: Endpoint,
    pub miner_wallet: String,
    pub trader_wallet: String,
    pub amount: Amount,
    pub output: PathBuf,
    pub max_mining_blocks: u64,
}

/// Raw settings before validation
#[derive(Debug, Clone)]
pub struct Settings {
    pub rpc_host: String,
    pub rpc_port: u16,
    pub rpc_user: String,
    pub rpc_password: String,
    pub rpc_timeout_secs: u64,
    pub miner_wallet: String,
    pub trader_wallet: String,
    pub amount: Amount,
    pub output: PathBuf,
    pub max_mining_blocks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 18443,
            rpc_user: "alice".to_string(),
            rpc_password: "password".to_string(),
            rpc_timeout_secs: 30,
            miner_wallet: "Miner".to_string(),
            trader_wallet: "Trader".to_string(),
            amount: Amount::from_sat(20 * 100_000_000),
            output: PathBuf::from("../out.txt"),
            max_mining_blocks: 200,
        }
    }
}

impl Config {
    pub fn from_settings(settings: Settings) -> Result<Self> {
        if settings.rpc_host.is_empty() {
            return Err(Error::Config("RPC host must not be empty".to_string()));
        }
        if settings.rpc_port == 0 {
            return Err(Error::Config("RPC port must not be 0".to_string()));
        }
        if settings.rpc_timeout_secs == 0 {
            return Err(Error::Config("RPC timeout must be at least one second".to_string()));
        }
        for name in [&settings.miner_wallet, &settings.trader_wallet] {
            validate_wallet_name(name)?;
        }
        if settings.miner_wallet == settings.trader_wallet {
            return Err(Error::Config(format!(
                "Miner and trader wallets must differ, both are {:?}",
                settings.miner_wallet
            )));
        }
        if settings.amount == Amount::ZERO {
            return Err(Error::Config("Send amount must be positive".to_string()));
        }
        if settings.max_mining_blocks == 0 {
            return Err(Error::Config("Mining budget must be at least one block".to_string()));
        }

        Ok(Self {
            endpoint: Endpoint {
                host: settings.rpc_host,
                port: settings.rpc_port,
                user: settings.rpc_user,
                password: settings.rpc_password,
                timeout: Duration::from_secs(settings.rpc_timeout_secs),
                wallet: None,
            },
            miner_wallet: settings.miner_wallet,
            trader_wallet: settings.trader_wallet,
            amount: settings.amount,
            output: settings.output,
            max_mining_blocks: settings.max_mining_blocks,
        })
    }
}

// Names end up in the URL path
fn validate_wallet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config("Wallet name must not be empty".to_string()));
    }
    if name.chars().any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace()) {
        return Err(Error::Config(format!("Wallet name {:?} is not usable in a URL", name)));
    }
    Ok(())
}

/// Parse a BTC amount such as `20` or `0.5`
pub fn parse_btc(s: &str) -> std::result::Result<Amount, String> {
    Amount::from_str_in(s, Denomination::Bitcoin).map_err(|e| format!("Invalid BTC amount {:?}: {}", s, e))
}

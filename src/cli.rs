// CLI commands

use crate::config::{parse_btc, Config, Settings};
use crate::core::{format_btc, Hash256, TransactionRecord};
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::rpc::Connect;
use bitcoincore_rpc::bitcoin::Amount;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "regtest-orchestrator")]
#[command(about = "Scripted wallet, mining and transfer workflow against a regtest node", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision wallets, fund, send, confirm and write the report
    Run,

    /// Get blockchain info
    Info,

    /// Create or load both wallets
    Provision,

    /// Reconcile a confirmed transfer from the miner wallet and write its report
    Report {
        /// Transaction id
        txid: String,
        /// Address the transfer paid
        #[arg(short, long)]
        destination: String,
    },
}

/// Connection and workflow options; each has an environment fallback
#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Node RPC host
    #[arg(long, env = "RPC_HOST", default_value = "127.0.0.1", global = true)]
    pub rpc_host: String,

    /// Node RPC port
    #[arg(long, env = "RPC_PORT", default_value_t = 18443, global = true)]
    pub rpc_port: u16,

    /// RPC user name
    #[arg(long, env = "RPC_USER", default_value = "alice", global = true)]
    pub rpc_user: String,

    /// RPC password
    #[arg(long, env = "RPC_PASSWORD", default_value = "password", hide_env_values = true, global = true)]
    pub rpc_password: String,

    /// Per-call RPC timeout in seconds
    #[arg(long, env = "RPC_TIMEOUT", default_value_t = 30, global = true)]
    pub rpc_timeout: u64,

    /// Wallet that mines and sends
    #[arg(long, env = "MINER_WALLET", default_value = "Miner", global = true)]
    pub miner_wallet: String,

    /// Wallet that receives
    #[arg(long, env = "TRADER_WALLET", default_value = "Trader", global = true)]
    pub trader_wallet: String,

    /// Amount to send, in BTC
    #[arg(long, env = "SEND_AMOUNT", default_value = "20", value_parser = parse_btc, global = true)]
    pub amount: Amount,

    /// Report destination
    #[arg(short, long, env = "REPORT_PATH", default_value = "../out.txt", global = true)]
    pub output: PathBuf,

    /// Give up if the miner wallet has nothing spendable after this many blocks
    #[arg(long, env = "MAX_MINING_BLOCKS", default_value_t = 200, global = true)]
    pub max_mining_blocks: u64,
}

impl Options {
    pub fn into_config(self) -> Result<Config> {
        Config::from_settings(Settings {
            rpc_host: self.rpc_host,
            rpc_port: self.rpc_port,
            rpc_user: self.rpc_user,
            rpc_password: self.rpc_password,
            rpc_timeout_secs: self.rpc_timeout,
            miner_wallet: self.miner_wallet,
            trader_wallet: self.trader_wallet,
            amount: self.amount,
            output: self.output,
            max_mining_blocks: self.max_mining_blocks,
        })
    }
}

/// CLI handler
pub struct CliHandler<C: Connect> {
    orchestrator: Orchestrator<C>,
}

impl<C: Connect> CliHandler<C> {
    /// Create a new CLI handler
    pub fn new(connector: C, config: Config) -> Self {
        Self {
            orchestrator: Orchestrator::new(connector, config),
        }
    }

    /// Handle CLI command
    pub fn handle(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Run => {
                let record = self.orchestrator.run()?;
                println!("Process completed successfully!");
                self.print_summary(&record);
                Ok(())
            }
            Commands::Info => self.info(),
            Commands::Provision => {
                self.orchestrator.provision()?;
                Ok(())
            }
            Commands::Report { txid, destination } => {
                let txid = txid
                    .parse::<Hash256>()
                    .map_err(|e| crate::error::Error::Config(format!("Invalid txid: {}", e)))?;
                let record = self.orchestrator.report(&txid, &destination)?;
                self.print_summary(&record);
                Ok(())
            }
        }
    }

    /// Get blockchain info
    fn info(&self) -> Result<()> {
        let info = self.orchestrator.info()?;

        println!("Blockchain Info:");
        println!("  Node: {}", self.orchestrator.config().endpoint);
        println!("  Chain: {}", info.chain);
        println!("  Height: {}", info.blocks);
        println!("  Best block: {}", info.bestblockhash);

        Ok(())
    }

    /// Print transaction summary
    fn print_summary(&self, record: &TransactionRecord) {
        println!();
        println!("=== TRANSACTION SUMMARY ===");
        println!("Transaction ID: {}", record.txid);
        println!("Miner Input: {} ({} BTC)", record.input_address, format_btc(record.input_amount));
        println!("Trader Output: {} ({} BTC)", record.trader_address, format_btc(record.trader_amount));
        println!("Miner Change: {} ({} BTC)", record.change_address, format_btc(record.change_amount));
        println!("Transaction Fee: {} BTC", format_btc(record.fee));
        println!("Confirmed in block {}: {}", record.block_height, record.block_hash);
    }
}

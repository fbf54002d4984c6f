// The scripted regtest workflow

use crate::config::Config;
use crate::core::{format_btc, Hash256, TransactionRecord};
use crate::error::{Error, Result};
use crate::reconcile::Reconciler;
use crate::report::write_report;
use crate::rpc::{BlockchainInfo, Connect, NodeClient, WalletClient};
use crate::wallet::{confirm, ensure_wallet, inspect_mempool, mine_until_spendable, send, Provisioned};

const MINING_LABEL: &str = "Mining Reward";
const RECEIVING_LABEL: &str = "Received";

/// Drives one node through the workflow
pub struct Orchestrator<C: Connect> {
    connector: C,
    config: Config,
}

impl<C: Connect> Orchestrator<C> {
    pub fn new(connector: C, config: Config) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn node(&self) -> Result<NodeClient<C::Transport>> {
        let transport = self
            .connector
            .connect(&self.config.endpoint)
            .map_err(|e| Error::rpc(format!("connect {}", self.config.endpoint), e))?;
        Ok(NodeClient::new(transport))
    }

    fn wallet(&self, name: &str) -> Result<WalletClient<C::Transport>> {
        let endpoint = self.config.endpoint.for_wallet(name);
        let transport = self
            .connector
            .connect(&endpoint)
            .map_err(|e| Error::rpc(format!("connect {}", endpoint), e))?;
        Ok(WalletClient::new(name, transport))
    }

    /// Chain status snapshot
    pub fn info(&self) -> Result<BlockchainInfo> {
        self.node()?
            .get_blockchain_info()
            .map_err(|e| Error::rpc("getblockchaininfo", e))
    }

    /// Ensure both wallets are loaded
    pub fn provision(&self) -> Result<Vec<(String, Provisioned)>> {
        let node = self.node()?;
        self.provision_with(&node)
    }

    fn provision_with(&self, node: &NodeClient<C::Transport>) -> Result<Vec<(String, Provisioned)>> {
        let mut outcomes = Vec::new();
        for name in [&self.config.miner_wallet, &self.config.trader_wallet] {
            let outcome = ensure_wallet(node, name)?;
            println!("{} wallet {}", name, outcome);
            outcomes.push((name.clone(), outcome));
        }
        Ok(outcomes)
    }

    /// Run every step and write the report
    pub fn run(&self) -> Result<TransactionRecord> {
        let node = self.node()?;

        let info = node
            .get_blockchain_info()
            .map_err(|e| Error::rpc("getblockchaininfo", e))?;
        println!(
            "Blockchain Info: chain={}, blocks={}, best block={}",
            info.chain, info.blocks, info.bestblockhash
        );

        self.provision_with(&node)?;
        let miner = self.wallet(&self.config.miner_wallet)?;
        let trader = self.wallet(&self.config.trader_wallet)?;

        let mining_address = miner
            .get_new_address(MINING_LABEL)
            .map_err(|e| Error::rpc(format!("getnewaddress {}", miner.name()), e))?;
        println!("Miner mining address: {}", mining_address);

        println!("Mining blocks to generate spendable balance...");
        let funding = mine_until_spendable(&node, &miner, &mining_address, self.config.max_mining_blocks)?;
        println!(
            "Final {} wallet balance: {} BTC after {} blocks",
            miner.name(),
            format_btc(funding.balance),
            funding.blocks_mined
        );

        let trader_address = trader
            .get_new_address(RECEIVING_LABEL)
            .map_err(|e| Error::rpc(format!("getnewaddress {}", trader.name()), e))?;
        println!("Trader receiving address: {}", trader_address);

        println!(
            "Sending {} BTC from {} to {}...",
            format_btc(self.config.amount),
            miner.name(),
            trader.name()
        );
        let txid = send(&miner, &trader_address, self.config.amount)?;
        println!("Transaction sent with TXID: {}", txid);

        println!("Fetching transaction from mempool...");
        inspect_mempool(&node, &txid);

        println!("Mining 1 block to confirm the transaction...");
        let block = confirm(&node, &mining_address)?;
        println!("Transaction confirmed in block: {}", block);

        println!("Extracting transaction details...");
        let record = Reconciler::new(&node, &miner).reconcile(&txid, &trader_address)?;

        write_report(&self.config.output, &record)?;
        println!("Transaction details written to {}", self.config.output.display());

        Ok(record)
    }

    /// Reconcile an already confirmed transfer from the miner wallet and
    /// write its report
    pub fn report(&self, txid: &Hash256, destination: &str) -> Result<TransactionRecord> {
        let node = self.node()?;
        let miner = self.wallet(&self.config.miner_wallet)?;

        let record = Reconciler::new(&node, &miner).reconcile(txid, destination)?;
        write_report(&self.config.output, &record)?;
        println!("Transaction details written to {}", self.config.output.display());

        Ok(record)
    }
}

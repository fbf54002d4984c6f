// In-process regtest node used by the tests
//
// Models just enough of a node for the workflow: a wallet registry that
// answers with real error codes, coinbase maturity, naive coin selection
// with change, a mempool, and an optional transaction index.

use crate::core::Hash256;
use crate::rpc::{codes, Connect, Endpoint, NodeClient, RpcError, Transport, WalletClient};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

pub const COIN: u64 = 100_000_000;
const SUBSIDY: u64 = 50 * COIN;
/// What every send pays, 141 vbytes at 10 sat/vB
pub const SEND_FEE: u64 = 1_410;

const RPC_WALLET_INSUFFICIENT_FUNDS: i32 = -6;
const RPC_INVALID_PARAMETER: i32 = -8;
const RPC_WALLET_NOT_SPECIFIED: i32 = -19;

#[derive(Debug, Clone)]
pub struct MockSettings {
    /// Confirmations a coinbase output needs on top of its own block
    pub maturity: u64,
    /// Whether confirmed transactions can be looked up without a block hash
    pub txindex: bool,
    /// Put the change output before the payment
    pub change_first: bool,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            maturity: 100,
            txindex: true,
            change_first: false,
        }
    }
}

#[derive(Debug, Clone)]
struct MockTx {
    /// Empty for coinbase
    inputs: Vec<(Hash256, u32)>,
    outputs: Vec<(String, u64)>,
    height: Option<u64>,
}

impl MockTx {
    fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }
}

struct Chain {
    settings: MockSettings,
    blocks: Vec<Hash256>,
    txs: HashMap<Hash256, MockTx>,
    tx_order: Vec<Hash256>,
    mempool: Vec<Hash256>,
    spent: HashSet<(Hash256, u32)>,
    wallets_on_disk: Vec<String>,
    loaded: HashSet<String>,
    owners: HashMap<String, String>,
    counter: u64,
    calls: Vec<(Option<String>, String)>,
    failures: HashMap<String, RpcError>,
    overrides: HashMap<Hash256, MockTx>,
}

/// Shared handle on a simulated node
#[derive(Clone)]
pub struct MockNode {
    chain: Rc<RefCell<Chain>>,
}

impl MockNode {
    /// Node at height 0 with no wallets
    pub fn new(settings: MockSettings) -> Self {
        let mut chain = Chain {
            settings,
            blocks: Vec::new(),
            txs: HashMap::new(),
            tx_order: Vec::new(),
            mempool: Vec::new(),
            spent: HashSet::new(),
            wallets_on_disk: Vec::new(),
            loaded: HashSet::new(),
            owners: HashMap::new(),
            counter: 0,
            calls: Vec::new(),
            failures: HashMap::new(),
            overrides: HashMap::new(),
        };
        let genesis = chain.next_hash("genesis");
        chain.blocks.push(genesis);

        Self {
            chain: Rc::new(RefCell::new(chain)),
        }
    }

    pub fn regtest() -> Self {
        Self::new(MockSettings::default())
    }

    pub fn height(&self) -> u64 {
        self.chain.borrow().tip_height()
    }

    pub fn block_hash(&self, height: u64) -> Hash256 {
        self.chain.borrow().blocks[height as usize]
    }

    /// Wallet files the node knows about
    pub fn wallet_count(&self) -> usize {
        self.chain.borrow().wallets_on_disk.len()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.chain.borrow().loaded.contains(name)
    }

    /// Pretend a wallet file exists from an earlier run
    pub fn add_wallet_file(&self, name: &str) {
        self.chain.borrow_mut().wallets_on_disk.push(name.to_string());
    }

    pub fn calls(&self, method: &str) -> usize {
        self.chain
            .borrow()
            .calls
            .iter()
            .filter(|(_, m)| m == method)
            .count()
    }

    /// Make the next `method` call fail with `err`
    pub fn fail_next(&self, method: &str, err: RpcError) {
        self.chain.borrow_mut().failures.insert(method.to_string(), err);
    }

    /// Replace what `getrawtransaction` reports for `txid`
    pub fn override_outputs(&self, txid: &Hash256, outputs: Vec<(String, u64)>) {
        let mut chain = self.chain.borrow_mut();
        if let Some(tx) = chain.txs.get(txid).cloned() {
            chain.overrides.insert(*txid, MockTx { outputs, ..tx });
        }
    }
}

/// Endpoint with the usual regtest defaults
pub fn endpoint() -> Endpoint {
    Endpoint {
        host: "127.0.0.1".to_string(),
        port: 18443,
        user: "alice".to_string(),
        password: "password".to_string(),
        timeout: Duration::from_secs(30),
        wallet: None,
    }
}

impl MockNode {
    pub fn node_client(&self) -> NodeClient<MockTransport> {
        NodeClient::new(MockTransport {
            chain: Rc::clone(&self.chain),
            wallet: None,
        })
    }

    pub fn wallet_client(&self, name: &str) -> WalletClient<MockTransport> {
        WalletClient::new(
            name,
            MockTransport {
                chain: Rc::clone(&self.chain),
                wallet: Some(name.to_string()),
            },
        )
    }
}

impl Connect for MockNode {
    type Transport = MockTransport;

    fn connect(&self, endpoint: &Endpoint) -> Result<MockTransport, RpcError> {
        Ok(MockTransport {
            chain: Rc::clone(&self.chain),
            wallet: endpoint.wallet.clone(),
        })
    }
}

pub struct MockTransport {
    chain: Rc<RefCell<Chain>>,
    wallet: Option<String>,
}

impl Transport for MockTransport {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        let mut chain = self.chain.borrow_mut();
        chain.calls.push((self.wallet.clone(), method.to_string()));
        if let Some(err) = chain.failures.remove(method) {
            return Err(err);
        }
        chain.dispatch(self.wallet.as_deref(), method, params)
    }
}

fn btc(sats: u64) -> Value {
    json!(sats as f64 / COIN as f64)
}

fn str_param<'a>(params: &'a [Value], i: usize) -> Result<&'a str, RpcError> {
    params
        .get(i)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::node(RPC_INVALID_PARAMETER, format!("param {} must be a string", i)))
}

fn hash_param(params: &[Value], i: usize) -> Result<Hash256, RpcError> {
    Hash256::from_hex(str_param(params, i)?).map_err(|e| RpcError::node(RPC_INVALID_PARAMETER, e))
}

fn u64_param(params: &[Value], i: usize) -> Result<u64, RpcError> {
    params
        .get(i)
        .and_then(Value::as_u64)
        .ok_or_else(|| RpcError::node(RPC_INVALID_PARAMETER, format!("param {} must be a number", i)))
}

impl Chain {
    fn dispatch(&mut self, wallet: Option<&str>, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        match method {
            "getblockchaininfo" => Ok(json!({
                "chain": "regtest",
                "blocks": self.tip_height(),
                "bestblockhash": self.blocks[self.blocks.len() - 1],
            })),
            "loadwallet" => self.load_wallet(str_param(params, 0)?),
            "createwallet" => self.create_wallet(str_param(params, 0)?),
            "generatetoaddress" => {
                let count = u64_param(params, 0)?;
                let address = str_param(params, 1)?.to_string();
                let hashes: Vec<Value> = (0..count).map(|_| json!(self.mine_block(&address))).collect();
                Ok(Value::Array(hashes))
            }
            "getmempoolentry" => self.mempool_entry(&hash_param(params, 0)?),
            "getrawtransaction" => {
                let block = match params.get(2) {
                    Some(_) => Some(hash_param(params, 2)?),
                    None => None,
                };
                self.raw_transaction(&hash_param(params, 0)?, block)
            }
            "getblockcount" => Ok(json!(self.tip_height())),
            "getblockhash" => {
                let height = u64_param(params, 0)?;
                self.blocks
                    .get(height as usize)
                    .map(|h| json!(h))
                    .ok_or_else(|| RpcError::node(RPC_INVALID_PARAMETER, "Block height out of range"))
            }
            "getnewaddress" | "getbalance" | "sendtoaddress" | "gettransaction" => {
                let name = self.wallet_scope(wallet)?;
                match method {
                    "getnewaddress" => Ok(json!(self.new_address(&name))),
                    "getbalance" => Ok(btc(self.balance(&name))),
                    "sendtoaddress" => {
                        let address = str_param(params, 0)?.to_string();
                        let amount = params
                            .get(1)
                            .and_then(Value::as_f64)
                            .ok_or_else(|| RpcError::node(RPC_INVALID_PARAMETER, "Invalid amount"))?;
                        let sats = (amount * COIN as f64).round() as u64;
                        self.send(&name, &address, sats).map(|txid| json!(txid))
                    }
                    _ => self.wallet_transaction(&name, &hash_param(params, 0)?),
                }
            }
            _ => Err(RpcError::node(-32601, "Method not found")),
        }
    }

    fn next_hash(&mut self, tag: &str) -> Hash256 {
        self.counter += 1;
        let mut data = tag.as_bytes().to_vec();
        data.extend_from_slice(&self.counter.to_le_bytes());
        let first = Sha256::digest(&data);
        let second = Sha256::digest(first);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&second);
        Hash256::new(bytes)
    }

    fn tip_height(&self) -> u64 {
        (self.blocks.len() - 1) as u64
    }

    fn wallet_scope(&self, wallet: Option<&str>) -> Result<String, RpcError> {
        let name = wallet.ok_or_else(|| {
            RpcError::node(
                RPC_WALLET_NOT_SPECIFIED,
                "Wallet file not specified (must request wallet RPC through /wallet/<filename> uri-path).",
            )
        })?;
        if !self.loaded.contains(name) {
            return Err(RpcError::node(
                codes::RPC_WALLET_NOT_FOUND,
                "Requested wallet does not exist or is not loaded",
            ));
        }
        Ok(name.to_string())
    }

    fn load_wallet(&mut self, name: &str) -> Result<Value, RpcError> {
        if !self.wallets_on_disk.iter().any(|w| w == name) {
            return Err(RpcError::node(
                codes::RPC_WALLET_NOT_FOUND,
                format!(
                    "Wallet file verification failed. Failed to load database path '/regtest/wallets/{}'. Path does not exist.",
                    name
                ),
            ));
        }
        if !self.loaded.insert(name.to_string()) {
            return Err(RpcError::node(
                codes::RPC_WALLET_ALREADY_LOADED,
                format!("Wallet \"{}\" is already loaded.", name),
            ));
        }
        Ok(json!({ "name": name }))
    }

    fn create_wallet(&mut self, name: &str) -> Result<Value, RpcError> {
        if self.wallets_on_disk.iter().any(|w| w == name) {
            return Err(RpcError::node(
                codes::RPC_WALLET_ERROR,
                format!(
                    "Wallet file verification failed. Failed to create database path '/regtest/wallets/{}'. Database already exists.",
                    name
                ),
            ));
        }
        self.wallets_on_disk.push(name.to_string());
        self.loaded.insert(name.to_string());
        Ok(json!({ "name": name }))
    }

    fn new_address(&mut self, wallet: &str) -> String {
        let hash = self.next_hash("address");
        let address = format!("bcrt1q{}", &hash.to_hex()[..38]);
        self.owners.insert(address.clone(), wallet.to_string());
        address
    }

    fn mine_block(&mut self, address: &str) -> Hash256 {
        let height = self.tip_height() + 1;
        let fees: u64 = self.mempool.iter().map(|txid| self.fee_of(&self.txs[txid])).sum();

        let coinbase_id = self.next_hash("coinbase");
        let coinbase = MockTx {
            inputs: Vec::new(),
            outputs: vec![(address.to_string(), SUBSIDY + fees)],
            height: Some(height),
        };
        self.txs.insert(coinbase_id, coinbase);
        self.tx_order.push(coinbase_id);

        for txid in std::mem::take(&mut self.mempool) {
            if let Some(tx) = self.txs.get_mut(&txid) {
                tx.height = Some(height);
            }
        }

        let block = self.next_hash("block");
        self.blocks.push(block);
        block
    }

    fn value_of(&self, prevout: &(Hash256, u32)) -> u64 {
        self.txs
            .get(&prevout.0)
            .and_then(|tx| tx.outputs.get(prevout.1 as usize))
            .map(|(_, value)| *value)
            .unwrap_or(0)
    }

    fn fee_of(&self, tx: &MockTx) -> u64 {
        let input: u64 = tx.inputs.iter().map(|p| self.value_of(p)).sum();
        let output: u64 = tx.outputs.iter().map(|(_, v)| *v).sum();
        input.saturating_sub(output)
    }

    fn owned_by(&self, address: &str, wallet: &str) -> bool {
        self.owners.get(address).is_some_and(|w| w == wallet)
    }

    fn spendable(&self, tx: &MockTx, wallet: &str) -> bool {
        match tx.height {
            Some(h) if tx.is_coinbase() => self.tip_height() - h + 1 > self.settings.maturity,
            Some(_) => true,
            // Own unconfirmed change is trusted
            None => tx
                .inputs
                .iter()
                .all(|(prev, n)| self.txs[prev].outputs.get(*n as usize).is_some_and(|(a, _)| self.owned_by(a, wallet))),
        }
    }

    fn unspent(&self, wallet: &str) -> Vec<((Hash256, u32), u64)> {
        let mut coins = Vec::new();
        for txid in &self.tx_order {
            let tx = &self.txs[txid];
            if !self.spendable(tx, wallet) {
                continue;
            }
            for (n, (address, value)) in tx.outputs.iter().enumerate() {
                let outpoint = (*txid, n as u32);
                if self.owned_by(address, wallet) && !self.spent.contains(&outpoint) {
                    coins.push((outpoint, *value));
                }
            }
        }
        coins
    }

    fn balance(&self, wallet: &str) -> u64 {
        self.unspent(wallet).iter().map(|(_, v)| v).sum()
    }

    fn send(&mut self, wallet: &str, address: &str, amount: u64) -> Result<Hash256, RpcError> {
        let target = amount + SEND_FEE;
        let mut selected = Vec::new();
        let mut total = 0;
        for (outpoint, value) in self.unspent(wallet) {
            selected.push(outpoint);
            total += value;
            if total >= target {
                break;
            }
        }
        if total < target {
            return Err(RpcError::node(RPC_WALLET_INSUFFICIENT_FUNDS, "Insufficient funds"));
        }

        let mut outputs = vec![(address.to_string(), amount)];
        let change = total - target;
        if change > 0 {
            let change_address = self.new_address(wallet);
            if self.settings.change_first {
                outputs.insert(0, (change_address, change));
            } else {
                outputs.push((change_address, change));
            }
        }

        for outpoint in &selected {
            self.spent.insert(*outpoint);
        }
        let txid = self.next_hash("tx");
        self.txs.insert(
            txid,
            MockTx {
                inputs: selected,
                outputs,
                height: None,
            },
        );
        self.tx_order.push(txid);
        self.mempool.push(txid);
        Ok(txid)
    }

    fn mempool_entry(&self, txid: &Hash256) -> Result<Value, RpcError> {
        if !self.mempool.contains(txid) {
            return Err(RpcError::node(codes::RPC_INVALID_ADDRESS_OR_KEY, "Transaction not in mempool"));
        }
        Ok(json!({ "vsize": 141, "fees": { "base": btc(self.fee_of(&self.txs[txid])) } }))
    }

    fn raw_transaction(&self, txid: &Hash256, block: Option<Hash256>) -> Result<Value, RpcError> {
        let not_found = || {
            RpcError::node(
                codes::RPC_INVALID_ADDRESS_OR_KEY,
                "No such mempool transaction. Use -txindex or provide a block hash to enable blockchain transaction queries.",
            )
        };
        let tx = self.overrides.get(txid).or_else(|| self.txs.get(txid)).ok_or_else(not_found)?;

        let block_hash = tx.height.map(|h| self.blocks[h as usize]);
        if tx.height.is_some() && !self.settings.txindex && block != block_hash {
            return Err(not_found());
        }

        let vin: Vec<Value> = if tx.is_coinbase() {
            vec![json!({ "coinbase": "51", "sequence": 4294967295u32 })]
        } else {
            tx.inputs
                .iter()
                .map(|(prev, n)| json!({ "txid": prev, "vout": n, "sequence": 4294967293u32 }))
                .collect()
        };
        let vout: Vec<Value> = tx
            .outputs
            .iter()
            .enumerate()
            .map(|(n, (address, value))| {
                json!({
                    "value": btc(*value),
                    "n": n,
                    "scriptPubKey": { "address": address, "type": "witness_v0_keyhash" }
                })
            })
            .collect();

        let mut result = json!({ "txid": txid, "vin": vin, "vout": vout });
        if let (Some(h), Some(hash)) = (tx.height, block_hash) {
            result["blockhash"] = json!(hash);
            result["confirmations"] = json!(self.tip_height() - h + 1);
        }
        Ok(result)
    }

    fn wallet_transaction(&self, wallet: &str, txid: &Hash256) -> Result<Value, RpcError> {
        let tx = self
            .txs
            .get(txid)
            .ok_or_else(|| RpcError::node(codes::RPC_INVALID_ADDRESS_OR_KEY, "Invalid or non-wallet transaction id"))?;

        let credit: u64 = tx
            .outputs
            .iter()
            .filter(|(a, _)| self.owned_by(a, wallet))
            .map(|(_, v)| *v)
            .sum();
        let debit: u64 = tx
            .inputs
            .iter()
            .filter(|(prev, n)| {
                self.txs[prev]
                    .outputs
                    .get(*n as usize)
                    .is_some_and(|(a, _)| self.owned_by(a, wallet))
            })
            .map(|p| self.value_of(p))
            .sum();
        if credit == 0 && debit == 0 {
            return Err(RpcError::node(codes::RPC_INVALID_ADDRESS_OR_KEY, "Invalid or non-wallet transaction id"));
        }

        let mut result = json!({ "txid": txid, "confirmations": 0 });
        if debit > 0 {
            let fee = self.fee_of(tx);
            let net = credit as i64 - debit as i64 + fee as i64;
            result["amount"] = json!(net as f64 / COIN as f64);
            result["fee"] = json!(-(fee as f64) / COIN as f64);
        } else {
            result["amount"] = btc(credit);
        }
        if let Some(h) = tx.height {
            result["confirmations"] = json!(self.tip_height() - h + 1);
            result["blockhash"] = json!(self.blocks[h as usize]);
        }
        Ok(result)
    }
}

// Typed RPC clients over a transport

use crate::core::Hash256;
use crate::rpc::types::Btc;
use crate::rpc::{
    BlockchainInfo, MempoolEntry, RawTransaction, RpcError, Transport, WalletTransaction,
};
use bitcoincore_rpc::bitcoin::Amount;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::Decode {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

fn call<T: DeserializeOwned>(
    transport: &impl Transport,
    method: &str,
    params: &[Value],
) -> Result<T, RpcError> {
    let value = transport.call(method, params)?;
    decode(method, value)
}

/// Client for the node's general (non-wallet) endpoint
pub struct NodeClient<T: Transport> {
    transport: T,
}

impl<T: Transport> NodeClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn get_blockchain_info(&self) -> Result<BlockchainInfo, RpcError> {
        call(&self.transport, "getblockchaininfo", &[])
    }

    pub fn load_wallet(&self, name: &str) -> Result<(), RpcError> {
        self.transport.call("loadwallet", &[json!(name)]).map(|_| ())
    }

    pub fn create_wallet(&self, name: &str) -> Result<(), RpcError> {
        self.transport.call("createwallet", &[json!(name)]).map(|_| ())
    }

    /// Mine `count` blocks to `address`, returning their hashes
    pub fn generate_to_address(&self, count: u64, address: &str) -> Result<Vec<Hash256>, RpcError> {
        call(&self.transport, "generatetoaddress", &[json!(count), json!(address)])
    }

    pub fn get_mempool_entry(&self, txid: &Hash256) -> Result<MempoolEntry, RpcError> {
        call(&self.transport, "getmempoolentry", &[json!(txid)])
    }

    /// Verbose `getrawtransaction`; `block` lets a node without a
    /// transaction index find a confirmed transaction
    pub fn get_raw_transaction(
        &self,
        txid: &Hash256,
        block: Option<&Hash256>,
    ) -> Result<RawTransaction, RpcError> {
        let mut params = vec![json!(txid), json!(true)];
        if let Some(hash) = block {
            params.push(json!(hash));
        }
        call(&self.transport, "getrawtransaction", &params)
    }

    pub fn get_block_count(&self) -> Result<u64, RpcError> {
        call(&self.transport, "getblockcount", &[])
    }

    pub fn get_block_hash(&self, height: u64) -> Result<Hash256, RpcError> {
        call(&self.transport, "getblockhash", &[json!(height)])
    }
}

/// Client for one wallet's endpoint
pub struct WalletClient<T: Transport> {
    name: String,
    transport: T,
}

impl<T: Transport> WalletClient<T> {
    pub fn new(name: impl Into<String>, transport: T) -> Self {
        Self {
            name: name.into(),
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_new_address(&self, label: &str) -> Result<String, RpcError> {
        call(&self.transport, "getnewaddress", &[json!(label)])
    }

    /// Spendable balance
    pub fn get_balance(&self) -> Result<Amount, RpcError> {
        let balance: Btc = call(&self.transport, "getbalance", &[])?;
        Ok(balance.0)
    }

    pub fn send_to_address(&self, address: &str, amount: Amount) -> Result<Hash256, RpcError> {
        call(
            &self.transport,
            "sendtoaddress",
            &[json!(address), json!(amount.to_btc())],
        )
    }

    pub fn get_transaction(&self, txid: &Hash256) -> Result<WalletTransaction, RpcError> {
        call(&self.transport, "gettransaction", &[json!(txid)])
    }
}

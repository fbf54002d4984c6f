// Typed views of the node responses the workflow reads

use crate::core::Hash256;
use bitcoincore_rpc::bitcoin::amount::serde::as_btc;
use bitcoincore_rpc::bitcoin::{Amount, SignedAmount};
use serde::Deserialize;

/// `getblockchaininfo`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    pub bestblockhash: Hash256,
}

/// `getmempoolentry`
///
/// Older nodes report `fee`, newer ones `fees.base`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MempoolEntry {
    #[serde(default, with = "as_btc::opt")]
    pub fee: Option<Amount>,
    #[serde(default)]
    pub fees: Option<MempoolFees>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MempoolFees {
    #[serde(with = "as_btc")]
    pub base: Amount,
}

impl MempoolEntry {
    pub fn base_fee(&self) -> Option<Amount> {
        self.fees.as_ref().map(|f| f.base).or(self.fee)
    }
}

/// `getrawtransaction <txid> true`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTransaction {
    pub txid: Hash256,
    pub vin: Vec<RawInput>,
    pub vout: Vec<RawOutput>,
    #[serde(default)]
    pub blockhash: Option<Hash256>,
    #[serde(default)]
    pub confirmations: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawInput {
    /// Absent on coinbase inputs
    #[serde(default)]
    pub txid: Option<Hash256>,
    #[serde(default)]
    pub vout: Option<u32>,
}

impl RawInput {
    /// The output this input spends, `None` for coinbase
    pub fn prevout(&self) -> Option<(Hash256, u32)> {
        match (self.txid, self.vout) {
            (Some(txid), Some(vout)) => Some((txid, vout)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawOutput {
    #[serde(with = "as_btc")]
    pub value: Amount,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

impl RawOutput {
    pub fn address(&self) -> Option<&str> {
        self.script_pub_key.address.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub address: Option<String>,
}

/// Wallet-scoped `gettransaction`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletTransaction {
    pub txid: Hash256,
    #[serde(with = "as_btc")]
    pub amount: SignedAmount,
    /// Negative, and only present for sends
    #[serde(default, with = "as_btc::opt")]
    pub fee: Option<SignedAmount>,
    pub confirmations: i64,
    #[serde(default)]
    pub blockhash: Option<Hash256>,
}

/// Bare BTC number such as the `getbalance` result
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Btc(#[serde(with = "as_btc")] pub Amount);

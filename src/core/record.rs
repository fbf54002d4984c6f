// Reconciled transaction record

use crate::core::Hash256;
use bitcoincore_rpc::bitcoin::{Amount, SignedAmount};

const SATS_PER_BTC: u64 = 100_000_000;

/// Everything the report needs to know about one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub txid: Hash256,
    pub input_address: String,
    pub input_amount: Amount,
    pub trader_address: String,
    pub trader_amount: Amount,
    pub change_address: String,
    pub change_amount: Amount,
    pub fee: Amount,
    pub block_height: u64,
    pub block_hash: Hash256,
}

impl TransactionRecord {
    /// Report lines in their fixed order
    pub fn lines(&self) -> [String; 10] {
        [
            self.txid.to_hex(),
            self.input_address.clone(),
            format_btc(self.input_amount),
            self.trader_address.clone(),
            format_btc(self.trader_amount),
            self.change_address.clone(),
            format_btc(self.change_amount),
            format_btc(self.fee),
            self.block_height.to_string(),
            self.block_hash.to_hex(),
        ]
    }
}

/// input - sum(outputs), signed so a bad transaction shows up as negative
pub fn compute_fee(input: Amount, outputs: &[Amount]) -> SignedAmount {
    let spent: i64 = outputs.iter().map(|a| a.to_sat() as i64).sum();
    SignedAmount::from_sat(input.to_sat() as i64 - spent)
}

/// Fixed 8-decimal BTC notation, e.g. `29.99998590`
pub fn format_btc(amount: Amount) -> String {
    let sats = amount.to_sat();
    format!("{}.{:08}", sats / SATS_PER_BTC, sats % SATS_PER_BTC)
}

/// Signed variant of [`format_btc`]
pub fn format_signed_btc(amount: SignedAmount) -> String {
    let sats = amount.to_sat();
    let sign = if sats < 0 { "-" } else { "" };
    format!("{}{}", sign, format_btc(Amount::from_sat(sats.unsigned_abs())))
}

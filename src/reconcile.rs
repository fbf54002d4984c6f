// Turn a confirmed transfer into a transaction record

use crate::core::{compute_fee, format_btc, format_signed_btc, Hash256, TransactionRecord};
use crate::error::{Error, Result};
use crate::rpc::{NodeClient, RawOutput, RawTransaction, RpcErrorKind, Transport, WalletClient};
use bitcoincore_rpc::bitcoin::Amount;

/// Source of the funds spent by a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputs {
    /// Address of the first input's previous output
    pub address: String,
    /// Sum over all inputs
    pub amount: Amount,
}

/// Split outputs into the payment to `destination` and the change
///
/// Anything other than exactly one payment and one other output fails, so
/// sends without change and sends with several change outputs are rejected
/// rather than guessed at.
pub fn partition_outputs<'a>(
    txid: &Hash256,
    outputs: &'a [RawOutput],
    destination: &str,
) -> Result<(&'a RawOutput, &'a RawOutput)> {
    let mut payments = Vec::new();
    let mut others = Vec::new();

    for output in outputs {
        let address = output.address().ok_or(Error::MissingAddress {
            txid: *txid,
            vout: output.n,
        })?;
        if address == destination {
            payments.push(output);
        } else {
            others.push(output);
        }
    }

    match (payments.as_slice(), others.as_slice()) {
        ([payment], [change]) => Ok((*payment, *change)),
        _ => Err(Error::OutputPartition {
            destination_matches: payments.len(),
            remainder: others.len(),
        }),
    }
}

/// Reconciles transactions sent from one wallet
pub struct Reconciler<'a, T: Transport> {
    node: &'a NodeClient<T>,
    wallet: &'a WalletClient<T>,
}

impl<'a, T: Transport> Reconciler<'a, T> {
    /// `wallet` is the sending wallet; it is used for the wallet view of the
    /// transaction and to locate previous transactions on nodes without a
    /// transaction index
    pub fn new(node: &'a NodeClient<T>, wallet: &'a WalletClient<T>) -> Self {
        Self { node, wallet }
    }

    /// Build the record for `txid`, which paid `destination`
    pub fn reconcile(&self, txid: &Hash256, destination: &str) -> Result<TransactionRecord> {
        let raw = self.fetch_raw(txid)?;

        let wallet_view = self
            .wallet
            .get_transaction(txid)
            .map_err(|e| Error::rpc(format!("gettransaction {}", txid), e))?;
        log::debug!(
            "Wallet view of {}: amount {}, {} confirmations",
            txid,
            format_signed_btc(wallet_view.amount),
            wallet_view.confirmations
        );

        let inputs = self.resolve_inputs(&raw)?;
        let (payment, change) = partition_outputs(&raw.txid, &raw.vout, destination)?;

        let fee = compute_fee(inputs.amount, &[payment.value, change.value]);
        let fee = u64::try_from(fee.to_sat()).map_err(|_| Error::NegativeFee {
            input: format_btc(inputs.amount),
            output: format_btc(payment.value + change.value),
        })?;
        let fee = Amount::from_sat(fee);

        if let Some(wallet_fee) = wallet_view.fee {
            if wallet_fee.to_sat().unsigned_abs() != fee.to_sat() {
                log::warn!(
                    "Wallet reports fee {} BTC for {}, computed {} BTC",
                    format_signed_btc(wallet_fee),
                    txid,
                    format_btc(fee)
                );
            }
        }

        let (block_height, block_hash) = self.confirming_block(&raw)?;

        Ok(TransactionRecord {
            txid: raw.txid,
            input_address: inputs.address,
            input_amount: inputs.amount,
            trader_address: destination.to_string(),
            trader_amount: payment.value,
            change_address: change.address().unwrap_or_default().to_string(),
            change_amount: change.value,
            fee,
            block_height,
            block_hash,
        })
    }

    /// Height and hash of the block that confirmed `raw`
    ///
    /// The height is derived from the confirmation count against the current
    /// tip, then checked against the node's hash at that height.
    pub fn confirming_block(&self, raw: &RawTransaction) -> Result<(u64, Hash256)> {
        let (block_hash, confirmations) = match (raw.blockhash, raw.confirmations) {
            (Some(hash), Some(confirmations)) if confirmations > 0 => (hash, confirmations),
            _ => return Err(Error::Unconfirmed { txid: raw.txid }),
        };

        let tip = self
            .node
            .get_block_count()
            .map_err(|e| Error::rpc("getblockcount", e))?;
        let block_height = tip
            .checked_sub(confirmations - 1)
            .ok_or(Error::Unconfirmed { txid: raw.txid })?;
        let at_height = self
            .node
            .get_block_hash(block_height)
            .map_err(|e| Error::rpc(format!("getblockhash {}", block_height), e))?;
        if at_height != block_hash {
            return Err(Error::BlockMismatch {
                txid: raw.txid,
                height: block_height,
                expected: block_hash,
                found: at_height,
            });
        }

        if tip != block_height {
            log::debug!("{} confirmed at height {}, tip is {}", raw.txid, block_height, tip);
        }
        Ok((block_height, block_hash))
    }

    /// Look up every input's previous output
    pub fn resolve_inputs(&self, raw: &RawTransaction) -> Result<ResolvedInputs> {
        if raw.vin.len() > 1 {
            log::warn!(
                "{} spends {} inputs; reporting the first input's address and the total amount",
                raw.txid,
                raw.vin.len()
            );
        }

        let mut address = None;
        let mut amount = Amount::ZERO;

        for (index, input) in raw.vin.iter().enumerate() {
            let (prev_txid, vout) = input.prevout().ok_or(Error::MissingPrevout {
                txid: raw.txid,
                vout: index as u32,
            })?;
            let output = self.previous_output(&prev_txid, vout)?;

            let prev_address = output
                .address()
                .ok_or(Error::MissingAddress { txid: prev_txid, vout })?;
            if address.is_none() {
                address = Some(prev_address.to_string());
            }
            amount += output.value;
        }

        let address = address.ok_or(Error::MissingPrevout {
            txid: raw.txid,
            vout: 0,
        })?;
        Ok(ResolvedInputs { address, amount })
    }

    fn previous_output(&self, prev_txid: &Hash256, vout: u32) -> Result<RawOutput> {
        self.fetch_raw(prev_txid)?
            .vout
            .into_iter()
            .find(|o| o.n == vout)
            .ok_or(Error::MissingPrevout { txid: *prev_txid, vout })
    }

    /// Verbose transaction lookup that survives a node without a
    /// transaction index, as long as the wallet knows the transaction
    fn fetch_raw(&self, txid: &Hash256) -> Result<RawTransaction> {
        match self.node.get_raw_transaction(txid, None) {
            Ok(tx) => Ok(tx),
            Err(e) if e.kind() == RpcErrorKind::NoSuchTransaction => {
                log::debug!("{} not indexed, locating it through wallet {}", txid, self.wallet.name());
                let block = self
                    .wallet
                    .get_transaction(txid)
                    .map_err(|e| Error::rpc(format!("gettransaction {}", txid), e))?
                    .blockhash
                    .ok_or_else(|| Error::rpc(format!("getrawtransaction {}", txid), e))?;
                self.node
                    .get_raw_transaction(txid, Some(&block))
                    .map_err(|e| Error::rpc(format!("getrawtransaction {}", txid), e))
            }
            Err(e) => Err(Error::rpc(format!("getrawtransaction {}", txid), e)),
        }
    }
}

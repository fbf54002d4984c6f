// Send funds and get them confirmed

use crate::core::{format_btc, Hash256};
use crate::error::{Error, Result};
use crate::rpc::{MempoolEntry, NodeClient, RpcError, Transport, WalletClient};
use bitcoincore_rpc::bitcoin::Amount;

/// Ask `wallet` to pay `amount` to `address`; coin selection and fee are
/// left to the node
pub fn send<T: Transport>(wallet: &WalletClient<T>, address: &str, amount: Amount) -> Result<Hash256> {
    let txid = wallet
        .send_to_address(address, amount)
        .map_err(|e| Error::rpc(format!("sendtoaddress from {}", wallet.name()), e))?;
    log::info!("{} sent {} to {} in {}", wallet.name(), amount, address, txid);
    Ok(txid)
}

/// Best-effort mempool lookup; failures are logged and swallowed
pub fn inspect_mempool<T: Transport>(node: &NodeClient<T>, txid: &Hash256) -> Option<MempoolEntry> {
    match node.get_mempool_entry(txid) {
        Ok(entry) => {
            println!("Transaction found in mempool: {}", txid);
            match entry.base_fee() {
                Some(fee) => println!("Mempool entry fee: {} BTC", format_btc(fee)),
                None => println!("Mempool entry fee: N/A"),
            }
            Some(entry)
        }
        Err(e) => {
            log::warn!("Error fetching mempool entry for {}: {}", txid, e);
            None
        }
    }
}

/// Mine exactly one block to `address` and return its hash
pub fn confirm<T: Transport>(node: &NodeClient<T>, address: &str) -> Result<Hash256> {
    let hashes = node
        .generate_to_address(1, address)
        .map_err(|e| Error::rpc("generatetoaddress", e))?;

    hashes.first().copied().ok_or_else(|| {
        Error::rpc(
            "generatetoaddress",
            RpcError::Decode {
                method: "generatetoaddress".to_string(),
                reason: "no block hash returned".to_string(),
            },
        )
    })
}

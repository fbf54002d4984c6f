// Mine until the mining wallet can spend

use crate::core::format_btc;
use crate::error::{Error, Result};
use crate::rpc::{NodeClient, Transport, WalletClient};
use bitcoincore_rpc::bitcoin::Amount;

/// Outcome of [`mine_until_spendable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Funding {
    pub blocks_mined: u64,
    pub balance: Amount,
}

/// Mine one block at a time to `address` until `wallet` has a positive
/// spendable balance
///
/// Coinbase rewards mature after 100 further blocks, so a fresh regtest
/// chain needs 101. Gives up with [`Error::MiningBudgetExhausted`] after
/// `max_blocks`.
pub fn mine_until_spendable<T: Transport>(
    node: &NodeClient<T>,
    wallet: &WalletClient<T>,
    address: &str,
    max_blocks: u64,
) -> Result<Funding> {
    for blocks_mined in 1..=max_blocks {
        node.generate_to_address(1, address)
            .map_err(|e| Error::rpc("generatetoaddress", e))?;

        let balance = wallet
            .get_balance()
            .map_err(|e| Error::rpc(format!("getbalance {}", wallet.name()), e))?;
        println!("Blocks mined: {}, Spendable balance: {} BTC", blocks_mined, format_btc(balance));

        if balance > Amount::ZERO {
            log::info!("{} has {} spendable after {} blocks", wallet.name(), balance, blocks_mined);
            return Ok(Funding { blocks_mined, balance });
        }
    }

    Err(Error::MiningBudgetExhausted { blocks: max_blocks })
}

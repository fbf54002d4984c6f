// Wallet-side steps of the workflow

mod funding;
mod provision;
mod transfer;

pub use funding::{mine_until_spendable, Funding};
pub use provision::{ensure_wallet, Provisioned};
pub use transfer::{confirm, inspect_mempool, send};

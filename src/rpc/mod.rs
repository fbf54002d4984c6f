// JSON-RPC access to the node

mod client;
mod error;
mod transport;
mod types;

#[cfg(test)]
pub mod mock;

pub use client::{NodeClient, WalletClient};
pub use error::{codes, RpcError, RpcErrorKind};
pub use transport::{Connect, Endpoint, HttpConnector, HttpTransport, Transport};
pub use types::{
    BlockchainInfo, MempoolEntry, MempoolFees, RawInput, RawOutput, RawTransaction, ScriptPubKey,
    WalletTransaction,
};

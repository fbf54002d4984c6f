// Idempotent wallet provisioning

use crate::error::{Error, Result};
use crate::rpc::{NodeClient, RpcErrorKind, Transport};

/// How a wallet ended up loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// An existing wallet file was loaded
    Loaded,
    /// No wallet file existed, a new one was created
    Created,
    /// The node already had it loaded
    AlreadyLoaded,
    /// Creation raced with another creator; the wallet exists
    AlreadyExisted,
}

impl std::fmt::Display for Provisioned {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Provisioned::Loaded => write!(f, "loaded"),
            Provisioned::Created => write!(f, "created"),
            Provisioned::AlreadyLoaded => write!(f, "already loaded"),
            Provisioned::AlreadyExisted => write!(f, "already exists"),
        }
    }
}

/// Make sure `name` is loaded on the node, creating it if needed
pub fn ensure_wallet<T: Transport>(node: &NodeClient<T>, name: &str) -> Result<Provisioned> {
    let err = match node.load_wallet(name) {
        Ok(()) => return Ok(Provisioned::Loaded),
        Err(e) => e,
    };

    match err.kind() {
        RpcErrorKind::WalletAlreadyLoaded => Ok(Provisioned::AlreadyLoaded),
        RpcErrorKind::WalletNotFound => {
            log::info!("Wallet {} not found, creating it", name);
            match node.create_wallet(name) {
                Ok(()) => Ok(Provisioned::Created),
                Err(e) if e.kind() == RpcErrorKind::WalletAlreadyExists => {
                    Ok(Provisioned::AlreadyExisted)
                }
                Err(e) => Err(Error::rpc(format!("createwallet {}", name), e)),
            }
        }
        _ => Err(Error::rpc(format!("loadwallet {}", name), err)),
    }
}

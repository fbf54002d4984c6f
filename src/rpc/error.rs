// RPC error types

/// Bitcoin Core error codes this crate reacts to
pub mod codes {
    /// Generic wallet failure; older nodes report "already loaded" and
    /// "already exists" under it
    pub const RPC_WALLET_ERROR: i32 = -4;
    /// Unknown transaction, address or key
    pub const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;
    /// Wallet file missing, or wallet not loaded
    pub const RPC_WALLET_NOT_FOUND: i32 = -18;
    pub const RPC_WALLET_ALREADY_LOADED: i32 = -35;
    pub const RPC_WALLET_ALREADY_EXISTS: i32 = -36;
}

/// What a node-side error means to the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    WalletNotFound,
    WalletAlreadyLoaded,
    WalletAlreadyExists,
    NoSuchTransaction,
    Other,
}

/// Failure of a single RPC round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The node answered with a JSON-RPC error object
    Node { code: i32, message: String },
    /// No answer within the per-call timeout
    Timeout { method: String },
    /// Connection, HTTP or URL problem
    Transport(String),
    /// The answer did not have the expected shape
    Decode { method: String, reason: String },
}

impl RpcError {
    pub fn node(code: i32, message: impl Into<String>) -> Self {
        RpcError::Node { code, message: message.into() }
    }

    /// Classify a node error by its code
    ///
    /// `RPC_WALLET_ERROR` carries several unrelated conditions on nodes that
    /// predate the dedicated codes, so only that code falls back to the
    /// documented message phrase.
    pub fn kind(&self) -> RpcErrorKind {
        let RpcError::Node { code, message } = self else {
            return RpcErrorKind::Other;
        };

        match *code {
            codes::RPC_WALLET_NOT_FOUND => RpcErrorKind::WalletNotFound,
            codes::RPC_WALLET_ALREADY_LOADED => RpcErrorKind::WalletAlreadyLoaded,
            codes::RPC_WALLET_ALREADY_EXISTS => RpcErrorKind::WalletAlreadyExists,
            codes::RPC_INVALID_ADDRESS_OR_KEY => RpcErrorKind::NoSuchTransaction,
            codes::RPC_WALLET_ERROR if message.contains("already loaded") => {
                RpcErrorKind::WalletAlreadyLoaded
            }
            codes::RPC_WALLET_ERROR if message.contains("already exists") => {
                RpcErrorKind::WalletAlreadyExists
            }
            _ => RpcErrorKind::Other,
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RpcError::Node { code, message } => write!(f, "node error {}: {}", code, message),
            RpcError::Timeout { method } => write!(f, "{} timed out", method),
            RpcError::Transport(reason) => write!(f, "transport error: {}", reason),
            RpcError::Decode { method, reason } => {
                write!(f, "unexpected {} response: {}", method, reason)
            }
        }
    }
}

impl std::error::Error for RpcError {}

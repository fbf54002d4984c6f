// Workflow errors and their process exit codes

use crate::core::Hash256;
use crate::rpc::RpcError;

/// Everything that can abort a run
#[derive(Debug)]
pub enum Error {
    /// Rejected configuration value
    Config(String),
    /// A node call failed and nothing could recover it
    Rpc { context: String, source: RpcError },
    /// Balance still zero after the mining budget was spent
    MiningBudgetExhausted { blocks: u64 },
    /// An input's previous output could not be resolved
    MissingPrevout { txid: Hash256, vout: u32 },
    /// An output (or spent prevout) has no address
    MissingAddress { txid: Hash256, vout: u32 },
    /// The outputs are not exactly one payment plus one change
    OutputPartition { destination_matches: usize, remainder: usize },
    /// Outputs are worth more than the inputs
    NegativeFee { input: String, output: String },
    /// The transaction is not in a block yet
    Unconfirmed { txid: Hash256 },
    /// The node's block at the derived height is not the one the transaction names
    BlockMismatch { txid: Hash256, height: u64, expected: Hash256, found: Hash256 },
    /// The report could not be written
    Report(std::io::Error),
}

impl Error {
    pub fn rpc(context: impl Into<String>, source: RpcError) -> Self {
        Error::Rpc {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Rpc { source: RpcError::Node { .. }, .. } => 3,
            Error::Rpc { .. } => 4,
            Error::MiningBudgetExhausted { .. } => 5,
            Error::MissingPrevout { .. }
            | Error::MissingAddress { .. }
            | Error::OutputPartition { .. }
            | Error::NegativeFee { .. }
            | Error::Unconfirmed { .. }
            | Error::BlockMismatch { .. } => 6,
            Error::Report(_) => 7,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Config(reason) => write!(f, "Invalid configuration: {}", reason),
            Error::Rpc { context, source } => write!(f, "{}: {}", context, source),
            Error::MiningBudgetExhausted { blocks } => {
                write!(f, "No spendable balance after mining {} blocks", blocks)
            }
            Error::MissingPrevout { txid, vout } => {
                write!(f, "Previous output {}:{} not found", txid, vout)
            }
            Error::MissingAddress { txid, vout } => {
                write!(f, "Output {}:{} has no address", txid, vout)
            }
            Error::OutputPartition { destination_matches, remainder } => write!(
                f,
                "Expected one payment and one change output, found {} payment and {} other outputs",
                destination_matches, remainder
            ),
            Error::NegativeFee { input, output } => {
                write!(f, "Outputs ({} BTC) exceed inputs ({} BTC)", output, input)
            }
            Error::Unconfirmed { txid } => write!(f, "Transaction {} is not confirmed", txid),
            Error::BlockMismatch { txid, height, expected, found } => write!(
                f,
                "Transaction {} names block {} but the block at height {} is {}",
                txid, expected, height, found
            ),
            Error::Report(e) => write!(f, "Failed to write report: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Rpc { source, .. } => Some(source),
            Error::Report(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Report(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

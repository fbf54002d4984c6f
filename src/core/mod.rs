// Core data structures

mod types;
mod record;

pub use types::*;
pub use record::*;

//! Blockchain interaction module

pub mod solana_client;
pub mod token_ops;
pub mod token_utils;
pub mod transaction_builder;

// Re-export for convenience
pub use solana_client::*;
pub use token_ops::*;
pub use token_utils::*;
pub use transaction_builder::*;

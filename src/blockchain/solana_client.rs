use std::str::FromStr;
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;

use crate::utils::error::{Error, Result};

/// Configuration for the Solana RPC client
#[derive(Debug, Clone)]
pub struct SolanaClientConfig {
    pub rpc_url: String,
    pub commitment: String,
    pub timeout_seconds: u64,
}

impl Default for SolanaClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl SolanaClientConfig {
    /// Parse the configured commitment level
    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| Error::ConfigError(format!("Invalid commitment level: {}", self.commitment)))
    }

    /// Create the RPC client used by every subsequent call
    pub fn connect(&self) -> Result<RpcClient> {
        Ok(RpcClient::new_with_timeout_and_commitment(
            self.rpc_url.clone(),
            Duration::from_secs(self.timeout_seconds),
            self.commitment()?,
        ))
    }
}

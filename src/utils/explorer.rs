//! Cluster selection and explorer.solana.com link formatting.

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::fmt;

const EXPLORER_BASE: &str = "https://explorer.solana.com";

/// Solana cluster a run is pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Cluster {
    /// Public RPC endpoint for the cluster
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
        }
    }

    /// Whether airdrops are available on this cluster
    pub fn has_faucet(&self) -> bool {
        !matches!(self, Cluster::MainnetBeta)
    }

    // Explorer shows mainnet without a query parameter
    fn query_suffix(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "",
            Cluster::Devnet => "?cluster=devnet",
            Cluster::Testnet => "?cluster=testnet",
        }
    }

    /// Explorer link for an account or mint address
    pub fn address_url(&self, address: &Pubkey) -> String {
        format!("{}/address/{}{}", EXPLORER_BASE, address, self.query_suffix())
    }

    /// Explorer link for a confirmed transaction
    pub fn tx_url(&self, signature: &Signature) -> String {
        format!("{}/tx/{}{}", EXPLORER_BASE, signature, self.query_suffix())
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::Devnet
    }
}

impl std::str::FromStr for Cluster {
    type Err = crate::utils::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            other => Err(crate::utils::error::Error::InvalidArgument(format!(
                "Unknown cluster: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
        };
        write!(f, "{}", name)
    }
}

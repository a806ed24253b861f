//! Payer identity provisioning and SOL balance management.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    native_token::{lamports_to_sol, sol_to_lamports},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};

use crate::config::Config;

/// Convenience wrapper around an on-chain Solana wallet (keypair + RPC)
#[derive(Clone)]
pub struct Wallet {
    rpc: Arc<RpcClient>,
    keypair: Arc<Keypair>,
}

impl Wallet {
    /// Create wallet from a shared RPC handle and keypair
    pub fn new(rpc: Arc<RpcClient>, keypair: Keypair) -> Self {
        Self { rpc, keypair: Arc::new(keypair) }
    }

    /// Public key of the wallet
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Shared handle to the signing keypair
    pub fn keypair(&self) -> Arc<Keypair> {
        Arc::clone(&self.keypair)
    }

    /// Return SOL balance in lamports
    pub async fn sol_balance(&self) -> Result<u64> {
        let lamports = self
            .rpc
            .get_balance(&self.pubkey())
            .await
            .context("fetch balance")?;
        Ok(lamports)
    }

    /// Request an airdrop when the balance is below `min_lamports` and wait
    /// until the faucet transaction is confirmed.
    pub async fn ensure_funded(&self, min_lamports: u64, airdrop_lamports: u64) -> Result<()> {
        let balance = self.sol_balance().await?;
        if balance >= min_lamports {
            return Ok(());
        }

        info!(
            "Balance {:.4} SOL below minimum, requesting {:.4} SOL airdrop",
            lamports_to_sol(balance),
            lamports_to_sol(airdrop_lamports)
        );
        let signature = self
            .rpc
            .request_airdrop(&self.pubkey(), airdrop_lamports)
            .await
            .context("request airdrop")?;

        // The faucet returns before the transaction lands; poll until it does
        for _ in 0..30 {
            if self.rpc.confirm_transaction(&signature).await.unwrap_or(false) {
                info!("Airdrop confirmed: {}", signature);
                return Ok(());
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        Err(anyhow!("Airdrop {} was not confirmed in time", signature))
    }
}

/// Write a keypair to disk as a quoted base58 string
pub fn persist_keypair(path: &Path, keypair: &Keypair) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    let secret = bs58::encode(keypair.to_bytes()).into_string();
    std::fs::write(path, format!("\"{}\"", secret))
        .with_context(|| format!("write keypair to {}", path.display()))?;
    Ok(())
}

/// Resolve the payer identity and make sure it can pay for the run.
///
/// The keypair comes from the configured source (env var or file); when
/// neither exists a fresh one is generated and persisted. On clusters with
/// a faucet the wallet is topped up to the configured minimum.
pub async fn initialize(rpc: Arc<RpcClient>, config: &Config) -> Result<Wallet> {
    let keypair = match config.load_keypair()? {
        Some(keypair) => keypair,
        None => {
            let keypair = Keypair::new();
            match config.wallet.keypair_path {
                Some(ref path) => {
                    persist_keypair(Path::new(path), &keypair)?;
                    warn!("No wallet configured; generated {} (saved to {})", keypair.pubkey(), path);
                }
                None => {
                    warn!("No wallet configured; generated ephemeral keypair {}", keypair.pubkey());
                }
            }
            keypair
        }
    };

    let wallet = Wallet::new(rpc, keypair);
    info!("Payer: {}", wallet.pubkey());

    if config.network.cluster.has_faucet() && config.wallet.airdrop_sol > 0.0 {
        wallet
            .ensure_funded(
                sol_to_lamports(config.wallet.min_sol_balance),
                sol_to_lamports(config.wallet.airdrop_sol),
            )
            .await?;
    }

    Ok(wallet)
}

//! # tokenflow
//! Walks a fungible SPL token through its full lifecycle on a Solana
//! cluster: mint creation, associated account creation, minting, delegation,
//! delegate-signed transfer, revocation, and burning. Every state transition
//! is performed and validated by the remote ledger; this crate orchestrates
//! the steps in a fixed order and logs an explorer link for each one.

pub use crate::utils::error::{Error, Result};

pub mod blockchain;
pub mod config;
pub mod utils;
pub mod wallet;

use log::info;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};

use crate::blockchain::token_ops::TokenLedger;
use crate::blockchain::token_utils::TokenUtils;
use crate::config::DemoConfig;
use crate::utils::explorer::Cluster;

/// Addresses and amounts produced by a completed lifecycle run
#[derive(Debug, Clone)]
pub struct LifecycleReport {
    pub mint: Pubkey,
    pub payer_account: Pubkey,
    pub delegate: Pubkey,
    pub receiver_account: Pubkey,
    pub decimals: u8,
    pub minted: u64,
    pub delegated: u64,
    pub transferred: u64,
    pub burned: u64,
    pub payer_balance: u64,
    pub receiver_balance: u64,
}

/// Runs the fixed lifecycle sequence against a [`TokenLedger`].
///
/// Steps are strictly sequential: each operation is confirmed before the
/// next begins, and the first failure aborts the rest of the run.
pub struct TokenLifecycle<L: TokenLedger> {
    ledger: L,
    demo: DemoConfig,
    cluster: Cluster,
}

impl<L: TokenLedger> TokenLifecycle<L> {
    /// Create a lifecycle runner over a ledger implementation
    pub fn new(ledger: L, demo: DemoConfig, cluster: Cluster) -> Self {
        Self { ledger, demo, cluster }
    }

    /// Execute the full sequence and return the run report
    pub async fn run(&self) -> Result<LifecycleReport> {
        let payer = self.ledger.payer();

        // Mint with both authorities set to the payer
        let mint = self.ledger.create_mint(self.demo.decimals).await?;
        info!("Token Mint: {}", self.cluster.address_url(&mint));

        // Read the decimals back from the ledger for amount scaling
        let decimals = self.ledger.mint_decimals(&mint).await?;

        let payer_account = self.ledger.ensure_token_account(&mint, &payer).await?;
        info!("Token Account: {}", self.cluster.address_url(&payer_account));

        let minted = TokenUtils::scale_amount(self.demo.mint_amount, decimals)?;
        let signature = self.ledger.mint_to(&mint, &payer_account, minted).await?;
        info!("Mint Token Transaction: {}", self.cluster.tx_url(&signature));

        // Grant a fresh keypair partial spending authority over the payer's account
        let delegate = Keypair::new();
        let delegated = TokenUtils::scale_amount(self.demo.delegate_amount, decimals)?;
        let signature = self
            .ledger
            .approve_delegate(&payer_account, &delegate.pubkey(), delegated)
            .await?;
        info!("Approve Delegate Transaction: {}", self.cluster.tx_url(&signature));

        let receiver = Keypair::new();
        let receiver_account = self
            .ledger
            .ensure_token_account(&mint, &receiver.pubkey())
            .await?;
        info!("Token Account: {}", self.cluster.address_url(&receiver_account));

        // The delegate, not the payer, signs the transfer
        let transferred = TokenUtils::scale_amount(self.demo.transfer_amount, decimals)?;
        let signature = self
            .ledger
            .transfer(&payer_account, &mint, &receiver_account, &delegate, transferred, decimals)
            .await?;
        info!("Transfer Transaction: {}", self.cluster.tx_url(&signature));

        let signature = self.ledger.revoke_delegate(&payer_account).await?;
        info!("Revoke Delegate Transaction: {}", self.cluster.tx_url(&signature));

        let burned = TokenUtils::scale_amount(self.demo.burn_amount, decimals)?;
        let signature = self.ledger.burn(&payer_account, &mint, burned).await?;
        info!("Burn Transaction: {}", self.cluster.tx_url(&signature));

        let payer_balance = self.ledger.token_balance(&payer_account).await?;
        let receiver_balance = self.ledger.token_balance(&receiver_account).await?;
        info!(
            "Final balances: payer {} / receiver {}",
            TokenUtils::format_token_amount_ui(payer_balance, decimals),
            TokenUtils::format_token_amount_ui(receiver_balance, decimals)
        );

        Ok(LifecycleReport {
            mint,
            payer_account,
            delegate: delegate.pubkey(),
            receiver_account,
            decimals,
            minted,
            delegated,
            transferred,
            burned,
            payer_balance,
            receiver_balance,
        })
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
};
use spl_token::state::Mint;

use crate::blockchain::token_utils::TokenUtils;
use crate::blockchain::transaction_builder::TransactionBuilder;
use crate::utils::error::{Error, Result};

/// Ledger operations the lifecycle sequence runs against.
///
/// The remote ledger owns every invariant (balance non-negativity,
/// delegation authority); this trait only names the operations so tests can
/// substitute an in-memory ledger for the RPC-backed client.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Public key that pays fees and owns the source token account
    fn payer(&self) -> Pubkey;

    /// Create a mint with the payer as mint and freeze authority
    async fn create_mint(&self, decimals: u8) -> Result<Pubkey>;

    /// Read a mint's decimal precision from the ledger
    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8>;

    /// Get or create the associated token account for `owner` under `mint`
    async fn ensure_token_account(&self, mint: &Pubkey, owner: &Pubkey) -> Result<Pubkey>;

    /// Mint `amount` base units to `account`
    async fn mint_to(&self, mint: &Pubkey, account: &Pubkey, amount: u64) -> Result<Signature>;

    /// Approve `delegate` to spend up to `amount` base units from `account`
    async fn approve_delegate(
        &self,
        account: &Pubkey,
        delegate: &Pubkey,
        amount: u64,
    ) -> Result<Signature>;

    /// Transfer `amount` base units between token accounts, signed by `authority`
    async fn transfer(
        &self,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature>;

    /// Revoke any outstanding delegation on `account`
    async fn revoke_delegate(&self, account: &Pubkey) -> Result<Signature>;

    /// Burn `amount` base units from `account`
    async fn burn(&self, account: &Pubkey, mint: &Pubkey, amount: u64) -> Result<Signature>;

    /// Current balance of a token account in base units
    async fn token_balance(&self, account: &Pubkey) -> Result<u64>;
}

/// RPC-backed `TokenLedger` over the SPL token program.
///
/// Every operation is one transaction, signed by the payer and confirmed
/// before returning.
pub struct SplTokenClient {
    rpc: Arc<RpcClient>,
    payer: Arc<Keypair>,
}

impl SplTokenClient {
    /// Create a new token client from a shared RPC handle and payer keypair
    pub fn new(rpc: Arc<RpcClient>, payer: Arc<Keypair>) -> Self {
        Self { rpc, payer }
    }
}

#[async_trait]
impl TokenLedger for SplTokenClient {
    fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    async fn create_mint(&self, decimals: u8) -> Result<Pubkey> {
        let mint = Keypair::new();
        let rent = self
            .rpc
            .get_minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;

        let create_account = system_instruction::create_account(
            &self.payer.pubkey(),
            &mint.pubkey(),
            rent,
            Mint::LEN as u64,
            &spl_token::id(),
        );
        let initialize_mint = spl_token::instruction::initialize_mint(
            &spl_token::id(),
            &mint.pubkey(),
            &self.payer.pubkey(),
            Some(&self.payer.pubkey()),
            decimals,
        )?;

        TransactionBuilder::new()
            .add_instruction(create_account)
            .add_instruction(initialize_mint)
            .add_signer(self.payer.as_ref())
            .add_signer(&mint)
            .fee_payer(self.payer.pubkey())
            .send_and_confirm(&self.rpc)
            .await?;

        Ok(mint.pubkey())
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8> {
        let account = self.rpc.get_account(mint).await?;
        let state = Mint::unpack(&account.data)?;
        Ok(state.decimals)
    }

    async fn ensure_token_account(&self, mint: &Pubkey, owner: &Pubkey) -> Result<Pubkey> {
        let address = TokenUtils::associated_token_address(owner, mint);

        let existing = self
            .rpc
            .get_account_with_commitment(&address, self.rpc.commitment())
            .await?;
        if existing.value.is_some() {
            debug!("Token account {} already exists", address);
            return Ok(address);
        }

        let create = spl_associated_token_account::instruction::create_associated_token_account(
            &self.payer.pubkey(),
            owner,
            mint,
            &spl_token::id(),
        );

        TransactionBuilder::new()
            .add_instruction(create)
            .add_signer(self.payer.as_ref())
            .send_and_confirm(&self.rpc)
            .await?;

        Ok(address)
    }

    async fn mint_to(&self, mint: &Pubkey, account: &Pubkey, amount: u64) -> Result<Signature> {
        let instruction = spl_token::instruction::mint_to(
            &spl_token::id(),
            mint,
            account,
            &self.payer.pubkey(),
            &[],
            amount,
        )?;

        TransactionBuilder::new()
            .add_instruction(instruction)
            .add_signer(self.payer.as_ref())
            .send_and_confirm(&self.rpc)
            .await
    }

    async fn approve_delegate(
        &self,
        account: &Pubkey,
        delegate: &Pubkey,
        amount: u64,
    ) -> Result<Signature> {
        let instruction = spl_token::instruction::approve(
            &spl_token::id(),
            account,
            delegate,
            &self.payer.pubkey(),
            &[],
            amount,
        )?;

        TransactionBuilder::new()
            .add_instruction(instruction)
            .add_signer(self.payer.as_ref())
            .send_and_confirm(&self.rpc)
            .await
    }

    async fn transfer(
        &self,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature> {
        let instruction = spl_token::instruction::transfer_checked(
            &spl_token::id(),
            source,
            mint,
            destination,
            &authority.pubkey(),
            &[],
            amount,
            decimals,
        )?;

        // The payer covers the fee even when a delegate signs the transfer
        TransactionBuilder::new()
            .add_instruction(instruction)
            .add_signer(self.payer.as_ref())
            .add_signer(authority)
            .fee_payer(self.payer.pubkey())
            .send_and_confirm(&self.rpc)
            .await
    }

    async fn revoke_delegate(&self, account: &Pubkey) -> Result<Signature> {
        let instruction = spl_token::instruction::revoke(
            &spl_token::id(),
            account,
            &self.payer.pubkey(),
            &[],
        )?;

        TransactionBuilder::new()
            .add_instruction(instruction)
            .add_signer(self.payer.as_ref())
            .send_and_confirm(&self.rpc)
            .await
    }

    async fn burn(&self, account: &Pubkey, mint: &Pubkey, amount: u64) -> Result<Signature> {
        let instruction = spl_token::instruction::burn(
            &spl_token::id(),
            account,
            mint,
            &self.payer.pubkey(),
            &[],
            amount,
        )?;

        TransactionBuilder::new()
            .add_instruction(instruction)
            .add_signer(self.payer.as_ref())
            .send_and_confirm(&self.rpc)
            .await
    }

    async fn token_balance(&self, account: &Pubkey) -> Result<u64> {
        let balance = self.rpc.get_token_account_balance(account).await?;
        balance
            .amount
            .parse::<u64>()
            .map_err(|e| Error::Other(format!("Failed to parse token balance: {}", e)))
    }
}

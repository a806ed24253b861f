use crate::utils::error::{Error, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

/// Builder for Solana transactions
///
/// Signers are borrowed so short-lived keypairs (the mint account, the
/// delegate) can sign without being wrapped in an `Arc`.
pub struct TransactionBuilder<'a> {
    instructions: Vec<Instruction>,
    signers: Vec<&'a Keypair>,
    fee_payer: Option<Pubkey>,
}

impl<'a> Default for TransactionBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TransactionBuilder<'a> {
    /// Create a new transaction builder
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            signers: Vec::new(),
            fee_payer: None,
        }
    }

    /// Add an instruction to the transaction
    pub fn add_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Add a signer to the transaction
    pub fn add_signer(mut self, signer: &'a Keypair) -> Self {
        self.signers.push(signer);
        self
    }

    /// Set the fee payer for the transaction
    pub fn fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Build an unsigned transaction
    pub fn build_unsigned(self) -> Result<Transaction> {
        if self.instructions.is_empty() {
            return Err(Error::InvalidArgument("No instructions provided".to_string()));
        }

        let message = Message::new(&self.instructions, self.fee_payer.as_ref());
        Ok(Transaction::new_unsigned(message))
    }

    /// Sign with a fresh blockhash, send, and wait for confirmation
    pub async fn send_and_confirm(mut self, client: &RpcClient) -> Result<Signature> {
        if self.instructions.is_empty() {
            return Err(Error::InvalidArgument("No instructions provided".to_string()));
        }

        // If no fee payer is set, use the first signer
        if self.fee_payer.is_none() && !self.signers.is_empty() {
            self.fee_payer = Some(self.signers[0].pubkey());
        }

        let blockhash = client.get_latest_blockhash().await?;
        let message = Message::new(&self.instructions, self.fee_payer.as_ref());
        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(&self.signers, blockhash)?;

        let signature = client.send_and_confirm_transaction(&tx).await?;
        Ok(signature)
    }
}

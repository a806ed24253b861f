//! Lifecycle integration tests against an in-memory ledger.
//!
//! The ledger enforces the same rules the token program does (balance
//! checks, delegation authority), so the full sequence can be exercised
//! without a cluster.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

use tokenflow::blockchain::token_ops::TokenLedger;
use tokenflow::blockchain::token_utils::TokenUtils;
use tokenflow::config::DemoConfig;
use tokenflow::utils::Cluster;
use tokenflow::{Error, Result, TokenLifecycle};

#[derive(Debug, Clone)]
struct MintState {
    decimals: u8,
    supply: u64,
}

#[derive(Debug, Clone)]
struct AccountState {
    owner: Pubkey,
    balance: u64,
    delegate: Option<(Pubkey, u64)>,
}

#[derive(Default)]
struct LedgerState {
    mints: HashMap<Pubkey, MintState>,
    accounts: HashMap<Pubkey, AccountState>,
    calls: Vec<&'static str>,
}

/// In-memory stand-in for the remote ledger
#[derive(Clone)]
struct MemoryLedger {
    payer: Pubkey,
    state: Arc<Mutex<LedgerState>>,
    fail_on: Option<&'static str>,
}

impl MemoryLedger {
    fn new() -> Self {
        Self {
            payer: Pubkey::new_unique(),
            state: Arc::new(Mutex::new(LedgerState::default())),
            fail_on: None,
        }
    }

    fn failing_at(op: &'static str) -> Self {
        Self { fail_on: Some(op), ..Self::new() }
    }

    fn record(&self, op: &'static str) -> Result<()> {
        self.state.lock().unwrap().calls.push(op);
        if self.fail_on == Some(op) {
            return Err(Error::Other(format!("injected failure in {}", op)));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn mints(&self) -> Vec<MintState> {
        self.state.lock().unwrap().mints.values().cloned().collect()
    }

    fn account(&self, address: &Pubkey) -> AccountState {
        self.state.lock().unwrap().accounts[address].clone()
    }
}

#[async_trait]
impl TokenLedger for MemoryLedger {
    fn payer(&self) -> Pubkey {
        self.payer
    }

    async fn create_mint(&self, decimals: u8) -> Result<Pubkey> {
        self.record("create_mint")?;
        let mint = Pubkey::new_unique();
        self.state
            .lock()
            .unwrap()
            .mints
            .insert(mint, MintState { decimals, supply: 0 });
        Ok(mint)
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8> {
        self.record("mint_decimals")?;
        self.state
            .lock()
            .unwrap()
            .mints
            .get(mint)
            .map(|m| m.decimals)
            .ok_or_else(|| Error::Other("unknown mint".to_string()))
    }

    async fn ensure_token_account(&self, mint: &Pubkey, owner: &Pubkey) -> Result<Pubkey> {
        self.record("ensure_token_account")?;
        let address = TokenUtils::associated_token_address(owner, mint);
        self.state
            .lock()
            .unwrap()
            .accounts
            .entry(address)
            .or_insert(AccountState { owner: *owner, balance: 0, delegate: None });
        Ok(address)
    }

    async fn mint_to(&self, mint: &Pubkey, account: &Pubkey, amount: u64) -> Result<Signature> {
        self.record("mint_to")?;
        let mut state = self.state.lock().unwrap();
        state
            .mints
            .get_mut(mint)
            .ok_or_else(|| Error::Other("unknown mint".to_string()))?
            .supply += amount;
        state
            .accounts
            .get_mut(account)
            .ok_or_else(|| Error::Other("unknown account".to_string()))?
            .balance += amount;
        Ok(Signature::new_unique())
    }

    async fn approve_delegate(
        &self,
        account: &Pubkey,
        delegate: &Pubkey,
        amount: u64,
    ) -> Result<Signature> {
        self.record("approve_delegate")?;
        let mut state = self.state.lock().unwrap();
        state
            .accounts
            .get_mut(account)
            .ok_or_else(|| Error::Other("unknown account".to_string()))?
            .delegate = Some((*delegate, amount));
        Ok(Signature::new_unique())
    }

    async fn transfer(
        &self,
        source: &Pubkey,
        _mint: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
        _decimals: u8,
    ) -> Result<Signature> {
        self.record("transfer")?;
        let mut state = self.state.lock().unwrap();

        let src = state
            .accounts
            .get_mut(source)
            .ok_or_else(|| Error::Other("unknown account".to_string()))?;
        let signer = authority.pubkey();

        if signer != src.owner {
            // Delegate spend: must be the approved delegate, within allowance
            match src.delegate {
                Some((delegate, allowance)) if delegate == signer => {
                    if allowance < amount {
                        return Err(Error::Other("insufficient delegated amount".to_string()));
                    }
                    src.delegate = Some((delegate, allowance - amount));
                }
                _ => return Err(Error::Other("owner does not match".to_string())),
            }
        }

        if src.balance < amount {
            return Err(Error::Other("insufficient funds".to_string()));
        }
        src.balance -= amount;

        state
            .accounts
            .get_mut(destination)
            .ok_or_else(|| Error::Other("unknown account".to_string()))?
            .balance += amount;
        Ok(Signature::new_unique())
    }

    async fn revoke_delegate(&self, account: &Pubkey) -> Result<Signature> {
        self.record("revoke_delegate")?;
        let mut state = self.state.lock().unwrap();
        state
            .accounts
            .get_mut(account)
            .ok_or_else(|| Error::Other("unknown account".to_string()))?
            .delegate = None;
        Ok(Signature::new_unique())
    }

    async fn burn(&self, account: &Pubkey, mint: &Pubkey, amount: u64) -> Result<Signature> {
        self.record("burn")?;
        let mut state = self.state.lock().unwrap();

        let acc = state
            .accounts
            .get_mut(account)
            .ok_or_else(|| Error::Other("unknown account".to_string()))?;
        if acc.balance < amount {
            return Err(Error::Other("insufficient funds".to_string()));
        }
        acc.balance -= amount;

        state
            .mints
            .get_mut(mint)
            .ok_or_else(|| Error::Other("unknown mint".to_string()))?
            .supply -= amount;
        Ok(Signature::new_unique())
    }

    async fn token_balance(&self, account: &Pubkey) -> Result<u64> {
        self.record("token_balance")?;
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(account)
            .map(|a| a.balance)
            .ok_or_else(|| Error::Other("unknown account".to_string()))
    }
}

#[tokio::test]
async fn test_full_lifecycle_balances() {
    let ledger = MemoryLedger::new();
    let lifecycle = TokenLifecycle::new(ledger.clone(), DemoConfig::default(), Cluster::Devnet);

    let report = lifecycle.run().await.unwrap();

    // Default run: mint 100, delegate 50, transfer 50, burn 25, at 2 decimals
    assert_eq!(report.decimals, 2);
    assert_eq!(report.minted, 10_000);
    assert_eq!(report.transferred, 5_000);
    assert_eq!(report.burned, 2_500);

    // Receiver holds exactly the transferred amount; the payer lost the
    // transfer and the burn
    assert_eq!(report.receiver_balance, 5_000);
    assert_eq!(report.payer_balance, 10_000 - 5_000 - 2_500);
    assert_eq!(ledger.account(&report.receiver_account).balance, 5_000);

    // Burning shrinks supply
    let mints = ledger.mints();
    assert_eq!(mints.len(), 1);
    assert_eq!(mints[0].supply, 7_500);

    // Revocation cleared the delegation
    assert!(ledger.account(&report.payer_account).delegate.is_none());
}

#[tokio::test]
async fn test_exactly_one_mint_with_configured_decimals() {
    let ledger = MemoryLedger::new();
    let demo = DemoConfig { decimals: 6, ..DemoConfig::default() };
    let lifecycle = TokenLifecycle::new(ledger.clone(), demo, Cluster::Devnet);

    let report = lifecycle.run().await.unwrap();

    let mints = ledger.mints();
    assert_eq!(mints.len(), 1);
    assert_eq!(mints[0].decimals, 6);
    assert_eq!(report.minted, 100_000_000);
}

#[tokio::test]
async fn test_delegate_authority_is_enforced() {
    let ledger = MemoryLedger::new();
    let payer = ledger.payer();

    let mint = ledger.create_mint(2).await.unwrap();
    let source = ledger.ensure_token_account(&mint, &payer).await.unwrap();
    let receiver = Keypair::new();
    let destination = ledger
        .ensure_token_account(&mint, &receiver.pubkey())
        .await
        .unwrap();
    ledger.mint_to(&mint, &source, 10_000).await.unwrap();

    let delegate = Keypair::new();
    ledger
        .approve_delegate(&source, &delegate.pubkey(), 5_000)
        .await
        .unwrap();

    // Spending beyond the allowance fails
    let result = ledger
        .transfer(&source, &mint, &destination, &delegate, 6_000, 2)
        .await;
    assert!(result.is_err());

    // Spending within it succeeds
    ledger
        .transfer(&source, &mint, &destination, &delegate, 3_000, 2)
        .await
        .unwrap();
    assert_eq!(ledger.account(&destination).balance, 3_000);

    // After revocation the former delegate has no authority at all
    ledger.revoke_delegate(&source).await.unwrap();
    let result = ledger
        .transfer(&source, &mint, &destination, &delegate, 1_000, 2)
        .await;
    assert!(result.is_err());

    // A stranger never had any
    let stranger = Keypair::new();
    let result = ledger
        .transfer(&source, &mint, &destination, &stranger, 1_000, 2)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failure_aborts_remaining_steps() {
    let ledger = MemoryLedger::failing_at("mint_to");
    let lifecycle = TokenLifecycle::new(ledger.clone(), DemoConfig::default(), Cluster::Devnet);

    let result = lifecycle.run().await;
    assert!(result.is_err());

    // The sequence stops at the failing step; nothing after it is attempted
    assert_eq!(
        ledger.calls(),
        vec!["create_mint", "mint_decimals", "ensure_token_account", "mint_to"]
    );
}

#[tokio::test]
async fn test_failure_in_first_step_attempts_nothing_else() {
    let ledger = MemoryLedger::failing_at("create_mint");
    let lifecycle = TokenLifecycle::new(ledger.clone(), DemoConfig::default(), Cluster::Devnet);

    assert!(lifecycle.run().await.is_err());
    assert_eq!(ledger.calls(), vec!["create_mint"]);
}

//! Configuration module for the lifecycle tool

use crate::blockchain::solana_client::SolanaClientConfig;
use crate::utils::error::{Error, Result};
use crate::utils::explorer::Cluster;
use serde::{Deserialize, Serialize};
use solana_sdk::signature::Keypair;
use std::env;
use std::fs;
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General application settings
    pub app: AppConfig,

    /// Cluster / RPC configuration
    pub network: NetworkConfig,

    /// Wallet configuration
    pub wallet: WalletConfig,

    /// Lifecycle run parameters
    pub demo: DemoConfig,
}

/// Application-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level (debug, info, warn, error)
    pub log_level: String,
}

/// Cluster / RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Cluster the run is pointed at (mainnet-beta, devnet, testnet)
    pub cluster: Cluster,

    /// RPC endpoint URL override; the cluster's public endpoint when unset
    pub rpc_url: Option<String>,

    /// Commitment level
    pub commitment: String,

    /// Timeout for RPC requests in seconds
    pub timeout_seconds: u64,
}

/// Wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Wallet private key (base58 encoded)
    pub private_key: Option<String>,

    /// Wallet file path (alternative to private_key)
    pub keypair_path: Option<String>,

    /// Minimum SOL balance to maintain; below this an airdrop is requested
    pub min_sol_balance: f64,

    /// Airdrop size in SOL when the balance falls below the minimum
    pub airdrop_sol: f64,
}

/// Lifecycle run parameters (whole-token amounts, scaled by the mint's decimals)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Decimal precision of the created mint
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Whole tokens minted to the payer's account
    #[serde(default = "default_mint_amount")]
    pub mint_amount: u64,

    /// Whole tokens the delegate is approved to spend
    #[serde(default = "default_delegate_amount")]
    pub delegate_amount: u64,

    /// Whole tokens transferred to the receiver by the delegate
    #[serde(default = "default_transfer_amount")]
    pub transfer_amount: u64,

    /// Whole tokens burned from the payer's account
    #[serde(default = "default_burn_amount")]
    pub burn_amount: u64,
}

// --------- Helper default functions for serde ---------
fn default_decimals() -> u8 {
    2
}
fn default_mint_amount() -> u64 {
    100
}
fn default_delegate_amount() -> u64 {
    50
}
fn default_transfer_amount() -> u64 {
    50
}
fn default_burn_amount() -> u64 {
    25
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            network: NetworkConfig::default(),
            wallet: WalletConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            rpc_url: None,
            commitment: "confirmed".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            keypair_path: Some("wallet.json".to_string()),
            min_sol_balance: 0.5,
            airdrop_sol: 1.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            mint_amount: default_mint_amount(),
            delegate_amount: default_delegate_amount(),
            transfer_amount: default_transfer_amount(),
            burn_amount: default_burn_amount(),
        }
    }
}

impl Config {
    /// Serialize default config to TOML string
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).expect("serialize default config")
    }

    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {:?}: {}", path.as_ref(), e))
        })?;
        let mut cfg: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;
        cfg.merge_env()?;
        Ok(cfg)
    }

    /// Save the configuration to a file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
        std::fs::write(path, content).map_err(|e| {
            Error::ConfigError(format!("Failed to write config file {:?}: {}", path, e))
        })?;
        Ok(())
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        // Try to load from current directory
        if let Ok(config) = Self::from_file("config.toml") {
            return Ok(config);
        }

        // Try to load from user config directory
        if let Some(mut path) = dirs::config_dir() {
            path.push("tokenflow");
            path.push("config.toml");
            if path.exists() {
                return Self::from_file(path);
            }
        }

        // Return default config if no config file found
        let mut config = Self::default();
        config.merge_env()?;
        Ok(config)
    }

    /// Merge environment variables into the configuration
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(cluster) = env::var("SOLANA_CLUSTER") {
            self.network.cluster = Cluster::from_str(&cluster)?;
        }

        if let Ok(rpc_url) = env::var("SOLANA_RPC_URL") {
            self.network.rpc_url = Some(rpc_url);
        }

        if let Ok(private_key) = env::var("WALLET_PRIVATE_KEY") {
            self.wallet.private_key = Some(private_key);
        }

        // Priority env var override for absolute keypair path
        if let Ok(env_keypair) = env::var("SOLANA_KEYPAIR") {
            self.wallet.keypair_path = Some(env_keypair);
        }

        if let Ok(keypair_path) = env::var("WALLET_KEYPAIR_PATH") {
            self.wallet.keypair_path = Some(keypair_path);
        }

        Ok(())
    }

    /// Validate the configuration for required fields and reasonable values
    pub fn validate(&self) -> Result<()> {
        if self.app.log_level.trim().is_empty() {
            return Err(Error::ConfigError("Log level must be set".to_string()));
        }
        if self.network.commitment.trim().is_empty() {
            return Err(Error::ConfigError("Commitment must be set".to_string()));
        }
        if self.network.timeout_seconds == 0 {
            return Err(Error::ConfigError("timeout_seconds must be > 0".to_string()));
        }
        // SPL mints cap out at 9 decimals in practice; amounts above that
        // also risk overflow when scaled into base units
        if self.demo.decimals > 9 {
            return Err(Error::ConfigError("demo.decimals cannot exceed 9".to_string()));
        }
        if self.demo.mint_amount == 0 {
            return Err(Error::ConfigError("demo.mint_amount must be > 0".to_string()));
        }
        if self.demo.transfer_amount > self.demo.delegate_amount {
            return Err(Error::ConfigError(
                "demo.transfer_amount cannot exceed demo.delegate_amount".to_string(),
            ));
        }
        Ok(())
    }

    /// RPC endpoint for the configured cluster, honoring the override
    pub fn resolved_rpc_url(&self) -> String {
        self.network
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.network.cluster.default_rpc_url().to_string())
    }

    /// Solana client settings derived from the network section
    pub fn solana_client_config(&self) -> SolanaClientConfig {
        SolanaClientConfig {
            rpc_url: self.resolved_rpc_url(),
            commitment: self.network.commitment.clone(),
            timeout_seconds: self.network.timeout_seconds,
        }
    }

    /// Decrypt an AES-256-GCM encrypted keypair file. The file format is assumed to be:
    /// [12 bytes nonce][ciphertext...]. The key is derived as SHA-256(passphrase).
    pub fn decrypt_keyfile<P: AsRef<std::path::Path>>(
        path: P, passphrase: &str,
    ) -> Result<Vec<u8>> {
        use aes_gcm::aead::Aead;
        use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
        use sha2::{Digest, Sha256};

        let data = fs::read(path)?;
        if data.len() < 13 {
            return Err(Error::WalletError("Encrypted keyfile too short".into()));
        }
        let (nonce_bytes, cipher_bytes) = data.split_at(12);
        let key = Sha256::digest(passphrase.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| Error::WalletError(format!("AES init error: {e}")))?;
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = cipher
            .decrypt(nonce, cipher_bytes.as_ref())
            .map_err(|e| Error::WalletError(format!("Decrypt error: {e}")))?;
        Ok(plaintext)
    }

    /// Load the payer keypair from the configured source.
    ///
    /// Returns `Ok(None)` when neither a private key nor a keypair file is
    /// present, so the caller can decide to generate a fresh identity.
    pub fn load_keypair(&self) -> Result<Option<Keypair>> {
        // Try to load from private key first
        if let Some(ref private_key) = self.wallet.private_key {
            let bytes: Vec<u8> = bs58::decode(private_key).into_vec()?;
            let keypair = Keypair::from_bytes(&bytes)
                .map_err(|e| Error::WalletError(format!("Keypair from_bytes error: {}", e)))?;
            return Ok(Some(keypair));
        }

        // Then try to load from keypair file
        if let Some(ref keypair_path) = self.wallet.keypair_path {
            if !std::path::Path::new(keypair_path).exists() {
                return Ok(None);
            }

            if let Ok(s) = fs::read_to_string(keypair_path) {
                let trimmed = s.trim();

                // Solana CLI id.json format: a JSON array of 64 bytes
                if trimmed.starts_with('[') {
                    let bytes: Vec<u8> = serde_json::from_str(trimmed)?;
                    let keypair = Keypair::from_bytes(&bytes).map_err(|e| {
                        Error::WalletError(format!("Keypair from_bytes error: {}", e))
                    })?;
                    return Ok(Some(keypair));
                }

                // The format written by `tokenflow init`: a quoted base58 string
                let trimmed = trimmed.trim_matches('"');
                if let Ok(decoded) = bs58::decode(trimmed).into_vec() {
                    if let Ok(kp) = Keypair::from_bytes(&decoded) {
                        return Ok(Some(kp));
                    }
                }
            }

            // If encrypted file (ends with .enc) attempt decryption first
            if keypair_path.ends_with(".enc") {
                if let Ok(pass) = env::var("KEYFILE_PASSPHRASE") {
                    if let Ok(decrypted) = Self::decrypt_keyfile(keypair_path, &pass) {
                        if let Ok(kp) = Keypair::from_bytes(&decrypted) {
                            return Ok(Some(kp));
                        }
                    }
                }
            }

            // Fallback: treat file contents as raw 64-byte keypair bytes
            let keypair_bytes = fs::read(keypair_path)?;
            let keypair = Keypair::from_bytes(&keypair_bytes)
                .map_err(|e| Error::WalletError(format!("Keypair from_bytes error: {}", e)))?;
            return Ok(Some(keypair));
        }

        Ok(None)
    }
}

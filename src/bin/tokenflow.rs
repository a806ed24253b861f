//! CLI entrypoint for tokenflow.
//!
//! With no subcommand it runs the full lifecycle against the configured
//! cluster and exits 0 on success; any step failure is logged and the
//! process exits 1.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

use tokenflow::blockchain::token_ops::SplTokenClient;
use tokenflow::config::Config;
use tokenflow::utils::init_logging;
use tokenflow::wallet;
use tokenflow::{Error, Result, TokenLifecycle};

#[derive(Debug, Parser)]
#[command(name = "tokenflow", author, version, about = "SPL token lifecycle walkthrough", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long, default_value = "config.toml", env = "TOKENFLOW_CONFIG")]
    config: String,

    /// Print the default configuration to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full token lifecycle (the default when no command is given)
    Run,
    /// Generate a default configuration and wallet keypair
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
        /// Output path for keypair file
        #[arg(long, default_value = "wallet.json")]
        keypair: String,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Show the SOL balance of the configured wallet or a given address
    Balance {
        /// Address to query; the configured wallet when omitted
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let args = Args::parse();

    if args.print_default_config {
        println!("{}", Config::default_toml());
        return;
    }

    if let Err(e) = execute(args).await {
        // Errors are logged to stdout; exit non-zero without retrying
        init_logging("info");
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn execute(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Init { config, keypair, force }) => {
            init_logging("info");
            init_workspace(&config, &keypair, force)
        }
        Some(Command::Balance { address }) => {
            let config = load_config(&args.config)?;
            init_logging(&config.app.log_level);
            show_balance(&config, address.as_deref()).await
        }
        Some(Command::Run) | None => {
            let config = load_config(&args.config)?;
            init_logging(&config.app.log_level);
            if !Path::new(&args.config).exists() {
                warn!("Configuration file '{}' not found - using defaults", args.config);
            }
            config.validate()?;
            run_lifecycle(&config).await
        }
    }
}

/// Load the configuration file, falling back to defaults + env overrides
fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path)
    } else {
        let mut config = Config::default();
        config.merge_env()?;
        Ok(config)
    }
}

/// Write a default config file and a fresh keypair
fn init_workspace(config_path: &str, keypair_path: &str, force: bool) -> Result<()> {
    let cfg_path = PathBuf::from(config_path);
    let kp_path = PathBuf::from(keypair_path);

    if (cfg_path.exists() || kp_path.exists()) && !force {
        return Err(Error::InvalidArgument(
            "Config or keypair already exists. Use --force to overwrite.".to_string(),
        ));
    }

    Config::default().save(&cfg_path)?;
    info!("Wrote default config to {}", cfg_path.display());

    let keypair = Keypair::new();
    wallet::persist_keypair(&kp_path, &keypair)?;
    info!("Wrote new keypair to {} (pubkey={})", kp_path.display(), keypair.pubkey());

    Ok(())
}

async fn show_balance(config: &Config, address: Option<&str>) -> Result<()> {
    let rpc = config.solana_client_config().connect()?;

    let pubkey = match address {
        Some(s) => Pubkey::from_str(s)
            .map_err(|e| Error::InvalidArgument(format!("Invalid address {}: {}", s, e)))?,
        None => config
            .load_keypair()?
            .ok_or_else(|| Error::WalletError("No wallet configured".to_string()))?
            .pubkey(),
    };

    let lamports = rpc.get_balance(&pubkey).await?;
    println!("{}: {} SOL", pubkey, lamports_to_sol(lamports));

    Ok(())
}

async fn run_lifecycle(config: &Config) -> Result<()> {
    let cluster = config.network.cluster;
    info!("Connecting to {} ({})", cluster, config.resolved_rpc_url());
    let rpc = Arc::new(config.solana_client_config().connect()?);

    let wallet = wallet::initialize(Arc::clone(&rpc), config).await?;
    let ledger = SplTokenClient::new(rpc, wallet.keypair());

    let lifecycle = TokenLifecycle::new(ledger, config.demo.clone(), cluster);
    lifecycle.run().await?;

    info!("Finished successfully");
    Ok(())
}

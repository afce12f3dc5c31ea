/// Print the addresses derived from the configured seed phrase
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use zeroize::Zeroizing;

use night_consolidate::config::Settings;
use night_consolidate::wallet::derive_wallets;

#[derive(Parser)]
#[command(name = "derive-addresses")]
#[command(about = "List derived wallet addresses without touching the network", version)]
struct Args {
    /// Settings file holding the mnemonic and account count
    #[arg(short, long, default_value = "settings.json")]
    config: PathBuf,

    /// Number of accounts to list instead of gen_end_index
    #[arg(short = 'n', long)]
    count: Option<u32>,
}

fn main() -> Result<()> {
    night_consolidate::init_tracing();
    let args = Args::parse();

    let settings = Settings::load(&args.config)
        .with_context(|| format!("failed to load settings from {}", args.config.display()))?;
    let mnemonic = Zeroizing::new(settings.resolve_mnemonic()?);
    let count = args.count.unwrap_or(settings.gen_end_index);

    println!("=== Deriving {} wallet addresses ===\n", count);
    for wallet in derive_wallets(&mnemonic, count)? {
        println!("{:>4} → {}", wallet.account, wallet.address);
    }

    Ok(())
}

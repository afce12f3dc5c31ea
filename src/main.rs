use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;
use zeroize::Zeroizing;

use night_consolidate::config::{ConsolidateConfig, Settings};
use night_consolidate::consolidate::{Consolidator, RunOutcome};
use night_consolidate::report::{Reporter, TerminalPrompt};
use night_consolidate::wallet::{decode_address, derive_wallets};

const AFTER_HELP: &str = "\
The tool will:
  1. Check earnings for all wallets
  2. Select smallest wallets totaling ~1% of NIGHT for developer donation
  3. Ask for confirmation to donate to developer
  4. Consolidate all other wallets to the destination address
  5. Save a detailed log (consolidate.log by default)";

#[derive(Parser)]
#[command(name = "night-consolidate")]
#[command(about = "Assign Scavenger NIGHT rights from derived wallets to one address", version)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Address that receives the consolidated rights
    #[arg(long, value_name = "ADDR")]
    destination: String,

    /// Settings file (TOML when the name ends in .toml, JSON otherwise)
    #[arg(short, long, default_value = "settings.json")]
    config: PathBuf,

    /// Log file path, overrides the settings file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Scavenger API base URL, overrides the settings file
    #[arg(long, env = "CONSOLIDATE_API_URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    night_consolidate::init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    match run(cli).await {
        Ok(outcome) => {
            if let RunOutcome::Completed(report) = &outcome {
                if let Some(warning) = report.lookup_warning() {
                    println!("{}", warning.yellow());
                }
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Fatal error:".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    decode_address(&cli.destination).context("--destination must be a bech32 addr address")?;

    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;
    if let Some(url) = cli.api_url {
        settings.api.base_url = url;
    }
    if let Some(path) = cli.log_file {
        settings.log_file = path;
    }

    let mnemonic = Zeroizing::new(settings.resolve_mnemonic()?);
    println!(
        "{}",
        format!("Generating {} wallets...", settings.gen_end_index).cyan()
    );
    let mut wallets =
        derive_wallets(&mnemonic, settings.gen_end_index).context("wallet derivation failed")?;
    info!(count = wallets.len(), "derived wallets");

    let consolidator = Consolidator::new(ConsolidateConfig::from(&settings))
        .context("failed to build HTTP client")?;
    let mut reporter = Reporter::terminal();
    consolidator
        .run(&mut wallets, &cli.destination, &mut TerminalPrompt, &mut reporter)
        .await
}

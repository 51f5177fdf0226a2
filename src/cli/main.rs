mod commands;

use anyhow::{Context, Result};
use charge_export::StripeClient;
use clap::Parser;
use commands::Args;

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Resolve the month window before touching the network
    let config = args
        .to_config()
        .with_context(|| format!("Invalid --select-month {:?}", args.select_month))?;
    log::info!("Exporting charges for {} as {:?}", config.range, config.mode);

    // 2. Fetch the month's charges and export them to stdout
    let client = StripeClient::new(&config.api_key, &config.api_base)
        .context("Failed to create the Stripe client")?;
    let exported = charge_export::run(&config, client, std::io::stdout().lock())
        .with_context(|| format!("Failed to export charges for {}", config.range))?;

    log::info!("Done, {exported} charges exported");

    Ok(())
}

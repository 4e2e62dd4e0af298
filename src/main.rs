mod config;
mod csv_io;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliConfig, Config};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{info, warn};
use transfer_engine::{apply_transfers, error::ApplyError};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CliConfig::parse();

    process_batch(&config)?;

    info!("Processing completed successfully");

    Ok(())
}

fn open(path: &Path, what: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {what} file {}", path.display()))
}

fn process_batch<C: Config>(config: &C) -> Result<()> {
    let stdout = io::stdout();

    transfer_batch(
        open(config.accounts_path(), "accounts")?,
        open(config.record_path(), "record")?,
        open(config.batch_path(), "batch")?,
        stdout.lock(),
        config.check_only(),
    )
}

/// Loads the inputs, applies the batch and writes the updated record to `output`.
/// With `check_only` nothing is written.
fn transfer_batch<A, R, B, W>(
    accounts: A,
    record: R,
    batch: B,
    output: W,
    check_only: bool,
) -> Result<()>
where
    A: io::Read,
    R: io::Read,
    B: io::Read,
    W: io::Write,
{
    let accounts = csv_io::read_accounts(accounts).context("Failed to read accounts")?;
    let record = csv_io::read_record(record).context("Failed to read record")?;
    let batch = csv_io::read_batch(batch).context("Failed to read batch")?;

    info!(
        "Loaded {} accounts, {} record fields, {} transfers",
        accounts.bindings().len(),
        record.len(),
        batch.len()
    );

    let updated = apply_transfers(&accounts, &record, &batch).inspect_err(|e| match e {
        ApplyError::Transfer(failure) => {
            warn!(code = failure.kind.code(), "Transfer batch rejected: {failure}");
        }
        ApplyError::Registry(e) => warn!("Account configuration does not match record: {e}"),
    })?;

    let changed = updated
        .iter()
        .filter(|(field_id, value)| record.get(field_id) != Some(*value))
        .count();

    if check_only {
        info!("Batch is valid, {changed} fields would change");

        return Ok(());
    }

    info!("Applied {} transfers, {changed} fields changed", batch.len());

    csv_io::write_record(output, &updated)
}

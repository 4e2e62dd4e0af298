use clap::Parser;
use std::path::{Path, PathBuf};

/// Trait for reading configuration parameters
pub trait Config {
    fn batch_path(&self) -> &Path;
    fn accounts_path(&self) -> &Path;
    fn record_path(&self) -> &Path;
    fn check_only(&self) -> bool;
}

/// CLI configuration
#[derive(Parser, Debug)]
#[command(
    name = "stock-transfer",
    about = "Validates a batch of stock transfers and applies it to a record snapshot",
    version
)]
pub struct CliConfig {
    /// Path to the CSV batch of transfers (source,dest,amount)
    #[arg(value_name = "BATCH_FILE")]
    batch_file: PathBuf,

    /// Account table mapping logical names to record fields (logical_name,field_id)
    #[arg(long, value_name = "FILE", default_value = "accounts.csv")]
    accounts: PathBuf,

    /// Record snapshot holding current field values (field_id,value)
    #[arg(long, value_name = "FILE", default_value = "record.csv")]
    record: PathBuf,

    /// Validate the batch without writing the updated record
    #[arg(long)]
    check: bool,
}

impl Config for CliConfig {
    fn batch_path(&self) -> &Path {
        &self.batch_file
    }

    fn accounts_path(&self) -> &Path {
        &self.accounts
    }

    fn record_path(&self) -> &Path {
        &self.record
    }

    fn check_only(&self) -> bool {
        self.check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["stock-transfer", "batch.csv"]);

        assert_eq!(config.batch_path(), Path::new("batch.csv"));
        assert_eq!(config.accounts_path(), Path::new("accounts.csv"));
        assert_eq!(config.record_path(), Path::new("record.csv"));
        assert!(!config.check_only());
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::parse_from([
            "stock-transfer",
            "--accounts",
            "tenant/accounts.csv",
            "--record",
            "snapshots/42.csv",
            "--check",
            "batch.csv",
        ]);

        assert_eq!(config.accounts_path(), Path::new("tenant/accounts.csv"));
        assert_eq!(config.record_path(), Path::new("snapshots/42.csv"));
        assert!(config.check_only());
    }
}

pub mod engine;
pub mod error;
pub mod registry;
pub mod transfer;
pub mod validate;

use engine::TransferBatchProcessor;
use error::ApplyError;
use registry::AccountRegistry;
use transfer::{AccountConfig, Record, TransferBatch};

/// Validates and applies a batch against a record snapshot.
///
/// Returns a new record with updated balances for every touched account.
/// On any failure nothing from the batch is kept: the working balances are
/// dropped and the caller's record is left as it was.
pub fn apply_transfers(
    config: &AccountConfig,
    record: &Record,
    batch: &TransferBatch,
) -> Result<Record, ApplyError> {
    let mut registry = AccountRegistry::new(config, record)?;

    TransferBatchProcessor::new().validate_and_apply(batch, &mut registry)?;

    let mut updated = record.clone();
    registry.write_back(&mut updated);

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, RegistryError, TransferFailure};
    use crate::transfer::{AccountBinding, RawTransfer};

    fn config() -> AccountConfig {
        vec![
            AccountBinding::new("A", "stock_a"),
            AccountBinding::new("B", "stock_b"),
            AccountBinding::new("C", "stock_c"),
        ]
        .into_iter()
        .collect()
    }

    fn record(a: &str, b: &str, c: &str) -> Record {
        [
            ("stock_a", a),
            ("stock_b", b),
            ("stock_c", c),
            ("item_code", "SKU-001"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_success_updates_touched_fields_only() {
        let record = record("10", "", "4");
        let batch = TransferBatch::new([RawTransfer::new("A", "B", "5")]);

        let updated = apply_transfers(&config(), &record, &batch).unwrap();

        assert_eq!(updated.get("stock_a"), Some("5"));
        assert_eq!(updated.get("stock_b"), Some("5"));
        assert_eq!(updated.get("stock_c"), Some("4"));
        assert_eq!(updated.get("item_code"), Some("SKU-001"));
        // input snapshot untouched
        assert_eq!(record.get("stock_a"), Some("10"));
    }

    #[test]
    fn test_chain_returning_to_start() {
        let record = record("10", "0", "0");
        let batch = TransferBatch::new([
            RawTransfer::new("A", "B", 5),
            RawTransfer::new("B", "A", 5),
        ]);

        let updated = apply_transfers(&config(), &record, &batch).unwrap();

        assert_eq!(updated.get("stock_a"), Some("10"));
        assert_eq!(updated.get("stock_b"), Some("0"));
    }

    #[test]
    fn test_failure_discards_whole_batch() {
        let record = record("10", "0", "0");
        let batch = TransferBatch::new([
            RawTransfer::new("A", "B", 4),
            RawTransfer::new("B", "C", 9),
        ]);

        let err = apply_transfers(&config(), &record, &batch).unwrap_err();

        assert_eq!(
            err,
            ApplyError::Transfer(TransferFailure::new(
                2,
                FailureKind::InsufficientBalance {
                    balance: 4,
                    amount: 9
                }
            ))
        );
        assert_eq!(err.to_string(), "row 2: insufficient balance (balance=4, amount=9)");
        assert_eq!(record.get("stock_a"), Some("10"));
        assert_eq!(record.get("stock_b"), Some("0"));
    }

    #[test]
    fn test_unknown_account_reports_raw_name() {
        let record = record("10", "0", "0");
        let batch = TransferBatch::new([RawTransfer::new("A", "Z", 5)]);

        let err = apply_transfers(&config(), &record, &batch).unwrap_err();
        assert_eq!(err.to_string(), "row 1: unknown account (Z)");
    }

    #[test]
    fn test_bad_configuration_is_not_a_row_error() {
        let record: Record = [("stock_a", "10")].into_iter().collect();
        let batch = TransferBatch::new([RawTransfer::new("A", "B", 1)]);

        let err = apply_transfers(&config(), &record, &batch).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::Registry(RegistryError::MissingField { .. })
        ));
    }
}

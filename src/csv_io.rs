use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io;
use transfer_engine::transfer::{
    AccountBinding, AccountConfig, AmountInput, RawTransfer, Record, TransferBatch,
};

#[derive(Debug, Deserialize)]
struct FieldIn {
    field_id: String,
    #[serde(default)]
    value: String,
}

/// Batch line with every cell read as text, so csv never guesses a type for the amount
#[derive(Debug, Deserialize)]
struct BatchLine {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    dest: Option<String>,
    #[serde(default)]
    amount: Option<String>,
}

impl From<BatchLine> for RawTransfer {
    fn from(line: BatchLine) -> Self {
        Self {
            source: line.source,
            dest: line.dest,
            amount: line.amount.map(AmountInput::Text),
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldOut<'a> {
    field_id: &'a str,
    value: &'a str,
}

fn reader<R: io::Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Reads the `logical_name,field_id` account table
pub fn read_accounts<R: io::Read>(input: R) -> Result<AccountConfig> {
    reader(input)
        .into_deserialize::<AccountBinding>()
        .enumerate()
        .map(|(i, result)| result.with_context(|| format!("Invalid account entry {}", i + 1)))
        .collect()
}

/// Reads the `field_id,value` record snapshot
pub fn read_record<R: io::Read>(input: R) -> Result<Record> {
    reader(input)
        .into_deserialize::<FieldIn>()
        .enumerate()
        .map(|(i, result)| {
            result
                .map(|field| (field.field_id, field.value))
                .with_context(|| format!("Invalid record field {}", i + 1))
        })
        .collect()
}

/// Reads the `source,dest,amount` batch. Blank cells become absent values and
/// amounts stay as submitted text for the engine to parse.
///
/// A single unreadable line fails the whole batch.
pub fn read_batch<R: io::Read>(input: R) -> Result<TransferBatch> {
    reader(input)
        .into_deserialize::<BatchLine>()
        .enumerate()
        .map(|(i, result)| {
            result
                .map(RawTransfer::from)
                .with_context(|| format!("Failed to parse row {}", i + 1))
        })
        .collect()
}

/// Writes the record back as `field_id,value`
pub fn write_record<W: io::Write>(output: W, record: &Record) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(output);

    for (field_id, value) in record.iter() {
        writer
            .serialize(FieldOut { field_id, value })
            .context("Failed to serialize record field")?;
    }

    writer.flush().context("Failed to flush record")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use transfer_engine::apply_transfers;
    use transfer_engine::error::{ApplyError, FailureKind, TransferFailure};

    #[test]
    fn test_read_accounts() {
        let input = "logical_name,field_id\nStore , stock_store\nOnline,stock_online\n";

        let config = read_accounts(input.as_bytes()).unwrap();

        assert_eq!(
            config.bindings(),
            &[
                AccountBinding::new("Store", "stock_store"),
                AccountBinding::new("Online", "stock_online"),
            ]
        );
    }

    #[test]
    fn test_read_record_keeps_blank_values() {
        let input = "field_id,value\nstock_store,10\nstock_online,\n";

        let record = read_record(input.as_bytes()).unwrap();

        assert_eq!(record.get("stock_store"), Some("10"));
        assert_eq!(record.get("stock_online"), Some(""));
    }

    #[test]
    fn test_read_batch() {
        let input = "source,dest,amount\nStore,Online,5\nOnline,Store,2.5\nStore,,abc\n";

        let batch = read_batch(input.as_bytes()).unwrap();
        let rows = batch.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].source(), Some("Store"));
        assert_eq!(rows[0].amount(), Some(&AmountInput::Text("5".to_string())));
        assert_eq!(rows[1].amount(), Some(&AmountInput::Text("2.5".to_string())));
        assert_eq!(rows[2].dest(), None);
        assert_eq!(rows[2].amount(), Some(&AmountInput::Text("abc".to_string())));
        assert_eq!(rows[2].index(), 3);
    }

    #[test]
    fn test_large_amount_moves_exact_quantity() {
        let accounts = read_accounts("logical_name,field_id\nA,fa\nB,fb\n".as_bytes()).unwrap();
        let record = read_record("field_id,value\nfa,18446744073709551615\nfb,0\n".as_bytes())
            .unwrap();
        let batch = read_batch("source,dest,amount\nA,B,10000000000000000001\n".as_bytes())
            .unwrap();

        assert_eq!(
            batch.rows()[0].amount(),
            Some(&AmountInput::Text("10000000000000000001".to_string()))
        );

        let updated = apply_transfers(&accounts, &record, &batch).unwrap();
        assert_eq!(updated.get("fa"), Some("8446744073709551614"));
        assert_eq!(updated.get("fb"), Some("10000000000000000001"));
    }

    #[test]
    fn test_non_numeric_amount_is_a_row_failure() {
        let accounts = read_accounts("logical_name,field_id\nA,fa\nB,fb\n".as_bytes()).unwrap();
        let record = read_record("field_id,value\nfa,10\nfb,0\n".as_bytes()).unwrap();

        for token in ["true", "false", "n/a"] {
            let input = format!("source,dest,amount\nA,B,{token}\n");
            let batch = read_batch(input.as_bytes()).unwrap();

            let err = apply_transfers(&accounts, &record, &batch).unwrap_err();
            assert_eq!(
                err,
                ApplyError::Transfer(TransferFailure::new(
                    1,
                    FailureKind::InvalidAmount(token.to_string())
                ))
            );
            assert_eq!(err.to_string(), format!("row 1: invalid amount ({token})"));
        }
    }

    #[test]
    fn test_read_batch_rejects_malformed_line() {
        let input = "source,dest,amount\nStore,Online,5\nStore,Online,5,extra\n";

        let err = read_batch(input.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse row 2");
    }

    #[test]
    fn test_write_record() {
        let record: Record = [("stock_b", "5"), ("stock_a", "5")].into_iter().collect();
        let mut out = Vec::new();

        write_record(&mut out, &record).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "field_id,value\nstock_a,5\nstock_b,5\n"
        );
    }
}

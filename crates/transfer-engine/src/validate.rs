//! Row-level checks. Nothing here mutates the registry.

use crate::error::{FailureKind, RowField};
use crate::registry::{AccountId, AccountRegistry};
use crate::transfer::{AmountInput, TransferRow};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Largest whole number an `f64` holds exactly (2^53 - 1)
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_991.0;

/// Row with present fields and a usable amount, not yet checked against balances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellFormed<'a> {
    pub source: &'a str,
    pub dest: &'a str,
    pub amount: u64,
}

/// Row that passed every check and can be applied as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidTransfer {
    pub source: AccountId,
    pub dest: AccountId,
    pub amount: u64,
}

/// Runs every check in order and stops at the first violation
pub fn validate_row(
    row: &TransferRow,
    registry: &AccountRegistry,
) -> Result<ValidTransfer, FailureKind> {
    let row = check_structure(row)?;
    check_distinct(&row)?;
    let (source, dest) = check_known(&row, registry)?;
    check_funds(registry, source, dest, row.amount)?;

    Ok(ValidTransfer {
        source,
        dest,
        amount: row.amount,
    })
}

/// Presence of every field, then amount parsing
pub fn check_structure(row: &TransferRow) -> Result<WellFormed<'_>, FailureKind> {
    let source = present(row.source()).ok_or(FailureKind::MissingField(RowField::Source))?;
    let dest = present(row.dest()).ok_or(FailureKind::MissingField(RowField::Dest))?;
    let amount = row
        .amount()
        .ok_or(FailureKind::MissingField(RowField::Amount))?;

    Ok(WellFormed {
        source,
        dest,
        amount: parse_amount(amount)?,
    })
}

pub fn check_distinct(row: &WellFormed<'_>) -> Result<(), FailureKind> {
    if row.source == row.dest {
        return Err(FailureKind::SameAccount);
    }

    Ok(())
}

/// Resolves source first, so an unknown source is reported even if dest is unknown too
pub fn check_known(
    row: &WellFormed<'_>,
    registry: &AccountRegistry,
) -> Result<(AccountId, AccountId), FailureKind> {
    Ok((registry.resolve(row.source)?, registry.resolve(row.dest)?))
}

/// Source must cover the amount and dest must be able to absorb it
pub fn check_funds(
    registry: &AccountRegistry,
    source: AccountId,
    dest: AccountId,
    amount: u64,
) -> Result<(), FailureKind> {
    let balance = registry.balance(source);
    if balance < amount {
        return Err(FailureKind::InsufficientBalance { balance, amount });
    }

    let balance = registry.balance(dest);
    if balance.checked_add(amount).is_none() {
        return Err(FailureKind::BalanceOverflow { balance, amount });
    }

    Ok(())
}

/// Accepts positive whole numbers only. `"5"`, `"5.0"` and `5.0` are all 5.
///
/// Float inputs above 2^53 - 1 are rejected since they may already be rounded;
/// submit large quantities as text.
pub fn parse_amount(input: &AmountInput) -> Result<u64, FailureKind> {
    let invalid = || FailureKind::InvalidAmount(input.to_string());

    match input {
        AmountInput::Integer(n) => u64::try_from(*n)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(invalid),
        AmountInput::Number(n) => {
            if !n.is_finite() || n.fract() != 0.0 || *n < 1.0 || *n > MAX_EXACT_FLOAT {
                return Err(invalid());
            }
            Decimal::from_f64_retain(*n)
                .and_then(|d| d.to_u64())
                .ok_or_else(invalid)
        }
        AmountInput::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(FailureKind::MissingField(RowField::Amount));
            }

            let decimal = Decimal::from_str(trimmed).map_err(|_| invalid())?;
            if !decimal.fract().is_zero() || decimal <= Decimal::ZERO {
                return Err(invalid());
            }

            decimal.to_u64().ok_or_else(invalid)
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

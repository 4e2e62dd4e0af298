use crate::error::{BalanceError, FailureKind, RegistryError};
use crate::transfer::{AccountConfig, Record};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Handle to an account inside the registry that issued it.
///
/// Ids are positions, so an id from another registry either panics on
/// lookup or names a different account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(usize);

/// Stock quantity held for one sales channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    name: String,
    field_id: String,
    balance: u64,
    touched: bool,
}

impl Account {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Whether any applied row moved stock in or out of this account
    pub const fn touched(&self) -> bool {
        self.touched
    }
}

/// Working balances for one submission, resolved by logical name or field id
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    by_name: HashMap<String, AccountId>,
    by_field: HashMap<String, AccountId>,
}

impl AccountRegistry {
    /// Builds the registry from the account table and the record's current values.
    ///
    /// A blank field value reads as zero.
    pub fn new(config: &AccountConfig, record: &Record) -> Result<Self, RegistryError> {
        let bindings = config.bindings();
        let mut accounts = Vec::with_capacity(bindings.len());
        let mut by_name = HashMap::with_capacity(bindings.len());
        let mut by_field = HashMap::with_capacity(bindings.len());

        for binding in bindings {
            let id = AccountId(accounts.len());

            if by_name.insert(binding.logical_name.clone(), id).is_some() {
                return Err(RegistryError::DuplicateAccount(binding.logical_name.clone()));
            }
            if by_field.insert(binding.field_id.clone(), id).is_some() {
                return Err(RegistryError::DuplicateField(binding.field_id.clone()));
            }

            let value = record
                .get(&binding.field_id)
                .ok_or_else(|| RegistryError::MissingField {
                    account: binding.logical_name.clone(),
                    field: binding.field_id.clone(),
                })?;

            accounts.push(Account {
                name: binding.logical_name.clone(),
                field_id: binding.field_id.clone(),
                balance: parse_balance(&binding.field_id, value)?,
                touched: false,
            });
        }

        Ok(Self {
            accounts,
            by_name,
            by_field,
        })
    }

    /// Exact, case-sensitive lookup by logical name
    pub fn resolve(&self, name: &str) -> Result<AccountId, FailureKind> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| FailureKind::UnknownAccount(name.to_string()))
    }

    pub fn by_field(&self, field_id: &str) -> Option<AccountId> {
        self.by_field.get(field_id).copied()
    }

    /// # Panics
    ///
    /// If `id` was issued by a registry with more accounts than this one.
    pub fn account(&self, id: AccountId) -> &Account {
        &self.accounts[id.0]
    }

    /// Current balance, including rows already applied in this batch
    ///
    /// # Panics
    ///
    /// If `id` was issued by a registry with more accounts than this one.
    pub fn balance(&self, id: AccountId) -> u64 {
        self.accounts[id.0].balance
    }

    /// Balance by logical name, if the name is known
    pub fn get(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).map(|id| self.balance(*id))
    }

    /// Accounts in configuration order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Sum of every balance. Stays constant across applied transfers.
    pub fn total(&self) -> u128 {
        self.accounts.iter().map(|a| u128::from(a.balance)).sum()
    }

    pub(crate) fn debit(&mut self, id: AccountId, amount: u64) -> Result<u64, BalanceError> {
        let account = &mut self.accounts[id.0];
        let balance = account
            .balance
            .checked_sub(amount)
            .ok_or(BalanceError::Underflow {
                balance: account.balance,
                amount,
            })?;
        account.balance = balance;
        account.touched = true;

        Ok(account.balance)
    }

    pub(crate) fn credit(&mut self, id: AccountId, amount: u64) -> Result<u64, BalanceError> {
        let account = &mut self.accounts[id.0];
        let balance = account
            .balance
            .checked_add(amount)
            .ok_or(BalanceError::Overflow {
                balance: account.balance,
                amount,
            })?;
        account.balance = balance;
        account.touched = true;

        Ok(account.balance)
    }

    /// Writes the balance of every touched account into its record field
    pub fn write_back(&self, record: &mut Record) {
        for account in self.accounts.iter().filter(|a| a.touched) {
            record.set(account.field_id.clone(), account.balance.to_string());
        }
    }
}

fn parse_balance(field_id: &str, value: &str) -> Result<u64, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = || RegistryError::InvalidBalance {
        field: field_id.to_string(),
        value: value.to_string(),
    };

    let decimal = Decimal::from_str(trimmed).map_err(|_| invalid())?;
    if !decimal.fract().is_zero() {
        return Err(invalid());
    }

    decimal.to_u64().ok_or_else(invalid)
}

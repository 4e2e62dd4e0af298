use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Submitted amount, as text or as a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AmountInput {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for AmountInput {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for AmountInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Transfer instruction as submitted, before it gets a position in a batch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTransfer {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountInput>,
}

impl RawTransfer {
    pub fn new(
        source: impl Into<String>,
        dest: impl Into<String>,
        amount: impl Into<AmountInput>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            dest: Some(dest.into()),
            amount: Some(amount.into()),
        }
    }
}

/// One row of a batch. Values are kept exactly as submitted; validation
/// happens when the batch is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRow {
    index: usize,
    source: Option<String>,
    dest: Option<String>,
    amount: Option<AmountInput>,
}

impl TransferRow {
    /// 1-based position in the batch
    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    pub const fn amount(&self) -> Option<&AmountInput> {
        self.amount.as_ref()
    }
}

/// Ordered transfer rows submitted together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferBatch {
    rows: Vec<TransferRow>,
}

impl TransferBatch {
    pub fn new(inputs: impl IntoIterator<Item = RawTransfer>) -> Self {
        let rows = inputs
            .into_iter()
            .enumerate()
            .map(|(i, raw)| TransferRow {
                index: i + 1,
                source: raw.source,
                dest: raw.dest,
                amount: raw.amount,
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[TransferRow] {
        &self.rows
    }

    /// Row by 1-based position
    pub fn row(&self, index: usize) -> Option<&TransferRow> {
        index.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<RawTransfer> for TransferBatch {
    fn from_iter<I: IntoIterator<Item = RawTransfer>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Binds a logical account name to the record field holding its balance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountBinding {
    pub logical_name: String,
    pub field_id: String,
}

impl AccountBinding {
    pub fn new(logical_name: impl Into<String>, field_id: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            field_id: field_id.into(),
        }
    }
}

/// Per-deployment account table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AccountConfig {
    bindings: Vec<AccountBinding>,
}

impl AccountConfig {
    pub const fn new(bindings: Vec<AccountBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[AccountBinding] {
        &self.bindings
    }
}

impl FromIterator<AccountBinding> for AccountConfig {
    fn from_iter<I: IntoIterator<Item = AccountBinding>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Host record snapshot: field id to textual field value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.fields.get(field_id).map(String::as_str)
    }

    pub fn set(&mut self, field_id: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field_id.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

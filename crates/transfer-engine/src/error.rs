use thiserror::Error;

/// Which part of a transfer row was absent or blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Source,
    Dest,
    Amount,
}

impl RowField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Dest => "dest",
            Self::Amount => "amount",
        }
    }
}

/// Reason a single transfer row was rejected
///
/// The `Display` output is the user-facing reason shown after `row N: `.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    #[error("missing field ({})", .0.as_str())]
    MissingField(RowField),

    #[error("invalid amount ({0})")]
    InvalidAmount(String),

    #[error("same account")]
    SameAccount,

    #[error("unknown account ({0})")]
    UnknownAccount(String),

    #[error("insufficient balance (balance={balance}, amount={amount})")]
    InsufficientBalance { balance: u64, amount: u64 },

    #[error("balance overflow (balance={balance}, amount={amount})")]
    BalanceOverflow { balance: u64, amount: u64 },
}

impl FailureKind {
    /// Stable code for hosts that branch on the failure instead of showing it
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
        }
    }
}

/// First failing row of a batch. Rendered as `row <N>: <reason>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {kind}")]
pub struct TransferFailure {
    /// 1-based position of the offending row
    pub row: usize,
    pub kind: FailureKind,
}

impl TransferFailure {
    pub const fn new(row: usize, kind: FailureKind) -> Self {
        Self { row, kind }
    }
}

/// Errors raised while building an account registry from configuration and a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("account {0} is configured more than once")]
    DuplicateAccount(String),

    #[error("field {0} is bound to more than one account")]
    DuplicateField(String),

    #[error("record has no field {field} for account {account}")]
    MissingField { account: String, field: String },

    #[error("field {field} holds an invalid balance ({value})")]
    InvalidBalance { field: String, value: String },
}

/// Low-level arithmetic failure on a single balance slot
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceError {
    #[error("balance {balance} cannot cover {amount}")]
    Underflow { balance: u64, amount: u64 },

    #[error("balance {balance} cannot absorb {amount}")]
    Overflow { balance: u64, amount: u64 },
}

impl From<BalanceError> for FailureKind {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Underflow { balance, amount } => {
                Self::InsufficientBalance { balance, amount }
            }
            BalanceError::Overflow { balance, amount } => Self::BalanceOverflow { balance, amount },
        }
    }
}

/// Error returned by [`crate::apply_transfers`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Transfer(#[from] TransferFailure),
}

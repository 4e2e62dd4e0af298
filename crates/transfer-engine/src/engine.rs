use crate::error::{FailureKind, TransferFailure};
use crate::registry::AccountRegistry;
use crate::transfer::{TransferBatch, TransferRow};
use crate::validate::{validate_row, ValidTransfer};
use tracing::debug;

/// Progress of one batch. Row numbers are 1-based.
///
/// `Idle -> Validating(1) -> Applied(1) -> Validating(2) -> ... -> Completed`,
/// or `Validating(i) -> Failed` on the first bad row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Validating(usize),
    Applied(usize),
    Completed,
    Failed(TransferFailure),
}

impl BatchState {
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Summary of a fully applied batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub total: u128,
}

/// Steps a batch through validate-then-apply, one transition at a time.
///
/// Rows applied before a failing row stay applied to the registry.
pub struct BatchRun<'a> {
    batch: &'a TransferBatch,
    registry: &'a mut AccountRegistry,
    state: BatchState,
    opening_total: u128,
}

impl<'a> BatchRun<'a> {
    pub fn new(batch: &'a TransferBatch, registry: &'a mut AccountRegistry) -> Self {
        let opening_total = registry.total();

        Self {
            batch,
            registry,
            state: BatchState::Idle,
            opening_total,
        }
    }

    pub const fn state(&self) -> &BatchState {
        &self.state
    }

    /// Balances as of the current state
    pub fn registry(&self) -> &AccountRegistry {
        self.registry
    }

    /// Advances by one transition. Terminal states stay put.
    pub fn step(&mut self) -> &BatchState {
        self.state = match self.state {
            BatchState::Idle => self.next_row(1),
            BatchState::Validating(row) => self.apply_row(row),
            BatchState::Applied(row) => self.next_row(row + 1),
            BatchState::Completed | BatchState::Failed(_) => return &self.state,
        };

        &self.state
    }

    /// Runs to a terminal state
    pub fn finish(mut self) -> Result<BatchOutcome, TransferFailure> {
        while !self.step().is_terminal() {}

        match self.state {
            BatchState::Failed(failure) => Err(failure),
            _ => Ok(BatchOutcome {
                applied: self.batch.len(),
                total: self.registry.total(),
            }),
        }
    }

    fn next_row(&self, row: usize) -> BatchState {
        if row <= self.batch.len() {
            return BatchState::Validating(row);
        }

        debug_assert_eq!(
            self.registry.total(),
            self.opening_total,
            "transfers must conserve total stock"
        );
        debug!(rows = self.batch.len(), total = %self.opening_total, "transfer batch completed");

        BatchState::Completed
    }

    fn apply_row(&mut self, row: usize) -> BatchState {
        let Some(transfer_row) = self.batch.row(row) else {
            return self.next_row(row);
        };

        match process_row(self.registry, transfer_row) {
            Ok(transfer) => {
                debug!(
                    row,
                    source = self.registry.account(transfer.source).name(),
                    dest = self.registry.account(transfer.dest).name(),
                    amount = transfer.amount,
                    "transfer applied"
                );
                BatchState::Applied(row)
            }
            Err(kind) => {
                let failure = TransferFailure::new(row, kind);
                debug!(code = failure.kind.code(), "{failure}");
                BatchState::Failed(failure)
            }
        }
    }
}

/// Validates one row against current balances and applies it.
///
/// `validate_row` has already checked both sides, so the debit/credit pair
/// either both succeed or the row is rejected before either runs.
fn process_row(
    registry: &mut AccountRegistry,
    row: &TransferRow,
) -> Result<ValidTransfer, FailureKind> {
    let transfer = validate_row(row, registry)?;

    registry.debit(transfer.source, transfer.amount)?;
    registry.credit(transfer.dest, transfer.amount)?;

    Ok(transfer)
}

/// Drives whole batches against a registry
#[derive(Debug, Default, Clone, Copy)]
pub struct TransferBatchProcessor;

impl TransferBatchProcessor {
    pub const fn new() -> Self {
        Self
    }

    /// Applies rows in order, each seeing the balances left by the previous one.
    /// Stops at the first invalid row without touching the rows after it.
    pub fn validate_and_apply(
        &self,
        batch: &TransferBatch,
        registry: &mut AccountRegistry,
    ) -> Result<BatchOutcome, TransferFailure> {
        BatchRun::new(batch, registry).finish()
    }
}

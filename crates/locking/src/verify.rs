//! Expected-value verification: the compare-and-swap surrogate.
//!
//! The backing store has no atomic check-and-set, so "no one else wrote
//! here since I last looked" is established by re-reading the cell under
//! quorum consistency immediately before the mutation phase begins and
//! comparing byte-for-byte against what the caller recorded.

use smallvec::SmallVec;
use std::time::Duration;
use tracing::debug;
use verilock_core::{
    run_with_budget, BackendError, Buffer, ExpectedValue, KeyColumn, Result, StoreTransaction,
    VerifiableStore,
};

/// Verify that `cell` on `store` still holds `expected`.
///
/// Issues a single-column range read `[column, successor(column))` through
/// the strongly consistent transaction, bounded by `budget`. Entries whose
/// column is not byte-identical to the target are discarded before
/// comparison; backends may return lexicographic neighbors for a half-open
/// range. The surviving values, in returned order, must equal the expected
/// sequence exactly: empty for an `Absent` expectation, the single recorded
/// value otherwise.
///
/// A divergence raises a permanent [`BackendError::ExpectedValueMismatch`]
/// carrying the cell, the store name, and both sequences. Deadline overruns
/// and transport faults surface as transient errors from the bounded read.
pub fn check_expected_value<T: StoreTransaction>(
    store: &dyn VerifiableStore<T>,
    cell: &KeyColumn,
    expected: &ExpectedValue,
    strong: &mut T,
    budget: Duration,
) -> Result<()> {
    let upper = cell.column.successor();
    let entries = run_with_budget("expected value read", budget, || {
        store.range_read(&cell.key, &cell.column, &upper, strong)
    })?;

    let mut actual: SmallVec<[Buffer; 1]> = SmallVec::new();
    for entry in entries {
        if entry.column != cell.column {
            debug!(
                "dropping entry at column {} (only accepting column {})",
                entry.column, cell.column
            );
            continue;
        }
        actual.push(entry.value);
    }

    let expected_seq = expected.as_sequence();
    if expected_seq != actual {
        return Err(BackendError::ExpectedValueMismatch {
            store: store.name().to_owned(),
            cell: cell.clone(),
            expected: expected_seq.into_vec(),
            actual: actual.into_vec(),
        });
    }
    Ok(())
}

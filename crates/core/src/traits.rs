//! Collaborator contracts consumed by the locking protocol.
//!
//! The protocol composes two externally supplied pieces: a key-column store
//! with quorum-consistent reads and a mutual-exclusion provider. Both are
//! modeled as traits here so the transaction layer stays independent of any
//! concrete backend.
//!
//! All traits are parameterized over the backend's transaction type `T`.
//! The weakly and strongly consistent transactions of one verifying
//! transaction are both values of `T`, opened with different consistency
//! configurations against the same backend.

use crate::buffer::Buffer;
use crate::cell::{Entry, KeyColumn, KeySliceQuery};
use crate::config::TransactionConfig;
use crate::error::{BackendError, Result};
use crate::expected::ExpectedValue;

/// One transaction handle on the backing store.
///
/// No consistency guarantee is assumed at this level; the consistency of a
/// given handle is fixed when the backend opens it.
pub trait StoreTransaction {
    /// Make the transaction's writes durable.
    fn commit(&mut self) -> Result<()>;

    /// Discard the transaction's writes.
    fn rollback(&mut self) -> Result<()>;

    /// Configuration this transaction was opened with.
    fn config(&self) -> &TransactionConfig;
}

/// External mutual-exclusion provider for one store.
///
/// The concrete algorithm (ownership tokens, expiry, dead-holder recovery)
/// is not specified here. Lock traffic always rides the strongly consistent
/// transaction so that releases become final together with its commit.
pub trait Locker<T: StoreTransaction> {
    /// Claim a lock on `cell` for the transaction behind `strong`.
    fn write_lock(&self, cell: &KeyColumn, strong: &mut T) -> Result<()>;

    /// Confirm that every lock the transaction behind `strong` wrote is
    /// still validly held: not expired, not stolen. Raises on the first
    /// lock that is not.
    fn check_locks(&self, strong: &mut T) -> Result<()>;

    /// Release every lock the transaction behind `strong` wrote.
    /// Best-effort and idempotent.
    fn delete_locks(&self, strong: &mut T) -> Result<()>;
}

/// The backing key-column store surface needed by the locking protocol.
pub trait KeyColumnStore<T: StoreTransaction> {
    /// Diagnostic name. Unique among the stores one transaction touches.
    fn name(&self) -> &str;

    /// Read the entries of one row whose columns fall in `[lower, upper)`,
    /// in column order. An empty result is zero entries, not a fault.
    fn get_slice(&self, query: &KeySliceQuery, txn: &mut T) -> Result<Vec<Entry>>;

    /// Apply additions and deletions to one row.
    fn mutate(
        &self,
        key: Buffer,
        additions: Vec<Entry>,
        deletions: Vec<Buffer>,
        txn: &mut T,
    ) -> Result<()>;

    /// Native lock hook for backends that implement their own locking.
    /// Stores without one report the operation as unsupported.
    fn acquire_lock(
        &self,
        key: Buffer,
        column: Buffer,
        expected: ExpectedValue,
        txn: &mut T,
    ) -> Result<()> {
        let _ = (key, column, expected, txn);
        Err(BackendError::Unsupported {
            op: "native acquire_lock",
        })
    }
}

/// The store surface the verifying transaction itself consumes: verification
/// reads, lock release, and the optional lock collaborator.
pub trait VerifiableStore<T: StoreTransaction> {
    /// Diagnostic name, used as the store's handle in the expectation table.
    fn name(&self) -> &str;

    /// Read `[lower, upper)` of row `key` under the strongly consistent
    /// transaction.
    fn range_read(
        &self,
        key: &Buffer,
        lower: &Buffer,
        upper: &Buffer,
        strong: &mut T,
    ) -> Result<Vec<Entry>>;

    /// Release every lock the transaction holds on this store. Best-effort
    /// and idempotent.
    fn release_locks(&self, strong: &mut T) -> Result<()>;

    /// The store's lock collaborator, if it has one. Stores without one are
    /// skipped by lock verification.
    fn locker(&self) -> Option<&dyn Locker<T>> {
        None
    }
}

//! The verifying transaction: expectation table, phase flag, and the
//! commit/rollback protocol.

use crate::verify;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use verilock_core::{
    BackendError, ExpectedValue, KeyColumn, Result, StoreTransaction, TransactionConfig,
    VerifiableStore,
};

/// Lifecycle phase of a [`VerifyingTransaction`].
///
/// `Locking` is the initial phase, during which locks and expectations may
/// be registered. The transition to `Mutating` happens exactly once, at the
/// first prepare call, and is never reversed. `Mutating` carries the cached
/// answer of whether any store was ever touched, so repeated prepare calls
/// return a stable value without re-running the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Locking,
    Mutating { touched: bool },
}

/// Expectations registered against one store, together with the store
/// handle they will be verified through.
struct StoreExpectations<T: StoreTransaction> {
    store: Arc<dyn VerifiableStore<T>>,
    cells: FxHashMap<KeyColumn, ExpectedValue>,
}

/// A transaction that supports optimistic, quorum-verified locking over a
/// backing store with no native compare-and-swap.
///
/// Wraps two transactions on the same backend: a weakly consistent one for
/// payload data and a strongly consistent one for lock metadata and
/// verification reads. Callers record the value they last observed in each
/// cell they lock; immediately before the first mutation, every held lock
/// is re-checked and every recorded value is re-read under quorum
/// consistency. Only if nothing diverged does the transaction enter its
/// mutation phase.
///
/// **Not safe for concurrent use by multiple threads.** The transaction
/// performs no internal synchronization; a single logical caller must drive
/// it. The first-write-wins rule of the expectation table and the one-way
/// phase flag are only meaningful under single-writer access.
///
/// The transaction is terminated by exactly one of [`commit`] or
/// [`rollback`]; both consume `self`, so double termination does not
/// compile.
///
/// [`commit`]: VerifyingTransaction::commit
/// [`rollback`]: VerifyingTransaction::rollback
pub struct VerifyingTransaction<T: StoreTransaction> {
    /// Transaction for reading and writing payload data. No consistency
    /// guarantee assumed.
    weak: T,
    /// Transaction for lock metadata and verification reads, bound to the
    /// backend's quorum-consistent path.
    strong: T,
    /// Hard deadline for each verification read.
    max_read_time: Duration,
    phase: Phase,
    /// Expected values keyed by store name, then by cell.
    expectations: FxHashMap<String, StoreExpectations<T>>,
}

impl<T: StoreTransaction> VerifyingTransaction<T> {
    /// Wrap a weakly and a strongly consistent transaction pair.
    pub fn new(weak: T, strong: T, max_read_time: Duration) -> Self {
        VerifyingTransaction {
            weak,
            strong,
            max_read_time,
            phase: Phase::Locking,
            expectations: FxHashMap::default(),
        }
    }

    /// Configuration of the composite, delegated to the weak transaction.
    pub fn config(&self) -> &TransactionConfig {
        self.weak.config()
    }

    /// The payload-data transaction.
    pub fn weak(&mut self) -> &mut T {
        &mut self.weak
    }

    /// The quorum-consistent transaction carrying lock traffic and
    /// verification reads.
    pub fn strong(&mut self) -> &mut T {
        &mut self.strong
    }

    /// Deadline applied to each verification read.
    pub fn max_read_time(&self) -> Duration {
        self.max_read_time
    }

    /// Whether the mutation phase has begun.
    ///
    /// False until the first successful [`prepare_for_mutation`] call, true
    /// forever after. Once true, collaborating stores must refuse new lock
    /// and expectation registrations.
    ///
    /// [`prepare_for_mutation`]: VerifyingTransaction::prepare_for_mutation
    pub fn is_mutating(&self) -> bool {
        matches!(self.phase, Phase::Mutating { .. })
    }

    /// Register the value the caller last observed in `cell` on `store`.
    ///
    /// Marks the store as touched even when the expectation is `Absent`.
    /// The first registration for a given (store, cell) wins; later ones
    /// are discarded with a debug note, never overwritten.
    ///
    /// Must only be called while the transaction is in its locking phase;
    /// the collaborating store enforces this, and a violation is reported
    /// as an illegal-state error rather than a runtime condition.
    pub fn record_expectation(
        &mut self,
        store: Arc<dyn VerifiableStore<T>>,
        cell: KeyColumn,
        expected: ExpectedValue,
    ) -> Result<()> {
        if self.is_mutating() {
            return Err(BackendError::IllegalState {
                reason: format!("expectation registered for {} after mutation began", cell),
            });
        }

        let name = store.name().to_owned();
        let bucket = self
            .expectations
            .entry(name)
            .or_insert_with(|| StoreExpectations {
                store,
                cells: FxHashMap::default(),
            });

        if let Some(prev) = bucket.cells.get(&cell) {
            debug!(
                "multiple expected values for {}: keeping initial value {} and discarding later value {}",
                cell, prev, expected
            );
        } else {
            debug!("recorded expected value for {}: {}", cell, expected);
            bucket.cells.insert(cell, expected);
        }
        Ok(())
    }

    /// Idempotent gate between the locking and mutation phases.
    ///
    /// On the first call: re-check every lock this transaction holds, then
    /// re-read every registered cell under quorum consistency and compare
    /// against the recorded value. Only if both pass does the phase flip to
    /// mutating. On failure the phase stays locking and the error
    /// propagates; the caller is expected to roll the transaction back, not
    /// retry the gate.
    ///
    /// Returns whether at least one store was ever touched. The answer is
    /// computed at the flip and cached, so repeated calls return the same
    /// value without re-running the checks.
    pub fn prepare_for_mutation(&mut self) -> Result<bool> {
        if let Phase::Mutating { touched } = self.phase {
            return Ok(touched);
        }
        self.check_all_locks()?;
        self.check_all_expected_values()?;
        let touched = !self.expectations.is_empty();
        self.phase = Phase::Mutating { touched };
        debug!(
            "transaction {} entering mutation phase (touched={})",
            self.config().id,
            touched
        );
        Ok(touched)
    }

    /// Commit the transaction.
    ///
    /// Ordering: weak commit, then lock release for every touched store,
    /// then strong commit. Payload durability must precede lock release so
    /// a waiter that reads "no lock" can never observe pre-write state as
    /// final; release itself rides the strong transaction and becomes final
    /// together with its commit.
    ///
    /// Errors are not swallowed. A failure partway through can leave
    /// orphaned lock records; reclaiming those is the lock collaborator's
    /// responsibility (e.g. via expiry).
    pub fn commit(mut self) -> Result<()> {
        self.weak.commit()?;
        self.release_all_locks()?;
        self.strong.commit()
    }

    /// Roll the transaction back.
    ///
    /// Locks are released first so other waiters unblock before the slower
    /// rollback round trips complete.
    pub fn rollback(mut self) -> Result<()> {
        self.release_all_locks()?;
        self.weak.rollback()?;
        self.strong.rollback()
    }

    /// Re-check every lock this transaction holds, store by store. Stores
    /// without a lock collaborator are skipped.
    fn check_all_locks(&mut self) -> Result<()> {
        for bucket in self.expectations.values() {
            let locker = match bucket.store.locker() {
                Some(locker) => locker,
                None => continue,
            };
            if let Err(e) = locker.check_locks(&mut self.strong) {
                if e.is_transient() {
                    return Err(e);
                }
                return Err(BackendError::LockInvalid {
                    store: bucket.store.name().to_owned(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Re-read every registered cell under quorum consistency and compare
    /// against the recorded expectation.
    fn check_all_expected_values(&mut self) -> Result<()> {
        for bucket in self.expectations.values() {
            for (cell, expected) in &bucket.cells {
                verify::check_expected_value(
                    bucket.store.as_ref(),
                    cell,
                    expected,
                    &mut self.strong,
                    self.max_read_time,
                )?;
            }
        }
        Ok(())
    }

    /// Release locks on every touched store.
    ///
    /// Failures are isolated per store: every store is attempted, each
    /// failure is logged, and the failed store names are aggregated into a
    /// single error afterwards.
    fn release_all_locks(&mut self) -> Result<()> {
        let mut failed: Vec<String> = Vec::new();
        for bucket in self.expectations.values() {
            if let Err(e) = bucket.store.release_locks(&mut self.strong) {
                warn!(
                    "lock release failed on store {}: {}",
                    bucket.store.name(),
                    e
                );
                failed.push(bucket.store.name().to_owned());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(BackendError::LockReleaseFailed { stores: failed })
        }
    }
}

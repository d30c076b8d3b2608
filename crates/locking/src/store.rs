//! Store wrapper that folds lock acquisition and the mutation gate into the
//! ordinary store surface.

use crate::transaction::VerifyingTransaction;
use std::sync::Arc;
use verilock_core::{
    BackendError, Buffer, Entry, ExpectedValue, KeyColumn, KeyColumnStore, KeySliceQuery, Locker,
    Result, StoreTransaction, VerifiableStore,
};

/// A key-column store wrapped with an optional lock collaborator.
///
/// This is the component that enforces the one-way phase boundary at the
/// interface: once a transaction reports [`is_mutating`], further lock
/// requests through this wrapper are refused. It also routes data
/// mutations: the first mutation runs the transaction's prepare gate, and
/// if the transaction holds locks anywhere, its mutations are forced onto
/// the strongly consistent path so they land together with the lock
/// cleanup.
///
/// The wrapper is a cheap handle over shared state; clone it freely.
///
/// [`is_mutating`]: VerifyingTransaction::is_mutating
pub struct LockingStore<T: StoreTransaction> {
    backing: Arc<dyn KeyColumnStore<T>>,
    locker: Option<Arc<dyn Locker<T>>>,
}

impl<T: StoreTransaction> Clone for LockingStore<T> {
    fn clone(&self) -> Self {
        LockingStore {
            backing: self.backing.clone(),
            locker: self.locker.clone(),
        }
    }
}

impl<T: StoreTransaction + 'static> LockingStore<T> {
    /// Wrap `backing` with a lock collaborator.
    pub fn new(backing: Arc<dyn KeyColumnStore<T>>, locker: Arc<dyn Locker<T>>) -> Self {
        LockingStore {
            backing,
            locker: Some(locker),
        }
    }

    /// Wrap `backing` without a lock collaborator. Lock requests are
    /// delegated to the backing store's native hook.
    pub fn without_locker(backing: Arc<dyn KeyColumnStore<T>>) -> Self {
        LockingStore {
            backing,
            locker: None,
        }
    }

    /// The backing store's diagnostic name.
    pub fn name(&self) -> &str {
        self.backing.name()
    }

    /// Claim a lock on (`key`, `column`) and record `expected` as the value
    /// this transaction last observed there.
    ///
    /// With a lock collaborator: refused with a permanent locking error if
    /// the transaction has begun mutating, otherwise the lock is written
    /// through the strong transaction and the expectation recorded for the
    /// pre-mutation verification pass. Without one: delegated to the
    /// backing store's native hook.
    pub fn acquire_lock(
        &self,
        key: Buffer,
        column: Buffer,
        expected: ExpectedValue,
        txn: &mut VerifyingTransaction<T>,
    ) -> Result<()> {
        match &self.locker {
            Some(locker) => {
                if txn.is_mutating() {
                    return Err(BackendError::PermanentLocking {
                        reason: format!(
                            "attempted to obtain a lock on {} after mutations had begun",
                            KeyColumn::new(key, column)
                        ),
                    });
                }
                let cell = KeyColumn::new(key, column);
                locker.write_lock(&cell, txn.strong())?;
                txn.record_expectation(Arc::new(self.clone()), cell, expected)
            }
            None => self.backing.acquire_lock(key, column, expected, txn.weak()),
        }
    }

    /// Read a column slice through the payload path.
    pub fn get_slice(
        &self,
        query: &KeySliceQuery,
        txn: &mut VerifyingTransaction<T>,
    ) -> Result<Vec<Entry>> {
        self.backing.get_slice(query, txn.weak())
    }

    /// Apply additions and deletions to one row.
    ///
    /// The first mutation on a transaction runs its prepare gate: all locks
    /// are re-checked and all expected values re-read before any write is
    /// issued. Mutations of a lock-holding transaction ride the strong
    /// path; lock-free transactions stay on the weak one.
    pub fn mutate(
        &self,
        key: Buffer,
        additions: Vec<Entry>,
        deletions: Vec<Buffer>,
        txn: &mut VerifyingTransaction<T>,
    ) -> Result<()> {
        let holds_locks = txn.prepare_for_mutation()?;
        let route = if holds_locks { txn.strong() } else { txn.weak() };
        self.backing.mutate(key, additions, deletions, route)
    }
}

impl<T: StoreTransaction + 'static> VerifiableStore<T> for LockingStore<T> {
    fn name(&self) -> &str {
        self.backing.name()
    }

    fn range_read(
        &self,
        key: &Buffer,
        lower: &Buffer,
        upper: &Buffer,
        strong: &mut T,
    ) -> Result<Vec<Entry>> {
        let query = KeySliceQuery::new(key.clone(), lower.clone(), upper.clone());
        self.backing.get_slice(&query, strong)
    }

    fn release_locks(&self, strong: &mut T) -> Result<()> {
        match &self.locker {
            Some(locker) => locker.delete_locks(strong),
            None => Ok(()),
        }
    }

    fn locker(&self) -> Option<&dyn Locker<T>> {
        self.locker.as_deref()
    }
}

//! In-memory backend: committed row data, buffering transactions, and a
//! lease-style lock collaborator.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use verilock::{
    BackendError, Buffer, Entry, KeyColumn, KeyColumnStore, KeySliceQuery, Locker, LockingStore,
    Result, StoreTransaction, TransactionConfig, TxId, VerifyingTransaction,
};

/// Committed rows of one store: row key -> column -> value.
#[derive(Default)]
pub struct MemData {
    rows: Mutex<BTreeMap<Buffer, BTreeMap<Buffer, Buffer>>>,
}

impl MemData {
    /// Direct write bypassing any transaction, standing in for a
    /// concurrent writer on another node.
    pub fn put(&self, key: impl Into<Buffer>, column: impl Into<Buffer>, value: impl Into<Buffer>) {
        self.rows
            .lock()
            .entry(key.into())
            .or_default()
            .insert(column.into(), value.into());
    }

    pub fn get(&self, key: impl Into<Buffer>, column: impl Into<Buffer>) -> Option<Buffer> {
        self.rows
            .lock()
            .get(&key.into())
            .and_then(|row| row.get(&column.into()).cloned())
    }
}

struct Pending {
    data: Arc<MemData>,
    key: Buffer,
    additions: Vec<Entry>,
    deletions: Vec<Buffer>,
}

/// A transaction that buffers mutations and applies them on commit.
pub struct MemTransaction {
    config: TransactionConfig,
    pending: Vec<Pending>,
}

impl MemTransaction {
    pub fn new(config: TransactionConfig) -> Self {
        MemTransaction {
            config,
            pending: Vec::new(),
        }
    }
}

impl StoreTransaction for MemTransaction {
    fn commit(&mut self) -> Result<()> {
        for p in self.pending.drain(..) {
            let mut rows = p.data.rows.lock();
            let row = rows.entry(p.key).or_default();
            for column in p.deletions {
                row.remove(&column);
            }
            for entry in p.additions {
                row.insert(entry.column, entry.value);
            }
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn config(&self) -> &TransactionConfig {
        &self.config
    }
}

/// Key-column store over shared [`MemData`].
pub struct MemStore {
    name: String,
    data: Arc<MemData>,
}

impl MemStore {
    pub fn new(name: impl Into<String>, data: Arc<MemData>) -> Self {
        MemStore {
            name: name.into(),
            data,
        }
    }
}

impl KeyColumnStore<MemTransaction> for MemStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_slice(&self, query: &KeySliceQuery, _txn: &mut MemTransaction) -> Result<Vec<Entry>> {
        let rows = self.data.rows.lock();
        let Some(row) = rows.get(&query.key) else {
            return Ok(Vec::new());
        };
        Ok(row
            .range((Bound::Included(&query.lower), Bound::Excluded(&query.upper)))
            .map(|(column, value)| Entry::new(column.clone(), value.clone()))
            .collect())
    }

    fn mutate(
        &self,
        key: Buffer,
        additions: Vec<Entry>,
        deletions: Vec<Buffer>,
        txn: &mut MemTransaction,
    ) -> Result<()> {
        txn.pending.push(Pending {
            data: self.data.clone(),
            key,
            additions,
            deletions,
        });
        Ok(())
    }
}

/// Lease-style lock collaborator keyed by transaction id.
///
/// `expire_all` simulates every lease lapsing, as after a long stall.
#[derive(Default)]
pub struct MemLocker {
    held: Mutex<HashMap<TxId, HashSet<KeyColumn>>>,
    expired: AtomicBool,
}

impl MemLocker {
    pub fn expire_all(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    /// Total number of cells currently locked, across all transactions.
    pub fn held_count(&self) -> usize {
        self.held.lock().values().map(HashSet::len).sum()
    }
}

impl Locker<MemTransaction> for MemLocker {
    fn write_lock(&self, cell: &KeyColumn, strong: &mut MemTransaction) -> Result<()> {
        self.held
            .lock()
            .entry(strong.config().id)
            .or_default()
            .insert(cell.clone());
        Ok(())
    }

    fn check_locks(&self, strong: &mut MemTransaction) -> Result<()> {
        if self.expired.load(Ordering::SeqCst) {
            self.held.lock().remove(&strong.config().id);
            return Err(BackendError::PermanentLocking {
                reason: "lock lease expired".into(),
            });
        }
        Ok(())
    }

    fn delete_locks(&self, strong: &mut MemTransaction) -> Result<()> {
        self.held.lock().remove(&strong.config().id);
        Ok(())
    }
}

/// One store wired up with shared data and a locker.
pub struct World {
    pub data: Arc<MemData>,
    pub locker: Arc<MemLocker>,
    pub store: LockingStore<MemTransaction>,
}

pub fn world(store_name: &str) -> World {
    let data = Arc::new(MemData::default());
    let locker = Arc::new(MemLocker::default());
    let backing = Arc::new(MemStore::new(store_name, data.clone()));
    let store = LockingStore::new(backing, locker.clone());
    World {
        data,
        locker,
        store,
    }
}

/// A verifying transaction whose weak and strong halves share one id.
pub fn open_txn() -> VerifyingTransaction<MemTransaction> {
    let config = TransactionConfig::new();
    VerifyingTransaction::new(
        MemTransaction::new(config.clone()),
        MemTransaction::new(config),
        Duration::from_millis(500),
    )
}

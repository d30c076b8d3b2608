//! # Verilock
//!
//! Optimistic, quorum-verified locking for key-value stores that offer no
//! native compare-and-swap.
//!
//! A client "reserves" a cell (row + column) by recording the value it last
//! observed there. Immediately before its first real write, the transaction
//! re-checks every lock it holds and re-reads every reserved cell under a
//! strongly consistent path; only if nothing diverged does it enter its
//! mutation phase. Commit and rollback bracket lock release around the two
//! wrapped transactions so no locks are left behind on the happy path.
//!
//! ## Quick Start
//!
//! ```ignore
//! use verilock::prelude::*;
//!
//! // Open one weakly and one strongly consistent transaction on the
//! // backend, then compose them.
//! let mut txn = VerifyingTransaction::new(weak, strong, max_read_time);
//!
//! // Reserve a cell: lock it and record the value we last saw there.
//! let store = LockingStore::new(backing, locker);
//! store.acquire_lock(key, column, ExpectedValue::Value(observed), &mut txn)?;
//!
//! // The first mutation re-verifies every lock and every recorded value
//! // under quorum consistency before any write is issued.
//! store.mutate(key, additions, deletions, &mut txn)?;
//!
//! txn.commit()?;
//! ```
//!
//! ## Pieces
//!
//! - [`VerifyingTransaction`] - expectation table, one-way phase flag, and
//!   the commit/rollback ordering protocol
//! - [`LockingStore`] - store wrapper enforcing the phase boundary and
//!   routing mutations
//! - [`check_expected_value`] - the bounded, quorum-consistent re-read that
//!   stands in for compare-and-swap
//! - Collaborator contracts - [`StoreTransaction`], [`Locker`],
//!   [`KeyColumnStore`], [`VerifiableStore`]
//!
//! The mutual-exclusion algorithm itself (acquisition, ownership, expiry,
//! dead-holder recovery) and the key-value transport are supplied by the
//! caller behind those contracts.

#![warn(missing_docs)]

pub mod prelude;

pub use verilock_core::{
    run_with_budget, BackendError, Buffer, Entry, ExpectedValue, KeyColumn, KeyColumnStore,
    KeySliceQuery, Locker, Result, StoreTransaction, TransactionConfig, TxId, VerifiableStore,
};
pub use verilock_locking::{check_expected_value, LockingStore, VerifyingTransaction};

//! Convenience re-exports for the common case.
//!
//! ```ignore
//! use verilock::prelude::*;
//! ```

pub use crate::{
    BackendError, Buffer, Entry, ExpectedValue, KeyColumn, KeyColumnStore, KeySliceQuery, Locker,
    LockingStore, Result, StoreTransaction, TransactionConfig, TxId, VerifiableStore,
    VerifyingTransaction,
};

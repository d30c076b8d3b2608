//! Error types for the locking and verification protocol.
//!
//! Errors fall into three classes:
//! - **Transient**: the backend timed out or the transport failed. The
//!   caller may retry; this layer never retries internally.
//! - **Permanent**: a lock was lost or a re-read observed different bytes.
//!   The divergence is a fact about observed state; the only correct
//!   response is to abandon the transaction and roll back.
//! - **Illegal state**: API misuse, such as registering an expectation
//!   after mutation began. Indicates a bug in the caller, not a runtime
//!   condition.

use crate::buffer::Buffer;
use crate::cell::KeyColumn;
use std::time::Duration;
use thiserror::Error;

/// All errors raised by the locking and verification protocol.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Hard deadline exceeded while waiting on the backing store.
    #[error("{op} exceeded time budget of {budget:?}")]
    Timeout {
        /// Operation that overran its budget.
        op: &'static str,
        /// The budget that was exceeded.
        budget: Duration,
    },

    /// Connectivity or transport failure. Retryable with fresh state.
    #[error("transient backend failure in {op}: {reason}")]
    Transient {
        /// Operation that failed.
        op: &'static str,
        /// Transport-level failure description.
        reason: String,
    },

    /// A lock this transaction believed it held is no longer valid.
    #[error("lock no longer valid on store {store}: {reason}")]
    LockInvalid {
        /// Store whose lock check failed.
        store: String,
        /// Why the lock is no longer valid.
        reason: String,
    },

    /// A quorum re-read observed different bytes than the caller recorded.
    #[error(
        "expected value mismatch for {cell} on store {store}: expected {expected:?} vs actual {actual:?}"
    )]
    ExpectedValueMismatch {
        /// Store the cell belongs to.
        store: String,
        /// The diverged cell.
        cell: KeyColumn,
        /// Value sequence the caller recorded.
        expected: Vec<Buffer>,
        /// Value sequence the re-read observed.
        actual: Vec<Buffer>,
    },

    /// Lock or expectation registration refused at the store boundary.
    #[error("permanent locking failure: {reason}")]
    PermanentLocking {
        /// Why registration was refused.
        reason: String,
    },

    /// Lock release failed on one or more stores. Every touched store was
    /// attempted before this was raised.
    #[error("lock release failed on stores [{}]", .stores.join(", "))]
    LockReleaseFailed {
        /// Stores whose release failed.
        stores: Vec<String>,
    },

    /// Operation the backing store does not implement.
    #[error("unsupported operation: {op}")]
    Unsupported {
        /// The missing operation.
        op: &'static str,
    },

    /// API misuse. Distinct from both runtime classes.
    #[error("illegal transaction state: {reason}")]
    IllegalState {
        /// What the caller did wrong.
        reason: String,
    },
}

impl BackendError {
    /// True if the caller may retry the failed operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Timeout { .. } | BackendError::Transient { .. }
        )
    }

    /// True if retrying cannot help: the observed state has diverged from
    /// what this transaction recorded, or the backend lacks the operation.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            BackendError::LockInvalid { .. }
                | BackendError::ExpectedValueMismatch { .. }
                | BackendError::PermanentLocking { .. }
                | BackendError::LockReleaseFailed { .. }
                | BackendError::Unsupported { .. }
        )
    }

    /// True if the error indicates a bug in the calling code.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, BackendError::IllegalState { .. })
    }
}

/// Result type for locking and verification operations.
pub type Result<T> = std::result::Result<T, BackendError>;

//! Locking layer for verilock.
//!
//! Composes an externally supplied mutual-exclusion provider and a
//! quorum-consistent read path into a single verification protocol:
//! - [`VerifyingTransaction`]: expectation table, one-way phase flag, and
//!   the commit/rollback ordering protocol
//! - [`check_expected_value`]: the bounded, quorum-consistent re-read that
//!   stands in for a native compare-and-swap
//! - [`LockingStore`]: store wrapper enforcing the phase boundary and
//!   routing mutations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod transaction;
pub mod verify;

pub use store::LockingStore;
pub use transaction::VerifyingTransaction;
pub use verify::check_expected_value;

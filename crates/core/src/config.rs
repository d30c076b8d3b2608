//! Per-transaction configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one transaction, carried through log output and
/// lock records for diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(Uuid);

impl TxId {
    /// Create a new random transaction id.
    pub fn new() -> Self {
        TxId(Uuid::new_v4())
    }

    /// Create a TxId from raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        TxId(Uuid::from_bytes(bytes))
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration record attached to a wrapped transaction.
///
/// Both wrapped transactions of a verifying transaction normally carry the
/// same id and start time; the weak transaction's record is the one exposed
/// through the composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Transaction id for diagnostics.
    pub id: TxId,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
    /// Optional group name for metrics/diagnostic grouping.
    pub group_name: Option<String>,
}

impl TransactionConfig {
    /// Create a configuration with a fresh id and the current time.
    pub fn new() -> Self {
        TransactionConfig {
            id: TxId::new(),
            started_at: Utc::now(),
            group_name: None,
        }
    }

    /// Attach a group name.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_name = Some(group.into());
        self
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self::new()
    }
}

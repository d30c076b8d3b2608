//! Expected-value records for optimistic verification.

use crate::buffer::Buffer;
use smallvec::SmallVec;
use std::fmt;

/// The value a caller believes currently occupies a cell.
///
/// Recorded before a lock is requested and re-checked under quorum
/// consistency immediately before the mutation phase begins. `Absent` is an
/// explicit claim that the cell holds nothing, not a missing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedValue {
    /// The cell is expected to hold exactly these bytes.
    Value(Buffer),
    /// The cell is expected to hold nothing.
    Absent,
}

impl ExpectedValue {
    /// True for the explicit-absence marker.
    pub fn is_absent(&self) -> bool {
        matches!(self, ExpectedValue::Absent)
    }

    /// The value sequence a verification read must observe: empty for
    /// `Absent`, a single element otherwise.
    pub fn as_sequence(&self) -> SmallVec<[Buffer; 1]> {
        match self {
            ExpectedValue::Value(v) => SmallVec::from_elem(v.clone(), 1),
            ExpectedValue::Absent => SmallVec::new(),
        }
    }
}

impl From<Buffer> for ExpectedValue {
    fn from(value: Buffer) -> Self {
        ExpectedValue::Value(value)
    }
}

impl From<Option<Buffer>> for ExpectedValue {
    fn from(value: Option<Buffer>) -> Self {
        match value {
            Some(v) => ExpectedValue::Value(v),
            None => ExpectedValue::Absent,
        }
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedValue::Value(v) => write!(f, "{}", v),
            ExpectedValue::Absent => write!(f, "<absent>"),
        }
    }
}

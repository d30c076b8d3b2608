//! Cell addressing and slice queries.
//!
//! A cell is one value slot in the key-value model, addressed by a row key
//! and a column qualifier. The backing stores expose range reads only, so a
//! point lookup is phrased as a half-open column range over one row.

use crate::buffer::Buffer;
use std::fmt;

/// Address of one cell: a (row key, column qualifier) pair.
///
/// Equality is byte-exact on both components. Used as the map key for
/// expected values and as the address of verification reads.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyColumn {
    /// Row key.
    pub key: Buffer,
    /// Column qualifier within the row.
    pub column: Buffer,
}

impl KeyColumn {
    /// Create a cell address.
    pub fn new(key: impl Into<Buffer>, column: impl Into<Buffer>) -> Self {
        KeyColumn {
            key: key.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for KeyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[key={}, col={}]", self.key, self.column)
    }
}

impl fmt::Debug for KeyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyColumn{}", self)
    }
}

/// One (column, value) pair returned by a slice read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Column qualifier.
    pub column: Buffer,
    /// Value stored under the column.
    pub value: Buffer,
}

impl Entry {
    /// Create an entry.
    pub fn new(column: impl Into<Buffer>, value: impl Into<Buffer>) -> Self {
        Entry {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// A half-open column range `[lower, upper)` over a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySliceQuery {
    /// Row key to read.
    pub key: Buffer,
    /// Inclusive lower column bound.
    pub lower: Buffer,
    /// Exclusive upper column bound.
    pub upper: Buffer,
}

impl KeySliceQuery {
    /// Create a slice query over `[lower, upper)`.
    pub fn new(key: Buffer, lower: Buffer, upper: Buffer) -> Self {
        KeySliceQuery { key, lower, upper }
    }

    /// Slice query targeting exactly one column: `[column, successor(column))`.
    ///
    /// A well-behaved backend returns at most the entry at `column`; sloppy
    /// backends may also return lexicographic neighbors inside the bound,
    /// which consumers must filter by exact column match.
    pub fn single_column(key: Buffer, column: Buffer) -> Self {
        let upper = column.successor();
        KeySliceQuery {
            key,
            lower: column,
            upper,
        }
    }
}

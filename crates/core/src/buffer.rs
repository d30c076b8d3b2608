//! Immutable byte buffers and the range-bound successor utility.
//!
//! Row keys, column qualifiers, and cell values are all opaque byte
//! sequences. [`Buffer`] wraps them in a cheaply cloneable, hashable,
//! byte-ordered type so the same value can sit in an expectation table,
//! a slice query, and an error message without copying.

use std::fmt;
use std::sync::Arc;

/// Immutable byte sequence used for row keys, column qualifiers, and values.
///
/// Cloning is cheap (reference counted). Ordering is byte-lexicographic with
/// a shared prefix sorting before its extensions, matching the order the
/// backing stores use for range bounds.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Buffer(Arc<[u8]>);

impl Buffer {
    /// Create a buffer from anything that can hand over its bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Buffer(bytes.into().into())
    }

    /// Borrow the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Smallest buffer strictly greater than `self` under byte-wise
    /// increment, used as the exclusive upper bound of a single-column
    /// slice query.
    ///
    /// Increments from the last byte with carry, keeping the length. An
    /// all-`0xFF` buffer has no same-length successor and is extended with
    /// one trailing zero byte instead; the wider bound then also covers
    /// prefix extensions, which slice consumers filter by exact column.
    pub fn successor(&self) -> Buffer {
        let mut bytes = self.0.to_vec();
        for i in (0..bytes.len()).rev() {
            if bytes[i] != 0xFF {
                bytes[i] += 1;
                return Buffer::new(bytes);
            }
            bytes[i] = 0x00;
        }
        // Carried out of every position: restore and grow by one byte.
        let mut bytes = self.0.to_vec();
        bytes.push(0x00);
        Buffer::new(bytes)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer::new(bytes)
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Buffer::new(bytes)
    }
}

impl From<&str> for Buffer {
    fn from(s: &str) -> Self {
        Buffer::new(s.as_bytes())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Buffer {
    /// Hex rendering, e.g. `0x7631`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({})", self)
    }
}

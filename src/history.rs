//! Branch history registers.

use bitvec::prelude::*;
use crate::branch::Outcome;

/// The widest history register we can load into a machine word.
pub const MAX_HISTORY_BITS: usize = 63;

/// A shift register recording the most recent outcomes of some branch
/// (or group of branches).
///
/// Bit 0 always holds the newest outcome, so loading the register as an
/// integer gives the history with the oldest retained outcome in the
/// most-significant position.
#[derive(Clone, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<u64, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl std::fmt::Debug for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "HistoryRegister({}'b{})", self.len, self)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len <= MAX_HISTORY_BITS);
        Self {
            data: bitvec![u64, Lsb0; 0; len],
            len,
        }
    }

    /// Create a register holding the low 'len' bits of 'value'.
    pub fn with_value(len: usize, value: u64) -> Self {
        let mut res = Self::new(len);
        res.set_value(value);
        res
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn data(&self) -> &BitSlice<u64, Lsb0> { &self.data }

    /// Mask covering every bit of the register.
    pub fn mask(&self) -> u64 { (1u64 << self.len) - 1 }
}

impl HistoryRegister {
    /// Shift the register left by one bit and insert an outcome at the bottom.
    /// The oldest bit falls off the top.
    pub fn shift_in(&mut self, outcome: Outcome) {
        if self.len == 0 {
            return;
        }
        if self.len > 1 {
            self.data.shift_right(1);
        }
        self.data.set(0, outcome.is_taken());
    }

    /// Return the register contents as an integer.
    pub fn value(&self) -> u64 {
        if self.len == 0 { 0 } else { self.data.load_le::<u64>() }
    }

    /// Overwrite the register with the low 'len' bits of 'value'.
    pub fn set_value(&mut self, value: u64) {
        if self.len != 0 {
            self.data.store_le::<u64>(value & self.mask());
        }
    }
}

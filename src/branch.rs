//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn from_bool(b: bool) -> Self {
        match b {
            true => Self::T,
            false => Self::N,
        }
    }

    pub fn is_taken(&self) -> bool { matches!(self, Self::T) }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        Self::from_bool(x)
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool {
        x.is_taken()
    }
}

/// A record of branch execution, parsed from one line of a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchRecord {
    /// The mnemonic of the branch instruction (ie. `beq`, `bnez`)
    pub opcode: String,

    /// The program counter value for this branch
    pub pc: u64,

    /// The target address evaluated for this branch
    pub tgt: u64,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,
}
impl BranchRecord {
    pub fn new(opcode: impl ToString, pc: u64, tgt: u64, outcome: Outcome)
        -> Self
    {
        Self { opcode: opcode.to_string(), pc, tgt, outcome }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outcome_bool_conversion() {
        assert_eq!(Outcome::from(true), Outcome::T);
        assert_eq!(Outcome::from(false), Outcome::N);
        assert!(bool::from(Outcome::T));
        assert_eq!(!Outcome::T, Outcome::N);
    }
}

//! Implementation of a saturating counter.

use crate::branch::Outcome;
use crate::error::ConfigError;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// Width of the counter in bits
    pub bits: u32,
    /// Value of the counter after construction or reset
    pub initial: u32,
}
impl SaturatingCounterConfig {
    /// The widest supported counter.
    pub const MAX_BITS: u32 = 32;

    /// Build a validated configuration from raw option values.
    pub fn new(bits: u64, initial: u64, key: &'static str, what: &'static str)
        -> Result<Self, ConfigError>
    {
        if bits > Self::MAX_BITS as u64 {
            return Err(ConfigError::TooLarge {
                key, value: bits, max: Self::MAX_BITS as u64
            });
        }
        let bits = bits as u32;
        let initial = u32::try_from(initial).map_err(|_| {
            ConfigError::InitialState {
                what, value: initial, limit: 1u128 << bits
            }
        })?;
        let res = Self { bits, initial };
        res.validate(key, what)?;
        Ok(res)
    }

    /// Check that the counter width is usable and that the initial state fits.
    ///
    /// 'key' names the option which configured the width and 'what' names
    /// the table being seeded; both only appear in error messages.
    pub fn validate(&self, key: &'static str, what: &'static str)
        -> Result<(), ConfigError>
    {
        if self.bits == 0 {
            return Err(ConfigError::NotPositive(key));
        }
        if self.bits > Self::MAX_BITS {
            return Err(ConfigError::TooLarge {
                key, value: self.bits as u64, max: Self::MAX_BITS as u64
            });
        }
        if self.initial > self.max_state() {
            return Err(ConfigError::InitialState {
                what,
                value: self.initial as u64,
                limit: 1u128 << self.bits,
            });
        }
        Ok(())
    }

    /// The largest value the counter can hold (2^bits - 1).
    pub fn max_state(&self) -> u32 {
        u32::MAX >> (Self::MAX_BITS - self.bits)
    }

    /// The smallest value which predicts 'taken' (2^(bits-1)).
    pub fn threshold(&self) -> u32 {
        1 << (self.bits - 1)
    }

    pub fn build(self) -> SaturatingCounter {
        SaturatingCounter {
            ctr: self.initial,
            max: self.max_state(),
            init: self.initial,
        }
    }
}

/// An N-bit saturating counter used to follow the behavior of a branch.
///
/// Values in the upper half of the range predict 'taken'. The counter
/// clamps at both ends and never wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    ctr: u32,
    max: u32,
    init: u32,
}
impl SaturatingCounter {
    pub fn inc(&mut self) {
        if self.ctr < self.max { self.ctr += 1; }
    }

    pub fn dec(&mut self) {
        self.ctr = self.ctr.saturating_sub(1);
    }

    /// Return the raw counter value.
    pub fn value(&self) -> u32 { self.ctr }

    /// Return the counter to its initial value.
    pub fn reset(&mut self) {
        self.ctr = self.init;
    }

    /// Return the current predicted direction.
    pub fn predict(&self) -> Outcome {
        // max is always 2^n - 1, so this is 2^(n-1)
        let threshold = self.max / 2 + 1;
        Outcome::from(self.ctr >= threshold)
    }

    /// Move the counter towards the observed outcome.
    pub fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.inc(),
            Outcome::N => self.dec(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn counter_saturates() {
        for bits in 1..=8 {
            let cfg = SaturatingCounterConfig { bits, initial: 0 };
            let mut c = cfg.build();
            for _ in 0..(1 << bits) + 4 {
                c.update(Outcome::T);
            }
            assert_eq!(c.value(), cfg.max_state());
            for _ in 0..(1 << bits) + 4 {
                c.update(Outcome::N);
            }
            assert_eq!(c.value(), 0);
        }
    }

    #[test]
    fn counter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for bits in [1, 2, 3, 5, 16, 32] {
            let cfg = SaturatingCounterConfig { bits, initial: 0 };
            let mut c = cfg.build();
            for _ in 0..4096 {
                c.update(Outcome::from(rng.gen::<bool>()));
                assert!(c.value() <= cfg.max_state());
            }
        }
    }

    #[test]
    fn widest_counter() {
        let cfg = SaturatingCounterConfig { bits: 32, initial: u32::MAX };
        assert!(cfg.validate("counter_bits", "counter").is_ok());
        let mut c = cfg.build();
        c.inc();
        assert_eq!(c.value(), u32::MAX);
        assert_eq!(c.predict(), Outcome::T);
    }

    #[test]
    fn threshold_is_midpoint() {
        for bits in 1..=6 {
            let cfg = SaturatingCounterConfig {
                bits, initial: (1 << (bits - 1)) - 1
            };
            let mut c = cfg.build();
            assert_eq!(c.predict(), Outcome::N);
            c.update(Outcome::T);
            assert_eq!(c.value(), cfg.threshold());
            assert_eq!(c.predict(), Outcome::T);
        }
    }

    #[test]
    fn reset_restores_initial() {
        let mut c = SaturatingCounterConfig { bits: 3, initial: 5 }.build();
        c.dec(); c.dec(); c.dec();
        c.reset();
        assert_eq!(c.value(), 5);
    }

    #[test]
    fn new_checks_wide_values() {
        assert!(SaturatingCounterConfig::new(2, 3, "bits", "counter").is_ok());
        assert_eq!(
            SaturatingCounterConfig::new(64, 0, "bits", "counter"),
            Err(ConfigError::TooLarge { key: "bits", value: 64, max: 32 })
        );
        assert_eq!(
            SaturatingCounterConfig::new(8, 1 << 40, "bits", "counter"),
            Err(ConfigError::InitialState {
                what: "counter", value: 1 << 40, limit: 256
            })
        );
    }

    #[test]
    fn validate_rejects_bad_config() {
        let cfg = SaturatingCounterConfig { bits: 2, initial: 4 };
        assert_eq!(cfg.validate("counter_bits", "counter"),
            Err(ConfigError::InitialState {
                what: "counter", value: 4, limit: 4
            })
        );
        let cfg = SaturatingCounterConfig { bits: 0, initial: 0 };
        assert_eq!(cfg.validate("counter_bits", "counter"),
            Err(ConfigError::NotPositive("counter_bits"))
        );
        let cfg = SaturatingCounterConfig { bits: 33, initial: 0 };
        assert!(cfg.validate("counter_bits", "counter").is_err());
    }
}

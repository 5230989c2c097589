//! Two-level adaptive predictors.
//!
//! A table of branch history registers (BHRs) is indexed by the program
//! counter. The selected history is combined with low bits of the program
//! counter to index a pattern history table (PHT) of saturating counters.
//!
//! GShare uses the same state with a single global BHR and combines the
//! history with the program counter using XOR; see [GShareConfig].

use crate::branch::Outcome;
use crate::config::PredictorOptions;
use crate::error::ConfigError;
use crate::history::*;
use crate::predictor::BranchPredictor;
use crate::predictor::counter::*;
use crate::predictor::pht::*;
use crate::predictor::table::*;

/// How the history and program counter fields are merged into a PHT index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexCombinator {
    /// Bitwise OR (concatenation, since the fields never overlap)
    Concat,
    /// Bitwise XOR
    Xor,
}
impl IndexCombinator {
    pub fn combine(&self, history: u128, pc: u128) -> u128 {
        match self {
            Self::Concat => history | pc,
            Self::Xor => history ^ pc,
        }
    }
}

/// A table of [HistoryRegister], indexed by the program counter modulo the
/// number of registers.
#[derive(Clone, Debug)]
pub struct HistoryTable {
    data: Vec<HistoryRegister>,
    init: u64,
}
impl HistoryTable {
    pub fn new(size: u64, len: usize, init: u64) -> Result<Self, ConfigError> {
        let reg = HistoryRegister::with_value(len, init);
        Ok(Self {
            data: alloc_table("num_bhrs", size, reg)?,
            init,
        })
    }
}

impl PredictorTable for HistoryTable {
    type Input = u64;
    type Entry = HistoryRegister;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, pc: u64) -> usize {
        (pc % self.data.len() as u64) as usize
    }

    fn get_entry(&self, idx: usize) -> &HistoryRegister {
        &self.data[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut HistoryRegister {
        &mut self.data[idx]
    }

    fn reset(&mut self) {
        let init = self.init;
        self.data.iter_mut().for_each(|r| r.set_value(init));
    }
}

/// Configuration for building a [`TwoLevelPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwoLevelConfig {
    pub num_bhrs: u64,
    pub history_size_bits: u64,
    pub num_pht_entries: u64,
    pub pht_counter_bits: u64,
    pub initial_bhr_state: u64,
    pub initial_pht_state: u64,
    pub combinator: IndexCombinator,
}
impl TwoLevelConfig {
    pub const OPTIONS: [&'static str; 6] = [
        "num_bhrs", "history_size_bits", "num_pht_entries",
        "pht_counter_bits", "initial_bhr_state", "initial_pht_state",
    ];

    pub fn from_options(opts: &PredictorOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            num_bhrs: opts.required("num_bhrs")?,
            history_size_bits: opts.required("history_size_bits")?,
            num_pht_entries: opts.required("num_pht_entries")?,
            pht_counter_bits: opts.get_or("pht_counter_bits", 2),
            initial_bhr_state: opts.get_or("initial_bhr_state", 0),
            initial_pht_state: opts.get_or("initial_pht_state", 0),
            combinator: IndexCombinator::Concat,
        })
    }

    /// Number of low program counter bits mixed into the PHT index.
    ///
    /// This is the number of PHT entries left over after reserving one
    /// entry for every possible history value.
    pub fn pc_bits(&self) -> u64 {
        let histories = u32::try_from(self.history_size_bits).ok()
            .and_then(|bits| 1u64.checked_shl(bits))
            .unwrap_or(u64::MAX);
        self.num_pht_entries.saturating_sub(histories)
    }

    pub fn build(self) -> Result<TwoLevelPredictor, ConfigError> {
        self.build_named("TwoLevel")
    }

    fn build_named(self, name: &'static str)
        -> Result<TwoLevelPredictor, ConfigError>
    {
        let ctr = SaturatingCounterConfig::new(
            self.pht_counter_bits, self.initial_pht_state,
            "pht_counter_bits", "PHT"
        )?;

        if self.history_size_bits > MAX_HISTORY_BITS as u64 {
            return Err(ConfigError::TooLarge {
                key: "history_size_bits",
                value: self.history_size_bits,
                max: MAX_HISTORY_BITS as u64,
            });
        }
        let history_bits = self.history_size_bits as u32;
        if self.initial_bhr_state >= (1u64 << history_bits) {
            return Err(ConfigError::InitialState {
                what: "BHR",
                value: self.initial_bhr_state,
                limit: 1u128 << history_bits,
            });
        }
        if self.num_pht_entries < (1u64 << history_bits) {
            return Err(ConfigError::PhtTooSmall {
                entries: self.num_pht_entries,
                history_bits,
            });
        }
        if self.num_bhrs == 0 {
            return Err(ConfigError::NotPositive("num_bhrs"));
        }

        let bhrs = HistoryTable::new(
            self.num_bhrs, history_bits as usize, self.initial_bhr_state
        )?;
        let pht = PatternHistoryTable::new(
            "num_pht_entries", self.num_pht_entries, ctr
        )?;

        log::debug!("{}: {} BHRs x {} bits, {} PHT entries, {} PC bits",
            name, bhrs.size(), history_bits, pht.size(), self.pc_bits());

        Ok(TwoLevelPredictor {
            name,
            cfg: self,
            pc_bits: self.pc_bits(),
            bhrs,
            pht,
        })
    }
}

/// Configuration for building a GShare predictor.
///
/// GShare is a [TwoLevelPredictor] with a single global history register,
/// one PHT entry for every possible history value, and an XOR combinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GShareConfig {
    pub history_size_bits: u64,
    pub pht_counter_bits: u64,
    pub initial_bhr_state: u64,
    pub initial_pht_state: u64,
}
impl GShareConfig {
    pub const OPTIONS: [&'static str; 4] = [
        "history_size_bits", "pht_counter_bits",
        "initial_bhr_state", "initial_pht_state",
    ];

    pub fn from_options(opts: &PredictorOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            history_size_bits: opts.required("history_size_bits")?,
            pht_counter_bits: opts.get_or("pht_counter_bits", 2),
            initial_bhr_state: opts.get_or("initial_bhr_state", 0),
            initial_pht_state: opts.get_or("initial_pht_state", 0),
        })
    }

    /// Expand into the equivalent [TwoLevelConfig].
    ///
    /// NOTE: `initial_bhr_state` seeds the PHT and `initial_pht_state` seeds
    /// the global BHR. Existing GShare results were produced with this
    /// mapping, so it is kept as-is.
    pub fn to_two_level(&self) -> Result<TwoLevelConfig, ConfigError> {
        // The PHT has one entry for every history value
        let max = MAX_TABLE_ENTRIES.trailing_zeros() as u64;
        if self.history_size_bits > max {
            return Err(ConfigError::TooLarge {
                key: "history_size_bits",
                value: self.history_size_bits,
                max,
            });
        }
        Ok(TwoLevelConfig {
            num_bhrs: 1,
            history_size_bits: self.history_size_bits,
            num_pht_entries: 1u64 << self.history_size_bits,
            pht_counter_bits: self.pht_counter_bits,
            initial_bhr_state: self.initial_pht_state,
            initial_pht_state: self.initial_bhr_state,
            combinator: IndexCombinator::Xor,
        })
    }

    pub fn build(self) -> Result<TwoLevelPredictor, ConfigError> {
        self.to_two_level()?.build_named("GShare")
    }
}

/// A two-level adaptive predictor (or GShare, depending on configuration).
#[derive(Clone, Debug)]
pub struct TwoLevelPredictor {
    name: &'static str,
    cfg: TwoLevelConfig,
    pc_bits: u64,
    bhrs: HistoryTable,
    pht: PatternHistoryTable,
}

impl TwoLevelPredictor {
    pub fn config(&self) -> &TwoLevelConfig { &self.cfg }
    pub fn combinator(&self) -> IndexCombinator { self.cfg.combinator }
    pub fn pc_bits(&self) -> u64 { self.pc_bits }
    pub fn pht(&self) -> &PatternHistoryTable { &self.pht }

    /// Return the history register selected by some program counter.
    pub fn history(&self, pc: u64) -> &HistoryRegister {
        self.bhrs.get_entry(self.bhrs.get_index(pc))
    }

    /// Return the PHT index for a branch given its current history.
    ///
    /// The history occupies the bits above the low 'pc_bits' bits of the
    /// program counter, and the combined value is reduced modulo the number
    /// of PHT entries.
    pub fn pht_index(&self, history: u64, pc: u64) -> usize {
        let n = self.pht.size() as u128;
        let history_bits = self.cfg.history_size_bits;
        let res = if self.pc_bits.saturating_add(history_bits) < 128 {
            let hi = (history as u128) << self.pc_bits;
            let lo = (pc as u128) & ((1u128 << self.pc_bits) - 1);
            self.cfg.combinator.combine(hi, lo) % n
        } else {
            // Here 'pc_bits' exceeds the width of the program counter, so
            // the mask keeps every bit of it and the fields cannot overlap.
            // Both combinators reduce to addition.
            let hi = mul_mod(history as u128 % n, pow2_mod(self.pc_bits, n), n);
            (hi + (pc as u128 % n)) % n
        };
        res as usize
    }

    fn lookup(&self, pc: u64) -> (usize, usize) {
        let bhr_idx = self.bhrs.get_index(pc);
        let history = self.bhrs.get_entry(bhr_idx).value();
        (bhr_idx, self.pht_index(history, pc))
    }
}

impl BranchPredictor for TwoLevelPredictor {
    fn name(&self) -> &'static str { self.name }

    fn predict(&self, _opcode: &str, pc: u64, _tgt: u64) -> Outcome {
        let (_, pht_idx) = self.lookup(pc);
        self.pht.get_entry(pht_idx).predict()
    }

    fn update(&mut self, _opcode: &str, pc: u64, _tgt: u64, outcome: Outcome) {
        // The PHT entry is selected with the history *before* this outcome
        // is shifted in.
        let (bhr_idx, pht_idx) = self.lookup(pc);
        self.pht.get_entry_mut(pht_idx).update(outcome);
        self.bhrs.get_entry_mut(bhr_idx).shift_in(outcome);
    }

    fn reset(&mut self) {
        self.bhrs.reset();
        self.pht.reset();
    }
}

/// Compute (a * b) mod n, for a, b < n <= 2^64.
fn mul_mod(a: u128, b: u128, n: u128) -> u128 {
    (a * b) % n
}

/// Compute 2^e mod n, for 0 < n <= 2^64.
fn pow2_mod(mut e: u64, n: u128) -> u128 {
    let mut res = 1 % n;
    let mut base = 2 % n;
    while e > 0 {
        if e & 1 == 1 {
            res = mul_mod(res, base, n);
        }
        base = mul_mod(base, base, n);
        e >>= 1;
    }
    res
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;
    use Outcome::*;

    fn two_level(num_bhrs: u64, history_size_bits: u64, num_pht_entries: u64)
        -> TwoLevelConfig
    {
        TwoLevelConfig {
            num_bhrs,
            history_size_bits,
            num_pht_entries,
            pht_counter_bits: 2,
            initial_bhr_state: 0,
            initial_pht_state: 0,
            combinator: IndexCombinator::Concat,
        }
    }

    fn gshare(history_size_bits: u64) -> GShareConfig {
        GShareConfig {
            history_size_bits,
            pht_counter_bits: 2,
            initial_bhr_state: 0,
            initial_pht_state: 0,
        }
    }

    #[test]
    fn pc_bits_is_spare_pht_entries() {
        assert_eq!(two_level(1, 2, 6).pc_bits(), 2);
        assert_eq!(two_level(1, 4, 16).pc_bits(), 0);
        assert_eq!(two_level(1, 8, 1024).pc_bits(), 768);
    }

    #[test]
    fn concatenated_index() {
        let p = two_level(2, 2, 6).build().unwrap();
        // ((0b10 << 2) | (0b111 & 0b11)) % 6 == 11 % 6
        assert_eq!(p.pht_index(0b10, 0b111), 5);
        assert_eq!(p.pht_index(0b01, 0b100), 4);
        assert_eq!(p.pht_index(0, 0), 0);
    }

    #[test]
    fn wide_pc_field_index() {
        // 2^768 is a multiple of 1024, so only the PC matters
        let p = two_level(1, 8, 1024).build().unwrap();
        for (h, pc) in [(0, 0x1234), (0xff, 0x1234), (0x5a, u64::MAX)] {
            assert_eq!(p.pht_index(h, pc), (pc % 1024) as usize);
        }

        // 2^184 mod 200 is nonzero, so the history still contributes
        let p = two_level(1, 4, 200).build().unwrap();
        assert_eq!(p.pc_bits(), 184);
        let mut shift = 1u128;
        for _ in 0..184 { shift = (shift * 2) % 200; }
        for (h, pc) in [(0u64, 7u64), (3, 7), (15, 0xdead_beef)] {
            let expected = (h as u128 * shift + pc as u128) % 200;
            assert_eq!(p.pht_index(h, pc), expected as usize);
        }
    }

    #[test]
    fn bhr_holds_recent_outcomes() {
        let pattern = [T, N, N, T, T, T, N, T, N, N, T];
        for h in 1..=6u64 {
            let mut p = two_level(4, h, 1 << h).build().unwrap();
            let mut expected = 0u64;
            for o in pattern {
                p.update("beq", 0x42, 0x40, o);
                expected = ((expected << 1) | o as u64) & ((1 << h) - 1);
            }
            assert_eq!(p.history(0x42).value(), expected);
            // Other registers are untouched
            assert_eq!(p.history(0x43).value(), 0);
        }
    }

    #[test]
    fn pht_updated_with_pre_shift_history() {
        let mut p = TwoLevelConfig {
            pht_counter_bits: 1,
            ..two_level(1, 1, 2)
        }.build().unwrap();

        // History 0 selects entry 0, which learns 'taken'. The history is now
        // 1 and selects the untouched entry 1.
        p.update("beq", 0, 0, T);
        assert_eq!(p.pht().values().collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(p.predict("beq", 0, 0), N);
        p.update("beq", 0, 0, N);
        assert_eq!(p.predict("beq", 0, 0), T);
    }

    #[test]
    fn learns_alternating_pattern() {
        let mut p = two_level(1, 2, 4).build().unwrap();
        let mut hits = 0;
        for i in 0..64 {
            let o = Outcome::from(i % 2 == 0);
            if i >= 16 && p.predict("bne", 0x80, 0x10) == o { hits += 1; }
            p.update("bne", 0x80, 0x10, o);
        }
        assert_eq!(hits, 48);
    }

    #[test]
    fn rejects_invalid_config() {
        assert_eq!(two_level(1, 4, 15).build().unwrap_err(),
            ConfigError::PhtTooSmall { entries: 15, history_bits: 4 });
        assert_eq!(two_level(0, 2, 4).build().unwrap_err(),
            ConfigError::NotPositive("num_bhrs"));
        assert!(matches!(
            TwoLevelConfig { initial_bhr_state: 4, ..two_level(1, 2, 4) }
                .build().unwrap_err(),
            ConfigError::InitialState { what: "BHR", .. }
        ));
        assert!(matches!(
            TwoLevelConfig { initial_pht_state: 4, ..two_level(1, 2, 4) }
                .build().unwrap_err(),
            ConfigError::InitialState { what: "PHT", .. }
        ));
        assert!(matches!(two_level(1, 64, 4).build().unwrap_err(),
            ConfigError::TooLarge { key: "history_size_bits", .. }));
    }

    #[test]
    fn oversized_tables_are_rejected() {
        assert_eq!(gshare(62).build().unwrap_err(), ConfigError::TooLarge {
            key: "history_size_bits", value: 62, max: 30
        });
        assert!(gshare(30).to_two_level().is_ok());
        assert!(matches!(two_level(1, 62, 1 << 62).build().unwrap_err(),
            ConfigError::TooLarge { key: "num_pht_entries", .. }));
        assert!(matches!(two_level(u64::MAX, 2, 4).build().unwrap_err(),
            ConfigError::TooLarge { key: "num_bhrs", .. }));
        assert!(matches!(two_level(1, 2, u64::MAX).build().unwrap_err(),
            ConfigError::TooLarge { key: "num_pht_entries", .. }));
    }

    #[test]
    fn reset_matches_fresh_predictor() {
        let cfg = TwoLevelConfig {
            initial_bhr_state: 0b101,
            initial_pht_state: 2,
            ..two_level(8, 3, 24)
        };
        let fresh = cfg.build().unwrap();
        let mut p = cfg.build().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let pc = rng.gen_range(0..256);
            p.update("beq", pc, 0, Outcome::from(rng.gen::<bool>()));
        }
        p.reset();
        for pc in 0..256 {
            assert_eq!(p.predict("beq", pc, 0), fresh.predict("beq", pc, 0));
            assert_eq!(p.history(pc), fresh.history(pc));
        }
        assert!(p.pht().values().eq(fresh.pht().values()));
    }

    #[test]
    fn gshare_is_single_global_register() {
        let p = gshare(4).build().unwrap();
        assert_eq!(p.name(), "GShare");
        assert_eq!(p.config().num_bhrs, 1);
        assert_eq!(p.pht().size(), 16);
        assert_eq!(p.pc_bits(), 0);
        assert_eq!(p.combinator(), IndexCombinator::Xor);
    }

    #[test]
    fn gshare_history_is_global() {
        let mut p = gshare(3).build().unwrap();
        p.update("beq", 0x10, 0, T);
        p.update("bne", 0x24, 0, T);
        p.update("blt", 0x38, 0, N);
        assert_eq!(p.history(0x1000).value(), 0b110);
    }

    #[test]
    fn gshare_initial_states_are_crossed() {
        let p = GShareConfig {
            initial_bhr_state: 3,
            initial_pht_state: 1,
            ..gshare(4)
        }.build().unwrap();
        assert!(p.pht().values().all(|v| v == 3));
        assert_eq!(p.history(0).value(), 1);

        // Validated against the table each value actually seeds
        let err = GShareConfig { initial_bhr_state: 4, ..gshare(4) }
            .build().unwrap_err();
        assert!(matches!(err, ConfigError::InitialState { what: "PHT", .. }));
        let err = GShareConfig { initial_pht_state: 16, ..gshare(4) }
            .build().unwrap_err();
        assert!(matches!(err, ConfigError::InitialState { what: "BHR", .. }));
    }

    #[test]
    fn combinators_agree_only_on_disjoint_fields() {
        let pc_bits = 4;
        let mask = (1u128 << pc_bits) - 1;
        for h in 0..16u128 {
            for pc in 0..64u128 {
                let hi = h << pc_bits;
                let lo = pc & mask;
                assert_eq!(IndexCombinator::Concat.combine(hi, lo),
                    IndexCombinator::Xor.combine(hi, lo));
            }
        }

        // Overlapping fields
        let (hi, lo) = (0b0110u128, 0b0011u128);
        assert_eq!(IndexCombinator::Concat.combine(hi, lo), 0b0111);
        assert_eq!(IndexCombinator::Xor.combine(hi, lo), 0b0101);
    }

    #[test]
    fn options_defaults() {
        let opts = PredictorOptions::new()
            .with("num_bhrs", 16)
            .with("history_size_bits", 4)
            .with("num_pht_entries", 32);
        let cfg = TwoLevelConfig::from_options(&opts).unwrap();
        assert_eq!(cfg.pht_counter_bits, 2);
        assert_eq!(cfg.initial_bhr_state, 0);
        assert_eq!(cfg.combinator, IndexCombinator::Concat);

        assert_eq!(GShareConfig::from_options(&PredictorOptions::new()),
            Err(ConfigError::MissingOption("history_size_bits")));
    }
}

//! Types for implementing a table of predictors.

use crate::error::ConfigError;

/// Interface to a direct-mapped table of predictor state.
///
/// Tables never correct for aliasing: any two inputs which reduce to the
/// same index share an entry.
pub trait PredictorTable {
    /// The type of input to the table used to form an index.
    type Input;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Given some input, return the corresponding index into the table.
    fn get_index(&self, input: Self::Input) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Return every entry to its initial state.
    fn reset(&mut self);
}

/// Largest number of entries allowed in a single predictor table.
pub const MAX_TABLE_ENTRIES: u64 = 1 << 30;

/// Allocate the storage for a table with 'entries' copies of 'init'.
///
/// 'key' names the option which determines the size of the table.
pub fn alloc_table<T: Clone>(key: &'static str, entries: u64, init: T)
    -> Result<Vec<T>, ConfigError>
{
    if entries == 0 {
        return Err(ConfigError::NotPositive(key));
    }
    let len = usize::try_from(entries).ok()
        .filter(|_| entries <= MAX_TABLE_ENTRIES)
        .ok_or(ConfigError::TooLarge { key, value: entries, max: MAX_TABLE_ENTRIES })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ConfigError::Allocation { key, entries })?;
    data.resize(len, init);
    Ok(data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alloc_table_limits() {
        assert_eq!(alloc_table("table_size", 3, 7u8).unwrap(), vec![7, 7, 7]);
        assert_eq!(alloc_table("table_size", 0, 0u8).unwrap_err(),
            ConfigError::NotPositive("table_size"));
        assert_eq!(alloc_table("num_pht_entries", u64::MAX, 0u8).unwrap_err(),
            ConfigError::TooLarge {
                key: "num_pht_entries", value: u64::MAX, max: MAX_TABLE_ENTRIES
            });
        assert!(alloc_table("table_size", MAX_TABLE_ENTRIES + 1, 0u8).is_err());
    }
}

//! Keyword options used to construct predictors.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// A set of `key=value` options passed to a predictor constructor.
///
/// Each predictor reads the keys it understands and ignores the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PredictorOptions {
    data: BTreeMap<String, u64>,
}

impl PredictorOptions {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    /// Parse a list of `key=value` strings.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        let mut res = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=')
                .ok_or_else(|| ConfigError::MalformedOption(arg.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::MalformedOption(arg.to_string()));
            }
            let value = parse_value(value.trim()).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            })?;
            res.data.insert(key.to_string(), value);
        }
        Ok(res)
    }

    /// Add an option, replacing any previous value for the same key.
    pub fn set(&mut self, key: impl ToString, value: u64) -> &mut Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Builder-style variant of [PredictorOptions::set].
    pub fn with(mut self, key: impl ToString, value: u64) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.data.get(key).copied()
    }

    /// Return the value of an option with no default.
    pub fn required(&self, key: &'static str) -> Result<u64, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingOption(key))
    }

    pub fn get_or(&self, key: &str, default: u64) -> u64 {
        self.get(key).unwrap_or(default)
    }

    /// Return the keys which are not in 'known'.
    pub fn unrecognized<'a>(&'a self, known: &'a [&'a str])
        -> impl Iterator<Item = &'a str> + 'a
    {
        self.data.keys()
            .map(|k| k.as_str())
            .filter(move |k| !known.contains(k))
    }

    /// Log (and otherwise ignore) any option not in 'known'.
    pub(crate) fn log_unrecognized(&self, predictor: &str, known: &[&str]) {
        for key in self.unrecognized(known) {
            log::debug!("{}: ignoring unrecognized option '{}'", predictor, key);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

impl std::fmt::Display for PredictorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first { write!(f, " ")?; }
            write!(f, "{}={}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for PredictorOptions {
    type Err = ConfigError;

    /// Parse whitespace-separated `key=value` pairs.
    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let args: Vec<&str> = s.split_whitespace().collect();
        Self::parse(&args)
    }
}

/// Parse an unsigned integer written in decimal, or with a `0x`/`0b`/`0o`
/// prefix. Underscores are allowed as digit separators.
fn parse_value(s: &str) -> Option<u64> {
    let s = s.replace('_', "");
    let lower = s.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else {
        lower.parse::<u64>().ok()
    }
}

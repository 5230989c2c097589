//! Reading branch traces.
//!
//! A trace is a text file with one branch per line:
//!
//! ```text
//! opcode,pc_hex,target_hex,taken_flag
//! beq,0x10,0x8,1
//! ```
//!
//! where `taken_flag` is exactly `0` or `1`. Blank lines are ignored.

use std::fs::File;
use std::io::{ BufRead, BufReader, Lines };
use std::path::Path;

use crate::branch::*;
use crate::error::TraceError;

/// Parse a single line of a trace.
///
/// Returns `Ok(None)` for a blank line. 'line' is the 1-based line number
/// used in error messages.
pub fn parse_record(text: &str, line: usize)
    -> Result<Option<BranchRecord>, TraceError>
{
    if text.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = text.split(',').collect();
    let &[opcode, pc, tgt, taken] = fields.as_slice() else {
        return Err(TraceError::FieldCount { line, found: fields.len() });
    };

    let pc = parse_hex(pc, line)?;
    let tgt = parse_hex(tgt, line)?;
    let outcome = match taken.trim() {
        "1" => Outcome::T,
        "0" => Outcome::N,
        other => {
            return Err(TraceError::InvalidOutcome {
                line, value: other.to_string()
            });
        }
    };
    Ok(Some(BranchRecord::new(opcode, pc, tgt, outcome)))
}

fn parse_hex(s: &str, line: usize) -> Result<u64, TraceError> {
    let t = s.trim();
    let digits = t.strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);
    u64::from_str_radix(digits, 16).map_err(|_| {
        TraceError::InvalidAddress { line, value: s.to_string() }
    })
}

/// An iterator over the records in a text trace.
///
/// Iteration stops after the first error.
pub struct TraceReader<R: BufRead> {
    name: String,
    lines: Lines<R>,
    line: usize,
    failed: bool,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(name: impl ToString, reader: R) -> Self {
        Self {
            name: name.to_string(),
            lines: reader.lines(),
            line: 0,
            failed: false,
        }
    }

    pub fn name(&self) -> &str { &self.name }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize { self.line }
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let f = File::open(path).map_err(|e| TraceError::Io(name.clone(), e))?;
        Ok(Self::new(name, BufReader::new(f)))
    }
}

impl<'a> TraceReader<&'a [u8]> {
    /// Read a trace held in memory.
    pub fn from_text(name: impl ToString, text: &'a str) -> Self {
        Self::new(name, text.as_bytes())
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<BranchRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(TraceError::Io(self.name.clone(), e)));
                }
            };
            self.line += 1;
            match parse_record(&text, self.line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// A list of trace files, opened one at a time.
pub struct TraceSet {
    /// A list of filenames
    pub files: Vec<String>,
    cur: usize,
}
impl TraceSet {
    pub fn new() -> Self {
        Self { files: Vec::new(), cur: 0 }
    }

    pub fn new_from_slice(strings: &[String]) -> Self {
        Self { files: strings.to_vec(), cur: 0 }
    }

    pub fn add_file(&mut self, s: impl ToString) {
        self.files.push(s.to_string());
    }
}

impl Default for TraceSet {
    fn default() -> Self { Self::new() }
}

impl Iterator for TraceSet {
    type Item = Result<TraceReader<BufReader<File>>, TraceError>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.cur)?;
        self.cur += 1;
        Some(TraceReader::open(path))
    }
}

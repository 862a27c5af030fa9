// reads valgrind-style memory traces
//
//  I 0400d7d4,8
//   M 0421c7f0,4
//   L 04f6b868,8
//
// one record per line: operation, hex address, comma, decimal size

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::FusedIterator;
use std::path::Path;

use log::{debug, warn};

use crate::commons::{AccessEvent, AccessKind};
use crate::error::Error;

/// Parses one trace record, `None` if it is malformed.
pub fn parse_record(line: &str) -> Option<AccessEvent> {
    let line = line.trim();
    let mut chars = line.chars();
    let kind = AccessKind::from_code(chars.next()?)?;
    let (addr, size) = chars.as_str().trim_start().split_once(',')?;

    let addr = addr.trim();
    let addr = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    // from_str_radix tolerates a sign, a hex address does not
    if addr.is_empty() || !addr.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let addr = u64::from_str_radix(addr, 16).ok()?;
    let size = size.trim().parse::<u32>().ok()?;
    Some(AccessEvent::new(kind, addr, size))
}

/// A trace as a lazy sequence of [`AccessEvent`]s.
///
/// Ends at end of input, at the first malformed record and on a read error.
/// Blank lines are skipped. Not restartable: once it has returned `None` it
/// keeps returning `None`. The underlying reader (usually the trace file) is
/// released when the `TraceReader` is dropped.
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
    records: usize,
    truncated: bool,
    done: bool,
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::OpenTrace(path.to_path_buf(), e))?;
        debug!("reading trace {}", path.display());
        Ok(TraceReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader {
            lines: reader.lines(),
            line_no: 0,
            records: 0,
            truncated: false,
            done: false,
        }
    }

    /// records handed out so far
    pub fn records(&self) -> usize {
        self.records
    }
    /// whether reading stopped before the end of input
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn stop(&mut self, truncated: bool) -> Option<AccessEvent> {
        self.done = true;
        self.truncated = truncated;
        None
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = AccessEvent;

    fn next(&mut self) -> Option<AccessEvent> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                None => return self.stop(false),
                Some(Err(e)) => {
                    warn!("trace read error after line {}: {e}, stopping", self.line_no);
                    return self.stop(true);
                }
                Some(Ok(line)) => line,
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return match parse_record(&line) {
                Some(event) => {
                    self.records += 1;
                    Some(event)
                }
                None => {
                    warn!(
                        "malformed trace record on line {}: {:?}, ignoring the rest of the trace",
                        self.line_no, line
                    );
                    self.stop(true)
                }
            };
        }
    }
}

impl<R: BufRead> FusedIterator for TraceReader<R> {}

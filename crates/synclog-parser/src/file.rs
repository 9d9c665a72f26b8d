use synclog_types::{Dialect, TransferRecord};

use crate::grammar::{LineOutcome, parse_line};

/// Line counts gathered while parsing one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub lines: usize,
    pub accepted: usize,
    pub structural: usize,
    pub rejected: usize,
}

/// Accepted records of one file, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub records: Vec<TransferRecord>,
    pub summary: ParseSummary,
}

/// Parse a whole report. Lines that don't produce a record are dropped,
/// never reported as errors; a file without data lines is a valid empty batch.
pub fn parse_content(content: &str, dialect: Dialect) -> ParsedFile {
    let mut parsed = ParsedFile::default();

    for line in content.lines() {
        parsed.summary.lines += 1;
        match parse_line(line, dialect) {
            LineOutcome::Record(record) => {
                parsed.summary.accepted += 1;
                parsed.records.push(record);
            }
            LineOutcome::Structural => parsed.summary.structural += 1,
            LineOutcome::Rejected(_) => parsed.summary.rejected += 1,
        }
    }

    parsed
}

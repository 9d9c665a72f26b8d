// Transfer report parsing
// Pure functions over text: no file or store access happens here

mod failed;
mod file;
mod grammar;
mod success;

pub use file::{ParseSummary, ParsedFile, parse_content};
pub use grammar::{LineOutcome, RejectReason, parse_line};

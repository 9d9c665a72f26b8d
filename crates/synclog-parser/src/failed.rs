use regex::Regex;
use std::sync::LazyLock;
use synclog_types::TransferOutcome;

use crate::grammar::{
    CommonFields, LineOutcome, RejectReason, capture, is_structural, not_available, split_header,
};

/// Column header written at the top of every failure report
pub(crate) const COLUMN_HEADER: &str =
    "[file size, src --> dst, cost(ms), status code, error code, error message, request id]";

static ERROR_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"error code \[(?P<value>[^\]]+)\]").unwrap());

static ERROR_MESSAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"error message \[(?P<value>[^\]]+)\]").unwrap());

/// Failure report line:
/// `<ts> <size>, <src> --> <dst>, cost [ms], status [code], error code [..], error message [..], request id [..]`
///
/// Failures raised before a path was resolved carry no path pair; those are
/// kept as long as they have an error message.
pub(crate) fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if is_structural(line, COLUMN_HEADER) {
        return LineOutcome::Structural;
    }

    let header = match split_header(line) {
        Ok(header) => header,
        Err(reason) => return LineOutcome::Rejected(reason),
    };

    let fields = CommonFields::extract(header.payload);
    let error_code = capture(&ERROR_CODE_REGEX, header.payload).unwrap_or_default();
    let error_message = capture(&ERROR_MESSAGE_REGEX, header.payload).unwrap_or_default();

    if !fields.has_paths() && error_message.is_empty() {
        return LineOutcome::Rejected(RejectReason::MissingPaths);
    }

    LineOutcome::Record(fields.into_record(
        header.timestamp,
        not_available(),
        TransferOutcome::Failed {
            error_code,
            error_message,
        },
    ))
}

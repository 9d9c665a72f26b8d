use regex::Regex;
use std::sync::LazyLock;
use synclog_types::{NOT_AVAILABLE, TransferOutcome};

use crate::grammar::{
    CommonFields, LineOutcome, RejectReason, capture, is_structural, leading_fields,
    not_available, split_header,
};

/// Column header written at the top of every success report
pub(crate) const COLUMN_HEADER: &str =
    "[file size, md5 value, src --> dst, cost(ms), status code, success message, request id]";

static MESSAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"success message \[(?P<value>[^\]]+)\]").unwrap());

/// Success report line:
/// `<ts> <size>, <md5>, <src> --> <dst>, cost [ms], status [code], success message [..], request id [..]`
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
    if !fields.has_paths() {
        return LineOutcome::Rejected(RejectReason::MissingPaths);
    }

    let md5 = fields
        .paths
        .as_ref()
        .and_then(|paths| leading_fields(header.payload, paths).get(1).copied())
        .filter(|hash| !hash.is_empty() && *hash != NOT_AVAILABLE)
        .map(str::to_string)
        .unwrap_or_else(not_available);

    let message = capture(&MESSAGE_REGEX, header.payload).unwrap_or_else(not_available);

    LineOutcome::Record(fields.into_record(
        header.timestamp,
        md5,
        TransferOutcome::Succeeded { message },
    ))
}

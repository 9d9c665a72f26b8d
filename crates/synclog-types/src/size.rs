use regex::Regex;
use std::sync::LazyLock;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;
pub const TIB: u64 = 1024 * GIB;

/// Largest byte count a record can carry; the store keeps sizes as signed
/// 64-bit integers.
pub const MAX_FILE_SIZE: u64 = i64::MAX as u64;

/// Everything that can't be part of a size token
static NOISE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)[^0-9.KMGTB]").unwrap());

/// Leading decimal run followed by an optional binary unit
static SIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?P<value>[\d.]+)(?P<unit>[KMGT]?B)?").unwrap());

/// Convert a human size string ("1.5MB", "300 KB", "42") into a byte count.
///
/// Units are powers of 1024 and default to bytes. Anything that can't be
/// read as a size (empty, `n/a`, garbage) is 0. The result is rounded to the
/// nearest byte, so the same input always yields the same count. Sizes
/// beyond [`MAX_FILE_SIZE`] are capped there.
pub fn parse_file_size(size: &str) -> u64 {
    let size = size.trim();
    if size.is_empty() || size.eq_ignore_ascii_case("n/a") {
        return 0;
    }

    let cleaned = NOISE_REGEX.replace_all(size, "");
    let Some(caps) = SIZE_REGEX.captures(&cleaned) else {
        return 0;
    };

    let Some(value) = leading_decimal(&caps["value"]) else {
        return 0;
    };

    let unit = caps
        .name("unit")
        .map(|m| m.as_str().to_ascii_uppercase())
        .unwrap_or_else(|| "B".to_string());

    let multiplier = match unit.as_str() {
        "KB" => KIB,
        "MB" => MIB,
        "GB" => GIB,
        "TB" => TIB,
        _ => 1,
    };

    let bytes = value * multiplier as f64;
    if bytes.is_nan() || bytes <= 0.0 {
        0
    } else if bytes >= MAX_FILE_SIZE as f64 {
        MAX_FILE_SIZE
    } else {
        bytes.round() as u64
    }
}

/// Read the longest decimal prefix, so "1.2.3" is 1.2
fn leading_decimal(digits: &str) -> Option<f64> {
    let end = digits
        .match_indices('.')
        .nth(1)
        .map(|(idx, _)| idx)
        .unwrap_or(digits.len());

    digits[..end].parse::<f64>().ok()
}

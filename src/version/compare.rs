//! Dot-separated version comparison.
//!
//! Segments are compared numerically left to right. Missing segments count
//! as `0`, and so does any segment that is not a plain number: `"1.2.0-beta"`
//! compares equal to `"1.2"` because `"0-beta"` coerces to `0`, so a
//! pre-release suffix never triggers or suppresses an update lock on its own.

use std::cmp::Ordering;

/// Numeric value of one version segment.
///
/// An optional leading sign is accepted: `"+2"` is `2` and negatives clamp to
/// `0`. Anything else that is not a plain number is `0`, and numbers too
/// large for `u64` saturate.
pub fn parse_segment(segment: &str) -> u64 {
    let trimmed = segment.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if negative || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

/// Compare a remote version against the locally installed one.
pub fn compare(remote: &str, local: &str) -> Ordering {
    let remote: Vec<u64> = remote.split('.').map(parse_segment).collect();
    let local: Vec<u64> = local.split('.').map(parse_segment).collect();
    let len = remote.len().max(local.len());

    for i in 0..len {
        let r = remote.get(i).copied().unwrap_or(0);
        let l = local.get(i).copied().unwrap_or(0);
        match r.cmp(&l) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    Ordering::Equal
}

/// `true` when `remote` is strictly newer than `local`.
pub fn is_newer(remote: &str, local: &str) -> bool {
    compare(remote, local) == Ordering::Greater
}

//! Ticket identifier sequences.
//!
//! A ticket carries two identifiers assigned at creation and never changed:
//! a short code `EVQ-####` and a human-facing protocol `YYYYMMDD-N` whose
//! sequence restarts each day. Both are computed as max-plus-one over the
//! identifiers already persisted (including rows from the legacy table);
//! the persistence layer serializes generation with an advisory lock and
//! retries on the unique-constraint backstop.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Prefix of every ticket code.
pub const CODIGO_PREFIX: &str = "EVQ-";

/// Codes below this were issued manually before the system existed; the
/// generated sequence starts at `EVQ-0081`.
pub const CODIGO_FLOOR: u32 = 80;

/// Bound on the generate-check-insert retry loop.
pub const MAX_IDENTIFIER_ATTEMPTS: u32 = 5;

lazy_static! {
    static ref CODIGO_RE: Regex = Regex::new(r"(?i)^EVQ-(\d+)$").unwrap();
}

/// Parses the numeric suffix of a ticket code, tolerating case. Returns
/// `None` for anything that is not `EVQ-` followed by digits.
pub fn codigo_suffix(codigo: &str) -> Option<u32> {
    CODIGO_RE
        .captures(codigo.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Computes the next ticket code from the set of codes already in use.
///
/// Malformed codes are skipped; the result is max-plus-one over the valid
/// suffixes and the floor, zero-padded to four digits (wider once the
/// sequence outgrows 9999).
pub fn next_codigo<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(codigo_suffix)
        .max()
        .unwrap_or(0)
        .max(CODIGO_FLOOR);
    format!("{}{:04}", CODIGO_PREFIX, max + 1)
}

/// Day prefix of a protocol, `YYYYMMDD`.
pub fn protocolo_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parses the sequence suffix of a protocol for the given day. Protocols of
/// other days and malformed values yield `None`.
pub fn protocolo_suffix(protocolo: &str, prefix: &str) -> Option<u32> {
    let rest = protocolo.trim().strip_prefix(prefix)?.strip_prefix('-')?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Computes the next protocol for `date` from the protocols already in use.
/// The daily sequence starts at 1 and never zero-pads.
pub fn next_protocolo<'a, I>(date: NaiveDate, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = protocolo_prefix(date);
    let max = existing
        .into_iter()
        .filter_map(|p| protocolo_suffix(p, &prefix))
        .max()
        .unwrap_or(0);
    format!("{}-{}", prefix, max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_codigo_suffix_parsing() {
        assert_eq!(codigo_suffix("EVQ-0042"), Some(42));
        assert_eq!(codigo_suffix("evq-0100"), Some(100));
        assert_eq!(codigo_suffix(" EVQ-7 "), Some(7));
        assert_eq!(codigo_suffix("EVQ-"), None);
        assert_eq!(codigo_suffix("EVQ-12a"), None);
        assert_eq!(codigo_suffix("ABC-0001"), None);
    }

    #[test]
    fn test_next_codigo_respects_floor() {
        assert_eq!(next_codigo([]), "EVQ-0081");
        assert_eq!(next_codigo(["EVQ-0005", "EVQ-0012"]), "EVQ-0081");
    }

    #[test]
    fn test_next_codigo_increments_max() {
        assert_eq!(next_codigo(["EVQ-0081", "EVQ-0099", "EVQ-0090"]), "EVQ-0100");
    }

    #[test]
    fn test_next_codigo_skips_malformed() {
        assert_eq!(next_codigo(["EVQ-0100", "lixo", "EVQ-", "EVQ-9x"]), "EVQ-0101");
    }

    #[test]
    fn test_next_codigo_grows_past_padding() {
        assert_eq!(next_codigo(["EVQ-9999"]), "EVQ-10000");
        assert_eq!(next_codigo(["EVQ-10000"]), "EVQ-10001");
    }

    #[test]
    fn test_protocolo_prefix_format() {
        assert_eq!(protocolo_prefix(day(2026, 3, 5)), "20260305");
    }

    #[test]
    fn test_next_protocolo_starts_at_one() {
        assert_eq!(next_protocolo(day(2026, 3, 5), []), "20260305-1");
    }

    #[test]
    fn test_next_protocolo_increments_within_day() {
        let existing = ["20260305-1", "20260305-3", "20260305-2"];
        assert_eq!(next_protocolo(day(2026, 3, 5), existing), "20260305-4");
    }

    #[test]
    fn test_next_protocolo_resets_across_days() {
        let existing = ["20260304-9", "20260304-10"];
        assert_eq!(next_protocolo(day(2026, 3, 5), existing), "20260305-1");
    }

    #[test]
    fn test_protocolo_suffix_rejects_malformed() {
        assert_eq!(protocolo_suffix("20260305-", "20260305"), None);
        assert_eq!(protocolo_suffix("20260305-2b", "20260305"), None);
        assert_eq!(protocolo_suffix("202603052", "20260305"), None);
    }

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let mut codes: Vec<String> = vec![];
        for _ in 0..5 {
            let next = next_codigo(codes.iter().map(String::as_str));
            codes.push(next);
        }
        let suffixes: Vec<u32> = codes.iter().map(|c| codigo_suffix(c).unwrap()).collect();
        assert_eq!(suffixes, vec![81, 82, 83, 84, 85]);
    }
}

//! MSISDN list hygiene.

use std::collections::HashSet;

/// Length of a national subscriber number.
pub const MSISDN_LENGTH: usize = 9;

/// Whether `candidate`, once trimmed, is a 9-digit subscriber number.
pub fn is_valid_msisdn(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    trimmed.len() == MSISDN_LENGTH && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// Trim, filter and deduplicate a raw list of subscriber numbers.
///
/// Order of first occurrences is preserved.
pub fn clean_msisdn_list<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|item| {
            let trimmed = item.as_ref().trim();
            is_valid_msisdn(trimmed).then(|| trimmed.to_string())
        })
        .filter(|msisdn| seen.insert(msisdn.clone()))
        .collect()
}

//! Domain normalization and ranking eligibility

use std::collections::HashSet;

/// Extract a bare hostname from an install URL.
///
/// Strips a leading `http://` or `https://` scheme (those two literals only,
/// case-sensitive) and truncates everything from the first `/` onward. No
/// validation is performed: a malformed input yields a malformed hostname,
/// and a port suffix is kept as-is.
pub fn normalize_domain(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    match without_scheme.find('/') {
        Some(pos) => without_scheme[..pos].to_string(),
        None => without_scheme.to_string(),
    }
}

/// Decide whether a domain should be sent to the ranking source.
///
/// Rules, evaluated in order with short-circuit on the first failure:
/// 1. the domain has already been ranked (present in `existing_domains`);
/// 2. the domain contains no `.` (not a plausible production host);
/// 3. the domain ends with a decimal digit (IP-address-like or placeholder);
/// 4. the domain ends with one of the configured excluded suffixes.
///
/// Pure predicate; never mutates the existing-domain set.
pub fn is_eligible(
    domain: &str,
    excluded_suffixes: &[String],
    existing_domains: &HashSet<String>,
) -> bool {
    if existing_domains.contains(domain) {
        return false;
    }

    // A production domain contains at least one dot and does not end with a number.
    if !domain.contains('.') {
        return false;
    }
    if domain.ends_with(|c: char| c.is_ascii_digit()) {
        return false;
    }

    for suffix in excluded_suffixes {
        if domain.ends_with(suffix.as_str()) {
            return false;
        }
    }

    true
}

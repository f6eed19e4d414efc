//! Phone number normalization for the SMS gateway.

/// Country code substituted for a leading trunk-prefix `0`.
const COUNTRY_CODE: &str = "63";

/// Map a raw phone string to the gateway's international digit format.
///
/// Best effort only: input with no digits at all comes back trimmed with any
/// leading `+` removed, and length is never checked.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return raw.trim().trim_start_matches('+').to_string();
    }
    if digits.starts_with('0') {
        format!("{}{}", COUNTRY_CODE, &digits[1..])
    } else {
        digits
    }
}

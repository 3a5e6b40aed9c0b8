//! Token-level helpers shared by the intent matchers.

use engine::Money;

/// Lowercases and collapses runs of whitespace to single spaces.
pub(crate) fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if any needle occurs as a substring.
pub(crate) fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Parses a plain quantity token (`3`, `12`).
pub(crate) fn parse_qty(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parses a dollar token (`50`, `$50`, `12.50`) into a non-negative
/// amount. Signs are not accepted here; negative funds make no sense in
/// a chat command.
pub(crate) fn parse_money_token(token: &str) -> Option<Money> {
    let t = token.strip_prefix('$').unwrap_or(token);
    let mut chars = t.chars();
    if !chars.next()?.is_ascii_digit() {
        return None;
    }
    if !t.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    t.parse().ok()
}

/// Parses a booking-id fragment (`#a1b2c3` or `a1b2c3`): at least four
/// alphanumeric characters after the optional hash.
pub(crate) fn parse_fragment(token: &str) -> Option<String> {
    let t = token.strip_prefix('#').unwrap_or(token);
    if t.len() >= 4 && t.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(t.to_string())
    } else {
        None
    }
}

/// Parses a saved-place reference (`#1` or `1`), 1-based as typed.
pub(crate) fn parse_place_ref(token: &str) -> Option<usize> {
    let t = token.strip_prefix('#').unwrap_or(token);
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    t.parse().ok()
}

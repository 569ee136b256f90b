//! Slot extractors: pull head counts out of free text.
//!
//! Extraction never fails. Anything that cannot be read as a number is
//! treated as absent, and the callers see 0 or an empty list.

use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid digit regex"));

/// Parse a token after stripping every non-digit character from it.
fn token_number(token: &str) -> Option<u32> {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Find the count attached to `keyword`.
///
/// Splits on whitespace and, for each token starting with `keyword`, returns
/// the number in the token right before it, or failing that the token right
/// after it. An empty keyword returns the first numeric token anywhere.
/// Returns 0 when nothing parses.
///
/// ```
/// use parkbot_chat::extract::extract_number;
///
/// assert_eq!(extract_number("2 adults and 1 child", "adult"), 2);
/// assert_eq!(extract_number("2 adults and 1 child", "child"), 1);
/// assert_eq!(extract_number("we are 3", ""), 3);
/// ```
pub fn extract_number(text: &str, keyword: &str) -> u32 {
    let lowered = text.to_lowercase();
    let keyword = keyword.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    if keyword.is_empty() {
        return tokens.iter().find_map(|t| token_number(t)).unwrap_or(0);
    }

    for (i, token) in tokens.iter().enumerate() {
        if !token.starts_with(&keyword) {
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| tokens.get(j));
        let after = tokens.get(i + 1);
        if let Some(n) = before
            .and_then(|t| token_number(t))
            .or_else(|| after.and_then(|t| token_number(t)))
        {
            return n;
        }
    }
    0
}

/// Up to `max_count` integers in order of appearance, read from digit runs.
///
/// Runs too large for a `u32` are skipped.
pub fn extract_numbers(text: &str, max_count: usize) -> Vec<u32> {
    DIGIT_RUN_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .take(max_count)
        .collect()
}

/// Adult and child counts from a composition answer.
///
/// Tries the "adult" and "child" keywords first. When both come back 0 but
/// the text has digits, the first two numbers are read as adults, children.
pub fn extract_composition(text: &str) -> (u32, u32) {
    let adults = extract_number(text, "adult");
    let children = extract_number(text, "child");
    if adults > 0 || children > 0 {
        return (adults, children);
    }

    let numbers = extract_numbers(text, 2);
    (
        numbers.first().copied().unwrap_or(0),
        numbers.get(1).copied().unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // extract_number
    // =========================================================================

    #[test]
    fn test_number_before_keyword() {
        assert_eq!(extract_number("2 adults and 1 child", "adult"), 2);
        assert_eq!(extract_number("2 adults and 1 child", "child"), 1);
        assert_eq!(extract_number("3 children", "child"), 3);
    }

    #[test]
    fn test_number_after_keyword() {
        assert_eq!(extract_number("adults: 4", "adult"), 4);
        assert_eq!(extract_number("with children: 2", "child"), 2);
    }

    #[test]
    fn test_number_before_wins_over_after() {
        assert_eq!(extract_number("1 adult 5", "adult"), 1);
    }

    #[test]
    fn test_empty_keyword_takes_first_number() {
        assert_eq!(extract_number("we are 3", ""), 3);
        assert_eq!(extract_number("3 or maybe 4", ""), 3);
        assert_eq!(extract_number("no numbers here", ""), 0);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert_eq!(extract_number("2 ADULTS", "adult"), 2);
    }

    #[test]
    fn test_strips_non_digits_in_token() {
        assert_eq!(extract_number("(2) adults", "adult"), 2);
        assert_eq!(extract_number("about 5, thanks", ""), 5);
    }

    #[test]
    fn test_missing_keyword_returns_zero() {
        assert_eq!(extract_number("2 people", "adult"), 0);
        assert_eq!(extract_number("adults", "adult"), 0);
        assert_eq!(extract_number("", "child"), 0);
    }

    #[test]
    fn test_overflow_is_not_a_number() {
        assert_eq!(extract_number("99999999999999 adults", "adult"), 0);
    }

    // =========================================================================
    // extract_numbers
    // =========================================================================

    #[test]
    fn test_numbers_in_order() {
        assert_eq!(extract_numbers("2 adults 1 child", 2), vec![2, 1]);
        assert_eq!(extract_numbers("1, 2, 3, 4", 3), vec![1, 2, 3]);
    }

    #[test]
    fn test_numbers_glued_to_words() {
        assert_eq!(extract_numbers("2and1", 2), vec![2, 1]);
    }

    #[test]
    fn test_numbers_none_or_zero_max() {
        assert!(extract_numbers("none", 2).is_empty());
        assert!(extract_numbers("1 2", 0).is_empty());
    }

    // =========================================================================
    // extract_composition
    // =========================================================================

    #[test]
    fn test_composition_by_keyword() {
        assert_eq!(extract_composition("2 adults and 1 child"), (2, 1));
        assert_eq!(extract_composition("just 3 adults"), (3, 0));
        assert_eq!(extract_composition("2 kids and 1 child"), (0, 1));
    }

    #[test]
    fn test_composition_falls_back_to_bare_numbers() {
        assert_eq!(extract_composition("2 and 1"), (2, 1));
        assert_eq!(extract_composition("4"), (4, 0));
    }

    #[test]
    fn test_composition_without_numbers() {
        assert_eq!(extract_composition("a few of us"), (0, 0));
    }
}

//! Guesses which couriers issued a tracking number from its shape.
//!
//! Best effort only: an empty result means "ask every courier", and a wrong
//! guess just costs one not-found lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// 同一格式可能屬於多家快遞 (例如 10 碼純數字)
// 只接受 ASCII 數字
const PATTERNS: &[(&str, &str)] = &[
    ("acs", r"^[0-9]{10}$"),
    ("geniki", r"^[0-9]{10}$"),
    ("boxnow", r"^9[0-9]{9}$"),
    ("speedex", r"^[0-9]{12}$"),
    ("couriercenter", r"^[0-9]{11}$"),
    ("easymail", r"^[0-9]{11}$"),
    ("elta", r"^[A-Z]{2}[0-9]{9}[A-Z]{2}$"),
    ("skroutz", r"^SL[0-9A-Z]{8,12}$"),
];

static RULES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .map(|(courier, pattern)| {
            (
                *courier,
                Regex::new(pattern).expect("courier pattern should compile"),
            )
        })
        .collect()
});

/// 去掉空白與連字號並轉大寫
pub fn normalize(tracking_number: &str) -> String {
    tracking_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Returns every courier whose number format matches, possibly none.
pub fn identify(tracking_number: &str) -> BTreeSet<String> {
    let normalized = normalize(tracking_number);
    if normalized.is_empty() {
        return BTreeSet::new();
    }

    RULES
        .iter()
        .filter(|(_, rule)| rule.is_match(&normalized))
        .map(|(courier, _)| courier.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_ten_digits_match_two_couriers() {
        assert_eq!(identify("7401234567"), set(&["acs", "geniki"]));
    }

    #[test]
    fn test_boxnow_prefix_adds_third_candidate() {
        assert_eq!(identify("9123456789"), set(&["acs", "boxnow", "geniki"]));
    }

    #[test]
    fn test_eleven_digits_are_ambiguous() {
        assert_eq!(identify("12345678901"), set(&["couriercenter", "easymail"]));
    }

    #[test]
    fn test_upu_format_is_elta() {
        assert_eq!(identify("re123456789gr"), set(&["elta"]));
        assert_eq!(identify(" RE 123 456 789 GR "), set(&["elta"]));
    }

    #[test]
    fn test_skroutz_and_speedex() {
        assert_eq!(identify("SL00012345"), set(&["skroutz"]));
        assert_eq!(identify("7000-1234-5678"), set(&["speedex"]));
    }

    #[test]
    fn test_unknown_shapes_yield_empty_set() {
        assert!(identify("").is_empty());
        assert!(identify("hello").is_empty());
        assert!(identify("123").is_empty());
    }

    #[test]
    fn test_only_ascii_digits_count() {
        assert!(identify("٧٤٠١٢٣٤٥٦٧").is_empty());
        assert!(identify("RE١٢٣٤٥٦٧٨٩GR").is_empty());
    }

    #[test]
    fn test_every_rule_compiles() {
        assert_eq!(RULES.len(), PATTERNS.len());
    }
}

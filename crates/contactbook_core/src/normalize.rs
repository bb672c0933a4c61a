//! Field normalization and advisory validation.
//!
//! # Invariants
//! - `normalize_phone` never fails; it keeps at most one leading `+` followed
//!   by the input's digits in their original order.
//! - Validation is advisory: callers persist invalid values with a warning.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[a-zA-Z0-9]{2,}$").expect("valid email regex")
});

/// Non-blocking field warning attached to a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    InvalidPhone(String),
    InvalidEmail(String),
}

impl Display for ValidationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPhone(value) => {
                write!(f, "phone number `{value}` looks malformed; saved anyway")
            }
            Self::InvalidEmail(value) => {
                write!(f, "email `{value}` looks malformed; saved anyway")
            }
        }
    }
}

/// Canonicalizes a phone number to `+?<digits>`.
///
/// A lone `+` with no digits yields `""`.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if trimmed.starts_with('+') && !digits.is_empty() {
        format!("+{digits}")
    } else {
        digits
    }
}

/// Accepts phones carrying 7 to 15 digits after normalization.
pub fn is_valid_phone(raw: &str) -> bool {
    let normalized = normalize_phone(raw);
    let digit_count = normalized.trim_start_matches('+').len();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digit_count)
}

/// Accepts `local@domain.tld` with a 2+ character ASCII alphanumeric TLD.
pub fn is_valid_email(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && EMAIL_RE.is_match(trimmed)
}

/// Collects advisory warnings for raw, user-entered phone and email values.
/// Blank inputs are not checked.
pub fn field_warnings(raw_phone: &str, raw_email: &str) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let phone = raw_phone.trim();
    if !phone.is_empty() && !is_valid_phone(phone) {
        warnings.push(ValidationWarning::InvalidPhone(phone.to_string()));
    }
    let email = raw_email.trim();
    if !email.is_empty() && !is_valid_email(email) {
        warnings.push(ValidationWarning::InvalidEmail(email.to_string()));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::{
        field_warnings, is_valid_email, is_valid_phone, normalize_phone, ValidationWarning,
    };

    #[test]
    fn normalize_keeps_single_leading_plus_and_digits_in_order() {
        assert_eq!(normalize_phone(" +1 (555) 123-4567 "), "+15551234567");
        assert_eq!(normalize_phone("+-+44 20+7946"), "+44207946");
        assert_eq!(normalize_phone("555.123.4567"), "5551234567");
        assert_eq!(normalize_phone("1+2"), "12");
    }

    #[test]
    fn normalize_degenerate_inputs_yield_empty() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("   "), "");
        assert_eq!(normalize_phone("+"), "");
        assert_eq!(normalize_phone("call me"), "");
    }

    #[test]
    fn phone_validity_depends_on_digit_count() {
        assert!(is_valid_phone("123-4567"));
        assert!(!is_valid_phone("123"));
        assert!(is_valid_phone("+123456789012345"));
        assert!(!is_valid_phone("+1234567890123456"));
    }

    #[test]
    fn email_validity() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("  First.Last@Example.COM "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn email_tld_is_ascii_only() {
        assert!(is_valid_email("a@b.CO"));
        // Long s and Kelvin sign case-fold to ASCII letters under Unicode rules.
        assert!(!is_valid_email("a@b.\u{17f}\u{17f}"));
        assert!(!is_valid_email("a@b.\u{212a}\u{212a}"));
    }

    #[test]
    fn warnings_skip_blank_fields() {
        assert!(field_warnings("", "  ").is_empty());
        assert!(field_warnings("555-123-4567", "ada@example.com").is_empty());

        assert_eq!(
            field_warnings("call me", "ada@"),
            vec![
                ValidationWarning::InvalidPhone("call me".to_string()),
                ValidationWarning::InvalidEmail("ada@".to_string()),
            ]
        );
    }
}

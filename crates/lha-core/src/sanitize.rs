//! Input sanitizing for submitted form fields.
//!
//! These helpers mirror what a visitor-facing form needs: text is reduced to
//! a single clean line, emails are either well-formed or empty, and numeric
//! fields are read leniently from their leading digits.

use regex::Regex;
use std::sync::LazyLock;

/// Script and style elements, dropped together with their contents.
static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>")
        .expect("valid script/style pattern")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static PERCENT_OCTETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").expect("valid octet pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Pattern the form applies before leaving step 1.
static FORM_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Characters allowed in the local part of an address.
const LOCAL_EXTRA: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Reduce free text to a single trimmed line.
///
/// Drops script and style elements whole, strips the remaining HTML tags and
/// percent-encoded octets, then collapses every run of whitespace (tabs and
/// line breaks included) into one space.
pub fn sanitize_text(input: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(input, "");
    let without_tags = TAGS.replace_all(&without_scripts, "");
    let without_octets = PERCENT_OCTETS.replace_all(&without_tags, "");
    WHITESPACE
        .replace_all(&without_octets, " ")
        .trim()
        .to_string()
}

/// Return the trimmed address if it is syntactically valid, otherwise an
/// empty string.
pub fn sanitize_email(input: &str) -> String {
    let email = input.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return String::new();
    };
    if domain.contains('@') || local.is_empty() {
        return String::new();
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || LOCAL_EXTRA.contains(c));
    if !local_ok || !valid_domain(domain) {
        return String::new();
    }
    email.to_string()
}

fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// The looser check the form runs client-side before step 2.
pub fn looks_like_email(input: &str) -> bool {
    FORM_EMAIL.is_match(input)
}

/// Read an integer from the leading digits of a field.
///
/// Leading whitespace and a sign are accepted; anything after the digits is
/// ignored. Returns 0 when there are no digits, so `"abc"` and `""` both
/// read as zero and fail a positivity check.
pub fn leading_int(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let value = digits.parse::<i64>().unwrap_or(if digits.is_empty() { 0 } else { i64::MAX });
    if negative { -value } else { value }
}

/// Cut text down to `limit` words, appending an ellipsis when anything was
/// dropped. Tags are stripped and whitespace collapsed first.
pub fn trim_words(text: &str, limit: usize) -> String {
    let plain = TAGS.replace_all(text, " ");
    let words: Vec<&str> = plain.split_whitespace().collect();
    if words.len() > limit {
        format!("{}\u{2026}", words[..limit].join(" "))
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_strips_markup_and_whitespace() {
        assert_eq!(sanitize_text("  <b>Jane</b>\n\tDoe  "), "Jane Doe");
        assert_eq!(sanitize_text("W14%209JH"), "W149JH");
        assert_eq!(sanitize_text("<script>alert(1)</script>"), "");
        assert_eq!(sanitize_text("W14 <SCRIPT type=\"x\">\nalert(1)\n</script > 9JH"), "W14 9JH");
        assert_eq!(sanitize_text("<style>p { color: red }</style>Jane"), "Jane");
        assert_eq!(sanitize_text("<scripted>Jane</scripted>"), "Jane");
        assert_eq!(sanitize_text("   "), "");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email(" jane@example.co.uk "), "jane@example.co.uk");
        assert_eq!(sanitize_email("jane.o'neil+lha@example.com"), "jane.o'neil+lha@example.com");
        assert_eq!(sanitize_email("jane@localhost"), "");
        assert_eq!(sanitize_email("jane@@example.com"), "");
        assert_eq!(sanitize_email("@example.com"), "");
        assert_eq!(sanitize_email("ja ne@example.com"), "");
        assert_eq!(sanitize_email("jane@-example.com"), "");
        assert_eq!(sanitize_email("jane@example..com"), "");
        assert_eq!(sanitize_email("not-an-email"), "");
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("a@b.c"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a b@c.d"));
        assert!(!looks_like_email(""));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("2"), 2);
        assert_eq!(leading_int(" 3 bedrooms"), 3);
        assert_eq!(leading_int("2.7"), 2);
        assert_eq!(leading_int("-1"), -1);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
    }

    #[test]
    fn test_trim_words() {
        assert_eq!(trim_words("<p>Service  unavailable</p>", 30), "Service unavailable");
        let long = (1..=40).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let trimmed = trim_words(&long, 30);
        assert!(trimmed.starts_with("1 2 3"));
        assert!(trimmed.ends_with("30\u{2026}"));
        assert_eq!(trim_words("", 30), "");
    }
}

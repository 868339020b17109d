/// Identifier widths the catalog uses (ISBN-10 and ISBN-13).
const ISBN_LENGTHS: [usize; 2] = [10, 13];

/// Recover a catalog identifier from an indexed document's raw text.
///
/// The index stores documents of the shape `"<isbn13> <description...>"`, but
/// that format is not contractually guaranteed, so this is deliberately
/// forgiving: take the first whitespace-delimited token, strip surrounding
/// quotes, and accept it only if it is purely numeric with a known ISBN
/// width. Anything else yields `None` and the candidate is dropped.
pub fn extract(raw_text: &str) -> Option<&str> {
    let token = raw_text.split_whitespace().next()?.trim_matches('"');
    if !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && ISBN_LENGTHS.contains(&token.len())
    {
        Some(token)
    } else {
        None
    }
}

/// Whether a sidecar id returned by the index is itself a valid identifier.
pub fn is_valid(candidate: &str) -> bool {
    extract(candidate) == Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_thirteen_digit_prefix() {
        assert_eq!(extract("9780000000000 rest of text"), Some("9780000000000"));
    }

    #[test]
    fn accepts_ten_digit_prefix() {
        assert_eq!(extract("0002005883 some description"), Some("0002005883"));
    }

    #[test]
    fn rejects_non_numeric_token() {
        assert_eq!(extract("abc123"), None);
    }

    #[test]
    fn rejects_wrong_width() {
        assert_eq!(extract("978000000000"), None); // 12 digits
        assert_eq!(extract("97800000000001 tail"), None); // 14 digits
    }

    #[test]
    fn strips_surrounding_quotes() {
        assert_eq!(extract("\"9780000000000\""), Some("9780000000000"));
        assert_eq!(extract("\"9780000000000\" tail"), Some("9780000000000"));
    }

    #[test]
    fn empty_and_whitespace_yield_nothing() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("   "), None);
        assert_eq!(extract("\"\""), None);
    }

    #[test]
    fn validates_sidecar_ids() {
        assert!(is_valid("9780000000000"));
        assert!(!is_valid("book-42"));
    }
}

//! Small string helpers shared by the core types

/// Shortens `s` to at most `max_chars` characters for `Debug` output.
///
/// Strings that fit are returned as is. Longer ones are cut on a character boundary and end with
/// an ellipsis and their full length in characters.
///
/// ```
/// # use gazette_core::util::abbreviate;
/// assert_eq!(abbreviate("Dakar", 10), "Dakar");
/// assert_eq!(abbreviate("Côte d'Ivoire", 4), "Côte… (13 chars)");
/// ```
pub fn abbreviate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((end, _)) => format!("{}… ({} chars)", &s[..end], s.chars().count()),
    }
}

/// Returns `None` for empty or whitespace-only strings, the trimmed value otherwise.
pub fn non_blank(s: impl AsRef<str>) -> Option<String> {
    let trimmed = s.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate_cuts_on_char_boundary() {
        let s = "é".repeat(101);

        assert_eq!(abbreviate(&s, 100), format!("{}… (101 chars)", "é".repeat(100)));
        assert_eq!(abbreviate(&"é".repeat(100), 100), "é".repeat(100));
        assert_eq!(abbreviate("Dakar–Bamako", 6), "Dakar–… (12 chars)");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank("  \t"), None);
        assert_eq!(non_blank(" https://a.b "), Some("https://a.b".to_string()));
    }
}

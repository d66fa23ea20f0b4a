use once_cell::sync::Lazy;
use regex::Regex;

// Whitespace other than newline
static INLINE_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]+").expect("inline whitespace pattern"));

// Spaces hugging a newline, and repeated newlines
static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" *\n[ \n]*").expect("newline run pattern"));

/// Canonical form used by every downstream stage.
///
/// Carriage returns become newlines, whitespace runs collapse to one space,
/// spaces next to a newline are dropped and the result is trimmed.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = INLINE_WS.replace_all(&unified, " ");
    let tightened = NEWLINE_RUN.replace_all(&collapsed, "\n");
    tightened.trim().to_string()
}

/// Whitespace-separated token count.
#[inline]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in characters.
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank_inputs() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   \t \r\n  "), "");
    }

    #[test]
    fn test_collapses_inline_whitespace() {
        assert_eq!(normalize_text("  Hello \t  world  "), "Hello world");
    }

    #[test]
    fn test_carriage_returns_become_single_newlines() {
        assert_eq!(normalize_text("One.\r\n\r\nTwo.\rThree."), "One.\nTwo.\nThree.");
    }

    #[test]
    fn test_spaces_adjacent_to_newlines_are_trimmed() {
        assert_eq!(normalize_text("first line   \n   second"), "first line\nsecond");
    }

    #[test]
    fn test_counts() {
        assert_eq!(count_words("नमस्ते दुनिया"), 2);
        assert_eq!(count_words(""), 0);
        assert_eq!(char_len("नमस्ते"), 6);
        assert_eq!(char_len("abc"), 3);
    }
}

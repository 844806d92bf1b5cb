//! Character-safe text helpers shared by the extractors

/// Window of up to `radius` characters on each side of byte offset `at`.
///
/// The window starts `radius` characters before `at` and ends `radius`
/// characters after it, clamped to the text. `at` must lie on a char
/// boundary, which holds for any regex match start.
pub fn context_window(text: &str, at: usize, radius: usize) -> &str {
    let start = text[..at]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(at, |(i, _)| i);
    let end = text[at..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| at + i);
    &text[start..end]
}

/// Length in characters
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `max` characters of `s`
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_window_clamps() {
        let text = "The ancient sword glowed faintly.";
        assert_eq!(context_window(text, 0, 100), text);
        assert_eq!(context_window(text, 4, 4), "The anci");
        assert_eq!(context_window(text, 4, 0), "");
    }

    #[test]
    fn test_context_window_multibyte() {
        let text = "café — naïve résumé";
        let at = text.find("naïve").unwrap();
        let window = context_window(text, at, 3);

        assert_eq!(window, " — naï");
        assert!(char_len(window) <= 6);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}

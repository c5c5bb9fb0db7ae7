//! Text cleanup shared by message bodies and speaker names.

/// Zero-width and formatting characters that scraped text tends to carry.
const INVISIBLE: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}'];

/// Strip invisible characters, normalize non-breaking spaces, collapse
/// horizontal whitespace and drop blank lines. Returns an empty string when
/// nothing readable is left.
pub fn clean_text(raw: &str) -> String {
    let without_invisible: String = raw
        .chars()
        .filter(|c| !INVISIBLE.contains(c))
        .map(|c| if c == '\u{00A0}' || c == '\u{202F}' { ' ' } else { c })
        .collect();

    without_invisible
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_invisible_chars() {
        assert_eq!(clean_text("  hey\u{200B}   there \u{00A0}you "), "hey there you");
        assert_eq!(clean_text("line one\n\n   \nline   two"), "line one\nline two");
    }

    #[test]
    fn test_blank_input_becomes_empty() {
        assert_eq!(clean_text("   \u{FEFF}  \n "), "");
        assert_eq!(clean_text(""), "");
    }
}

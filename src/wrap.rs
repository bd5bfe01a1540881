//! Multi-line axis labels

/// Greedily pack words onto lines of at most `max_width` characters.
///
/// A line only breaks when the next word would push it past the width. A word
/// longer than the width gets a line to itself; it is never cut.
/// `wrap_label(s, w).join(" ") == s` for every input.
pub fn wrap_label(text: &str, max_width: usize) -> Vec<String> {
    let mut words = text.split(' ');
    let mut lines = Vec::new();
    let mut current = words.next().unwrap_or_default().to_string();
    let mut current_len = current.chars().count();

    for word in words {
        let word_len = word.chars().count();
        if current_len + 1 + word_len <= max_width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    lines.push(current);
    lines
}

/// Cut a label to `max_chars`, marking the cut with "..."
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_short_label_single_line() {
        assert_eq!(wrap_label("Youth mentoring", 32), vec!["Youth mentoring"]);
    }

    #[test]
    fn test_wrap_breaks_before_overflow() {
        let lines = wrap_label("Access to affordable childcare for working families", 20);
        assert_eq!(lines, vec!["Access to affordable", "childcare for", "working families"]);
    }

    #[test]
    fn test_wrap_exact_fit_stays_on_line() {
        // "aaaa bbbb" is 9 chars
        assert_eq!(wrap_label("aaaa bbbb", 9), vec!["aaaa bbbb"]);
        assert_eq!(wrap_label("aaaa bbbb", 8), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn test_wrap_long_word_alone() {
        let lines = wrap_label("a supercalifragilistic word", 6);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "word"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap_label("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        // 'é' is two bytes but one character
        assert_eq!(wrap_label("café olé", 8), vec!["café olé"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_label("Short", 20), "Short");
        assert_eq!(
            truncate_label("Arts and Culture Programs", 20),
            "Arts and Culture Pro..."
        );
    }

    proptest! {
        #[test]
        fn prop_wrap_rejoins_to_input(text in "[a-z]{0,12}( [a-z]{0,12}){0,8}", width in 1usize..40) {
            let lines = wrap_label(&text, width);
            prop_assert_eq!(lines.join(" "), text);
        }

        #[test]
        fn prop_overlong_lines_are_single_words(text in "[a-z]{1,12}( [a-z]{1,12}){0,8}", width in 1usize..40) {
            for line in wrap_label(&text, width) {
                if line.chars().count() > width {
                    prop_assert!(!line.contains(' '), "line {:?} exceeds {} with a space", line, width);
                }
            }
        }
    }
}

//! Greedy word wrap

use unicode_width::UnicodeWidthStr;

/// Wrap `text` into lines no wider than `width` display columns.
///
/// Tokens are whitespace-separated and rejoined with single spaces. A token
/// joins the current line while `line_width + token_width + tokens_on_line`
/// fits in `width`; a token wider than `width` gets a line to itself and is
/// never split. Empty or all-whitespace input yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_width = 0;

    for token in text.split_whitespace() {
        let token_width = token.width();
        if !current.is_empty() && current_width + token_width + current.len() > width {
            lines.push(current.join(" "));
            current.clear();
            current_width = 0;
        }
        current.push(token);
        current_width += token_width;
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collapse(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input() {
        assert!(wrap("", 10).is_empty());
        assert!(wrap("   \t ", 10).is_empty());
    }

    #[test]
    fn test_fits_on_one_line() {
        assert_eq!(wrap("hello world", 11), vec!["hello world"]);
    }

    #[test]
    fn test_breaks_between_words() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_long_token_sits_alone() {
        assert_eq!(
            wrap("a supercalifragilistic b", 5),
            vec!["a", "supercalifragilistic", "b"]
        );
        assert_eq!(wrap("overlong", 3), vec!["overlong"]);
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(wrap("  spaced    out\ttext  ", 80), vec!["spaced out text"]);
    }

    #[test]
    fn test_wide_characters_count_two_columns() {
        assert_eq!(wrap("\u{4f60}\u{597d} \u{4e16}\u{754c}", 4), vec!["\u{4f60}\u{597d}", "\u{4e16}\u{754c}"]);
    }

    #[test]
    fn test_reconstruction_and_width_bound() {
        let samples = [
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod",
            "x",
            "a bb ccc dddd eeeee ffffff ggggggg hhhhhhhh",
            "   leading and trailing   ",
            "[12:00:00] <bob> a-very-long-url-like-token-that-cannot-fit then short words",
        ];
        for text in samples {
            for width in 0..30 {
                let lines = wrap(text, width);
                assert_eq!(lines.join(" "), collapse(text), "width {}", width);
                for line in &lines {
                    let single_token = !line.contains(' ');
                    assert!(
                        line.width() <= width || single_token,
                        "line {:?} exceeds width {}",
                        line,
                        width
                    );
                    assert!(!line.is_empty());
                }
            }
        }
    }
}

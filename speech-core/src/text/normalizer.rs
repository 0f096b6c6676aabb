//! Whitespace normalization for extracted page text.

/// Clean up spacing in raw extracted text while keeping paragraph breaks.
///
/// This function:
/// - Turns carriage returns into newlines
/// - Collapses runs of spaces and tabs into one space
/// - Trims every line, then caps blank-line runs at one empty line
/// - Trims the result
///
/// Lines are trimmed before newline runs are capped so that lines holding
/// only whitespace count as blank, which keeps the function idempotent.
pub fn normalize(raw: &str) -> String {
    let text = raw.replace('\r', "\n");
    let text = collapse_horizontal_whitespace(&text);

    let trimmed_lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let text = collapse_newlines(&trimmed_lines.join("\n"));

    text.trim().to_string()
}

/// Collapse runs of spaces/tabs into a single space.
fn collapse_horizontal_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;

    for c in text.chars() {
        if c == ' ' || c == '\t' {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            prev_was_space = false;
            result.push(c);
        }
    }

    result
}

/// Collapse three or more consecutive newlines into exactly two.
fn collapse_newlines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newline_count = 0;

    for c in text.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push('\n');
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\r\n "), "");
    }

    #[test]
    fn test_normalize_carriage_returns() {
        assert_eq!(normalize("one\rtwo"), "one\ntwo");
        assert_eq!(normalize("one\r\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn test_normalize_horizontal_whitespace() {
        assert_eq!(normalize("Hello   world\t\tagain"), "Hello world again");
    }

    #[test]
    fn test_normalize_blank_runs() {
        let text = "Hello world\n\n\n\nNew paragraph";
        assert_eq!(normalize(text), "Hello world\n\nNew paragraph");
    }

    #[test]
    fn test_normalize_whitespace_only_lines_count_as_blank() {
        let text = "first\n  \n\t\n \nsecond";
        assert_eq!(normalize(text), "first\n\nsecond");
    }

    #[test]
    fn test_normalize_trims_lines() {
        let text = "   indented line   \n\ttabbed\t\n";
        assert_eq!(normalize(text), "indented line\ntabbed");
    }

    #[test]
    fn test_preserves_single_newlines() {
        assert_eq!(normalize("Line 1\nLine 2"), "Line 1\nLine 2");
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(text in "\\PC*") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_idempotent_whitespace_heavy(text in "[a-c .!?\\t\\r\\n]{0,80}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(!once.contains("\n\n\n"));
            prop_assert!(!once.contains("  "));
            prop_assert!(!once.contains('\r'));
        }
    }
}

//! Output comparison
//!
//! The policy is strict: trim leading/trailing whitespace, normalize CRLF
//! and lone CR to LF, then require exact equality. Internal whitespace is
//! significant. Language backends rely on this exact normalization; do not
//! relax it to token-based or float-tolerant comparison.

/// Normalize a program output for comparison.
pub fn normalize(text: &str) -> String {
    text.trim().replace("\r\n", "\n").replace('\r', "\n")
}

/// Compare actual vs. expected output after normalization.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize(actual) == normalize(expected)
}

/// Build the wrong-answer diagnostic from the normalized strings.
pub fn mismatch_diagnostic(actual: &str, expected: &str) -> String {
    format!(
        "Expected: '{}'\nGot: '{}'",
        normalize(expected),
        normalize(actual)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(outputs_match("hello\nworld", "hello\nworld"));
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert!(outputs_match("1 2\r\n", "1 2\n"));
    }

    #[test]
    fn test_lone_cr_is_normalized() {
        assert!(outputs_match("a\rb", "a\nb"));
    }

    #[test]
    fn test_edge_whitespace_ignored() {
        assert!(outputs_match("  42\n\n", "42"));
    }

    #[test]
    fn test_internal_whitespace_significant() {
        assert!(!outputs_match("1  2\n", "1 2\n"));
    }

    #[test]
    fn test_internal_blank_lines_significant() {
        assert!(!outputs_match("a\n\nb", "a\nb"));
    }

    #[test]
    fn test_mismatch_diagnostic_uses_normalized_strings() {
        let diag = mismatch_diagnostic("2\r\n", "1");
        assert_eq!(diag, "Expected: '1'\nGot: '2'");
    }
}

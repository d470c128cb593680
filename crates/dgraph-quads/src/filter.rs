//! Input sanitization for graph string values.
//!
//! Free-form strings headed for a subject, value, or query-literal position
//! are normalized through a single replacement pass so that user data cannot
//! break out of the query text the upsert builder synthesizes. The rule set
//! is a compile-time constant applied by a pure function, so it is safe to
//! call from anywhere without initialization order concerns.

/// Substrings replaced by a single space: the raw control characters
/// (backspace, form feed, line feed, carriage return, tab) and their literal
/// two-character escape spellings.
const SPACED: &[&str] = &[
    "\u{0008}",
    "\u{000C}",
    "\n",
    "\r",
    "\t",
    r"\b",
    r"\f",
    r"\n",
    r"\r",
    r"\t",
];

/// Characters removed outright. These carry structural meaning in the query
/// language and have no business inside a stored value.
const STRIPPED: &[char] = &['^', '{', '}', '`', '~', '\\', '"'];

/// Normalize a string for use as a graph subject, value, or query literal.
///
/// Control characters and their escape spellings become spaces, structural
/// characters are deleted, then surrounding whitespace and any leading
/// blank-node marker (`_:`) are stripped. The function is idempotent and
/// maps empty input to empty output.
pub fn sanitize(s: &str) -> String {
    let mut out = s.to_string();
    for pat in SPACED {
        out = out.replace(pat, " ");
    }
    out.retain(|c| !STRIPPED.contains(&c));

    // Stripping a marker can expose surrounding whitespace hiding another
    // marker, so trim and strip until the string stops changing.
    let mut t = out.as_str();
    loop {
        let trimmed = t.trim();
        match trimmed.strip_prefix("_:") {
            Some(rest) => t = rest,
            None => {
                t = trimmed;
                break;
            }
        }
    }
    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_characters_become_spaces() {
        assert_eq!(sanitize("a\nb"), "a b");
        assert_eq!(sanitize("a\tb"), "a b");
        assert_eq!(sanitize("a\r\nb"), "a  b");
        assert_eq!(sanitize("a\u{0008}b"), "a b");
        assert_eq!(sanitize("a\u{000C}b"), "a b");
    }

    #[test]
    fn escape_spellings_become_spaces() {
        assert_eq!(sanitize(r"a\nb"), "a b");
        assert_eq!(sanitize(r"a\tb"), "a b");
        assert_eq!(sanitize(r"a\b!"), "a !");
        assert_eq!(sanitize(r"a\fb"), "a b");
        assert_eq!(sanitize(r"a\rb"), "a b");
    }

    #[test]
    fn structural_characters_are_deleted() {
        assert_eq!(sanitize("a^b{c}d`e~f"), "abcdef");
        assert_eq!(sanitize(r"x\by"), "x y"); // escape spelling, spaced
        assert_eq!(sanitize("a\\x"), "ax"); // lone backslash, deleted
        assert_eq!(sanitize("say \"hi\""), "say hi");
    }

    #[test]
    fn blank_node_marker_is_stripped() {
        assert_eq!(sanitize("_:node7"), "node7");
        assert_eq!(sanitize("  _:node7  "), "node7");
        assert_eq!(sanitize("_:_:x"), "x");
        assert_eq!(sanitize("_: _:x"), "x");
        assert_eq!(sanitize("mid_:dle"), "mid_:dle");
    }

    #[test]
    fn empty_maps_to_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("\"\\^{}`~"), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "",
            "plain",
            "  padded  ",
            "a\nb\tc",
            r"esc\n\t\b",
            "_:blank",
            "_: _:x",
            "_:_:_:deep",
            "mix^{}`~\\\"_:y\r\n",
            "\u{0008}\u{000C}",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn interior_whitespace_is_preserved() {
        assert_eq!(sanitize("a  b"), "a  b");
    }
}

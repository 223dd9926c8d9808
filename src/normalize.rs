use once_cell::sync::Lazy;
use regex::Regex;

// Matches U+00A0 too, which wiki tables use for padding
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Canonicalize a string for identifier comparison.
///
/// Lowercases and drops every character that is not an ASCII letter or digit,
/// so `"GJT-68"`, `"gjt68"` and `" GJT 68 "` all compare equal.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Collapse whitespace runs in cell text into single spaces and trim the ends
pub fn clean_cell_text(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

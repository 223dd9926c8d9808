//! Shared utility functions

use std::io::Read;
use std::path::Path;

/// Truncate a string to max_len characters (not bytes), adding "..." if truncated.
/// Safe for non-ASCII content (emoji, CJK, etc).
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        chars[..max_len].iter().collect()
    } else {
        format!("{}...", chars[..max_len - 3].iter().collect::<String>())
    }
}

/// Read a whole file, or stdin when the path is "-"
pub fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Format a duration in milliseconds for display (e.g., "1.5s", "250ms")
pub fn format_delay(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

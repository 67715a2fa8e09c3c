//! Terminal display width helpers for item labels and titles.

/// Remove ANSI escape sequences (coloured labels) from `text`.
pub fn plain_text(text: &str) -> String {
    let clean = strip_ansi_escapes::strip(text);
    String::from_utf8_lossy(&clean).into_owned()
}

/// Display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(plain_text(text).as_str())
}

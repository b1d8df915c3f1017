/// Longest source excerpt shown under an answer, in characters.
pub const EXCERPT_CHARS: usize = 200;

/// Formats a byte count as kibibytes with two decimals, rounding half up.
///
/// Integer arithmetic keeps `10000` at `9.77 KB` instead of drifting with
/// float tie-breaking.
pub fn format_size_kb(bytes: u64) -> String {
    let hundredths = (u128::from(bytes) * 200 + 1024) / 2048;
    format!("{}.{:02} KB", hundredths / 100, hundredths % 100)
}

pub fn format_score(score: f64) -> String {
    format!("Score: {score:.2}")
}

pub fn format_elapsed(seconds: f64) -> String {
    format!("{seconds}s")
}

/// Truncates to [`EXCERPT_CHARS`] characters, appending `...` when cut.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Rounded completion percentage; an empty body counts as complete.
pub fn percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let loaded = loaded.min(total);
    let pct = (u128::from(loaded) * 100 + u128::from(total) / 2) / u128::from(total);
    pct.min(100) as u8
}

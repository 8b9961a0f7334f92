const SECONDS_IN_MINUTE: u32 = 60;
const SECONDS_IN_HOUR: u32 = 60 * SECONDS_IN_MINUTE;

/// Parses a colon separated `[hh:]mm:ss` length into seconds.
///
/// Anything that does not fit the format yields 0.
pub fn parse_length_text(text: &str) -> u32 {
    let parts: Option<Vec<u32>> = text
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect();

    let total = match parts.as_deref() {
        Some(&[hours, minutes, seconds]) => hours
            .checked_mul(SECONDS_IN_HOUR)
            .and_then(|h| minutes.checked_mul(SECONDS_IN_MINUTE)?.checked_add(h))
            .and_then(|hm| hm.checked_add(seconds)),
        Some(&[minutes, seconds]) => minutes
            .checked_mul(SECONDS_IN_MINUTE)
            .and_then(|m| m.checked_add(seconds)),
        _ => None,
    };

    total.unwrap_or_default()
}

/// Formats seconds as `h:mm:ss`, or `m:ss` when shorter than an hour.
pub fn format_length_text(total_seconds: u32) -> String {
    let hours = total_seconds / SECONDS_IN_HOUR;
    let minutes = (total_seconds % SECONDS_IN_HOUR) / SECONDS_IN_MINUTE;
    let seconds = total_seconds % SECONDS_IN_MINUTE;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

//! Normalization steps applied to values before they are compared.

use std::cmp::Ordering;

use chrono::NaiveTime;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Clock formats accepted for a time of day: `14:30`, `9:05`, `02:00 PM`.
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%I:%M %p"];

/// Case folding shared by search and equality matching.
pub fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// Primary collation key: accents stripped, case folded. `"Émile"` -> `"emile"`.
pub fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Orders strings the way a user expects a name column to read.
///
/// Base letters decide first, then case-folded text with accents, then raw
/// text, so the order stays total.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| fold(a).cmp(&fold(b)))
        .then_with(|| a.cmp(b))
}

/// Extracts the integer a display string starts with, e.g. `"15 years"` -> `15`.
///
/// Leading whitespace and a single sign are accepted. Returns `None` when no
/// digit follows, or when the digits overflow an `i64`.
pub fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses a 24-hour (`14:30`, `9:00`) or 12-hour (`02:00 PM`) time of day.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

use chrono::{DateTime, FixedOffset};

/// Replaces every run of whitespace with `separator` and trims both ends
pub fn collapse_whitespace(value: &str, separator: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(separator)
}

/// `dd/mm/yyyy`, the way en-IN prints a date
pub fn format_date_en_in(time: &DateTime<FixedOffset>) -> String {
    time.format("%d/%m/%Y").to_string()
}

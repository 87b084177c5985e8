//! Local date and time display strings.

/// `2024-06-24`
#[must_use]
pub fn format_date(year: u32, month: u32, day: u32) -> String {
	format!("{}-{:02}-{:02}", year, month, day)
}

/// `10:28:12`, though single-digit fields are not padded.
#[must_use]
pub fn format_time(hours: u32, minutes: u32, seconds: u32) -> String {
	format!("{}:{}:{}", hours, minutes, seconds)
}

/// `2024-6-24 10:28:12`, unpadded.
#[must_use]
pub fn format_datetime(year: u32, month: u32, day: u32, hours: u32, minutes: u32, seconds: u32) -> String {
	format!("{}-{}-{} {}", year, month, day, format_time(hours, minutes, seconds))
}

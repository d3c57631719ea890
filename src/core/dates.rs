//! Calendar date handling for close-approach timestamps.
//!
//! Close-approach logs use a calendar style with abbreviated month names
//! (`2025-Jan-01 06:00`). Output uses a zero-padded numeric form
//! (`2025-01-01 06:00`). Both are minute precision with no timezone.

use chrono::NaiveDateTime;

/// Input pattern of close-approach calendar dates.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Canonical output pattern used by the JSON writer.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a calendar date such as `2025-Jan-01 06:00`.
///
/// Returns `None` when the text does not match [`CALENDAR_DATE_FORMAT`]
/// or names an impossible date.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), CALENDAR_DATE_FORMAT).ok()
}

/// Render a timestamp as `YYYY-MM-DD HH:MM`.
pub fn datetime_to_str(time: &NaiveDateTime) -> String {
    time.format(CANONICAL_DATE_FORMAT).to_string()
}

//! Turkish date labels for the results page.

use chrono::{Datelike, NaiveDate};

const TURKISH_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim", "Kasım",
    "Aralık",
];

fn month_name(date: NaiveDate) -> &'static str {
    TURKISH_MONTHS[date.month0() as usize]
}

/// `29 Ocak 2026`
pub fn format_date_turkish(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date), date.year())
}

/// Formats a date range as compactly as the two dates allow.
///
/// - same month: `23 - 30 Ocak 2026`
/// - same year: `23 Ocak - 28 Şubat 2026`
/// - otherwise: `23 Aralık 2025 - 5 Ocak 2026`
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    if start.year() == end.year() && start.month() == end.month() {
        format!("{} - {} {} {}", start.day(), end.day(), month_name(end), end.year())
    } else if start.year() == end.year() {
        format!(
            "{} {} - {} {} {}",
            start.day(),
            month_name(start),
            end.day(),
            month_name(end),
            end.year()
        )
    } else {
        format!("{} - {}", format_date_turkish(start), format_date_turkish(end))
    }
}

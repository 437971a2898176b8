//! Normalization helpers shared by every source variant.

use crate::error::CoreError;
use crate::structs::Instrument;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Trims whitespace from an instrument code.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parses a numeric cell into a `Decimal`.
///
/// Accepts plain (`2.50`) and scientific (`2.5e0`) notation.
pub fn parse_decimal(raw: &str) -> Result<Decimal, CoreError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| CoreError::InvalidInput(raw.to_string(), e.to_string()))
}

/// Parses a strike price, coercing anything unparseable to a missing value.
pub fn parse_strike(raw: Option<&str>) -> Option<Decimal> {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| parse_decimal(s).ok())
}

/// Parses the calendar date at the start of a cell.
///
/// Accepts `YYYY-MM-DD` optionally followed by a time part separated by `T` or
/// a space (`2026-03-01 00:00:00`). The time part itself is ignored.
pub fn parse_date_prefix(raw: &str) -> Result<NaiveDate, CoreError> {
    let raw = raw.trim();
    let invalid = || CoreError::InvalidInput(raw.to_string(), "expected a YYYY-MM-DD date".to_string());

    let (date_part, rest) = raw.split_at_checked(10).ok_or_else(invalid)?;
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())
}

/// The "active instrument" rule: expiry strictly after the evaluation end date,
/// and at or after the minimum expiry when one is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveFilter {
    pub end_date: NaiveDate,
    pub min_expiry: Option<NaiveDate>,
}

impl ActiveFilter {
    pub fn new(end_date: NaiveDate, min_expiry: Option<NaiveDate>) -> Self {
        Self { end_date, min_expiry }
    }

    pub fn is_active(&self, expiry: NaiveDate) -> bool {
        expiry > self.end_date && self.min_expiry.is_none_or(|min| expiry >= min)
    }

    /// Drops every instrument that is not active.
    pub fn retain(&self, instruments: &mut Vec<Instrument>) {
        instruments.retain(|i| self.is_active(i.expiry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn strike_coerces_invalid_to_none() {
        assert_eq!(parse_strike(Some("10.5")), Some(dec!(10.5)));
        assert_eq!(parse_strike(Some(" 7 ")), Some(dec!(7)));
        assert_eq!(parse_strike(Some("n/a")), None);
        assert_eq!(parse_strike(Some("")), None);
        assert_eq!(parse_strike(None), None);
    }

    #[test]
    fn decimal_accepts_scientific_notation() {
        assert_eq!(parse_decimal("2.5e0").unwrap(), dec!(2.5));
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn date_prefix_ignores_time_part() {
        assert_eq!(parse_date_prefix("2026-03-01").unwrap(), date("2026-03-01"));
        assert_eq!(parse_date_prefix("2026-03-01 00:00:00").unwrap(), date("2026-03-01"));
        assert_eq!(parse_date_prefix("2026-03-01T12:30:00").unwrap(), date("2026-03-01"));
        assert!(parse_date_prefix("01/03/2026").is_err());
        assert!(parse_date_prefix("2026-03-01x").is_err());
        assert!(parse_date_prefix("").is_err());
    }

    #[test]
    fn active_filter_requires_expiry_after_end_date() {
        let filter = ActiveFilter::new(date("2026-01-08"), None);
        assert!(!filter.is_active(date("2026-01-08")));
        assert!(filter.is_active(date("2026-01-09")));
        assert!(!filter.is_active(date("2025-12-31")));
    }

    #[test]
    fn active_filter_applies_min_expiry_inclusively() {
        let filter = ActiveFilter::new(date("2026-01-08"), Some(date("2026-03-01")));
        assert!(!filter.is_active(date("2026-02-28")));
        assert!(filter.is_active(date("2026-03-01")));
        assert!(filter.is_active(date("2026-06-30")));
    }
}

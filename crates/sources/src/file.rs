//! Delimited-file variant of the instrument and price sources.
//!
//! Both loaders validate their header first and report every missing required
//! column at once. After that, a row either parses completely or the whole load
//! fails; callers never see a half-normalized table.

use crate::error::SourceError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use core_types::{
    ActiveFilter, Instrument, OptionType, PricePair, PricePairs, normalize_code, parse_date_prefix,
    parse_decimal, parse_strike, resolve_issuer_name,
};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

const INSTRUMENT_FILE: &str = "instrument";
const PRICE_FILE: &str = "price";

const INSTRUMENT_COLUMNS: [&str; 5] = ["code", "underlying", "option_type", "strike_price", "expiry"];

/// Column names accepted for the observation timestamp, in order of preference.
const DATE_COLUMNS: [&str; 2] = ["date", "bucket"];

/// The raw contents of the two user-supplied files.
#[derive(Debug, Clone)]
pub struct FileSource {
    instruments: Vec<u8>,
    prices: Vec<u8>,
}

impl FileSource {
    pub fn from_bytes(instruments: Vec<u8>, prices: Vec<u8>) -> Self {
        Self { instruments, prices }
    }

    /// Reads both files into memory.
    pub async fn from_paths(instruments: &Path, prices: &Path) -> Result<Self, SourceError> {
        let instruments = tokio::fs::read(instruments).await?;
        let prices = tokio::fs::read(prices).await?;
        Ok(Self::from_bytes(instruments, prices))
    }

    pub fn load_instruments(&self, filter: &ActiveFilter) -> Result<Vec<Instrument>, SourceError> {
        load_instruments(self.instruments.as_slice(), filter)
    }

    pub fn load_prices(
        &self,
        codes: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        zone: FixedOffset,
    ) -> Result<PricePairs, SourceError> {
        load_prices(self.prices.as_slice(), codes, start_date, end_date, zone)
    }
}

/// Parses an instrument file and keeps the instruments that pass `filter`.
pub fn load_instruments<R: Read>(
    reader: R,
    filter: &ActiveFilter,
) -> Result<Vec<Instrument>, SourceError> {
    let mut reader = csv_reader(reader)?;
    let headers = build_header_map(reader.headers()?);

    let missing: Vec<String> = INSTRUMENT_COLUMNS
        .iter()
        .filter(|column| !headers.contains_key(**column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SourceError::MissingColumns {
            file: INSTRUMENT_FILE,
            columns: missing,
        });
    }

    let column = |name: &str| headers.get(name).copied();
    let code_idx = headers["code"];
    let underlying_idx = headers["underlying"];
    let option_type_idx = headers["option_type"];
    let strike_idx = headers["strike_price"];
    let expiry_idx = headers["expiry"];
    let issuer_id_idx = column("issuer_id");
    let issuer_name_idx = column("issuer_name");

    let mut instruments = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = line_of(&record);

        let code = normalize_code(cell(&record, Some(code_idx)).unwrap_or_default());
        if code.is_empty() {
            continue;
        }

        let raw_expiry = cell(&record, Some(expiry_idx)).unwrap_or_default();
        let expiry = parse_date_prefix(raw_expiry).map_err(|_| SourceError::InvalidValue {
            file: INSTRUMENT_FILE,
            line,
            column: "expiry",
            value: raw_expiry.to_string(),
        })?;

        let issuer_id = non_empty(&record, issuer_id_idx);
        let issuer_name = non_empty(&record, issuer_name_idx)
            .or_else(|| issuer_id.as_deref().map(resolve_issuer_name));

        instruments.push(Instrument {
            code,
            underlying: non_empty(&record, Some(underlying_idx)),
            option_type: OptionType::normalize(cell(&record, Some(option_type_idx))),
            strike_price: parse_strike(cell(&record, Some(strike_idx))),
            issuer_id,
            issuer_name,
            expiry,
        });
    }

    let parsed = instruments.len();
    filter.retain(&mut instruments);
    tracing::debug!(parsed, active = instruments.len(), "Instrument file loaded.");

    Ok(instruments)
}

/// Parses a price file and pairs the start/end closes of the requested codes.
///
/// Timestamps are moved into `zone` before their calendar date is taken. When a
/// code has several observations on one day, the latest instant wins; on equal
/// instants the later row wins. Codes lacking either date are dropped.
pub fn load_prices<R: Read>(
    reader: R,
    codes: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    zone: FixedOffset,
) -> Result<PricePairs, SourceError> {
    let mut reader = csv_reader(reader)?;
    let headers = build_header_map(reader.headers()?);

    let date_idx = DATE_COLUMNS.iter().find_map(|name| headers.get(*name).copied());
    let mut missing = Vec::new();
    if !headers.contains_key("code") {
        missing.push("code".to_string());
    }
    if date_idx.is_none() {
        missing.push("date (or bucket)".to_string());
    }
    if !headers.contains_key("close") {
        missing.push("close".to_string());
    }
    let (Some(date_idx), true) = (date_idx, missing.is_empty()) else {
        return Err(SourceError::MissingColumns {
            file: PRICE_FILE,
            columns: missing,
        });
    };
    let code_idx = headers["code"];
    let close_idx = headers["close"];

    let requested: BTreeSet<&str> = codes.iter().map(|c| c.trim()).collect();
    let mut latest: BTreeMap<(String, NaiveDate), (DateTime<FixedOffset>, Decimal)> = BTreeMap::new();

    for record in reader.records() {
        let record = record?;
        let line = line_of(&record);

        let code = normalize_code(cell(&record, Some(code_idx)).unwrap_or_default());
        if code.is_empty() {
            continue;
        }

        let raw_date = cell(&record, Some(date_idx)).unwrap_or_default();
        let observed_at = parse_observation_time(raw_date, zone).ok_or_else(|| SourceError::InvalidValue {
            file: PRICE_FILE,
            line,
            column: "date",
            value: raw_date.to_string(),
        })?;

        let raw_close = cell(&record, Some(close_idx)).unwrap_or_default();
        let close = parse_decimal(raw_close).map_err(|_| SourceError::InvalidValue {
            file: PRICE_FILE,
            line,
            column: "close",
            value: raw_close.to_string(),
        })?;

        let date = observed_at.date_naive();
        if !requested.contains(code.as_str()) || (date != start_date && date != end_date) {
            continue;
        }

        latest
            .entry((code, date))
            .and_modify(|current| {
                if observed_at >= current.0 {
                    *current = (observed_at, close);
                }
            })
            .or_insert((observed_at, close));
    }

    let pairs = requested
        .iter()
        .filter_map(|code| {
            let (_, start_price) = latest.get(&(code.to_string(), start_date))?;
            let (_, end_price) = latest.get(&(code.to_string(), end_date))?;
            Some(PricePair {
                code: code.to_string(),
                start_price: *start_price,
                start_date,
                end_price: *end_price,
                end_date,
            })
        })
        .collect();

    Ok(PricePairs {
        pairs,
        requested: requested.len(),
    })
}

/// Parses an observation timestamp and expresses it in `zone`.
///
/// Values with an explicit offset are converted; naive date-times and bare dates
/// are taken to already be wall-clock time in `zone`.
pub fn parse_observation_time(raw: &str, zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&zone));
    }
    if let Some(instant) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(instant.with_timezone(&zone));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    zone.from_local_datetime(&naive).single()
}

fn csv_reader<R: Read>(mut reader: R) -> Result<csv::Reader<std::io::Cursor<Vec<u8>>>, SourceError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let delimiter = detect_delimiter(&bytes);

    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::Cursor::new(bytes)))
}

/// Picks `,`, `;` or tab, whichever occurs most often on the header line.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|d| (header.iter().filter(|b| *b == d).count(), *d == b','))
        .unwrap_or(b',')
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
}

fn non_empty(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    cell(record, idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn istanbul() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    fn any_active() -> ActiveFilter {
        ActiveFilter::new(date("2026-01-08"), None)
    }

    #[test]
    fn instrument_file_reports_every_missing_column() {
        let csv = "code,underlying,option_type\nW1,XYZ,call\n";

        let err = load_instruments(csv.as_bytes(), &any_active()).unwrap_err();
        match &err {
            SourceError::MissingColumns { columns, .. } => {
                assert_eq!(columns, &["strike_price", "expiry"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("strike_price"));
        assert!(message.contains("expiry"));
    }

    #[test]
    fn instrument_file_normalizes_rows() {
        let csv = "\u{feff}Code,Underlying,Option_Type,Strike_Price,Expiry,Issuer_Id\n\
                   \x20W1 ,XYZ,Call,10.5,2026-03-01,GRM\n\
                   W2,,weird,n/a,2026-03-01 00:00:00,ZZZ\n";

        let instruments = load_instruments(csv.as_bytes(), &any_active()).unwrap();
        assert_eq!(instruments.len(), 2);

        let w1 = &instruments[0];
        assert_eq!(w1.code, "W1");
        assert_eq!(w1.option_type, OptionType::Call);
        assert_eq!(w1.strike_price, Some(dec!(10.5)));
        assert_eq!(w1.issuer_name.as_deref(), Some("Garanti BBVA Yatırım"));
        assert_eq!(w1.expiry, date("2026-03-01"));

        let w2 = &instruments[1];
        assert_eq!(w2.underlying, None);
        assert_eq!(w2.option_type, OptionType::Unknown);
        assert_eq!(w2.strike_price, None);
        assert_eq!(w2.issuer_name.as_deref(), Some("ZZZ"));
    }

    #[test]
    fn header_names_drop_the_bom_before_trimming() {
        assert_eq!(normalize_header_name("\u{feff} Code "), "code");
        assert_eq!(normalize_header_name("\u{feff}code"), "code");
        assert_eq!(normalize_header_name(" Expiry\t"), "expiry");
    }

    #[test]
    fn issuer_name_column_wins_over_mapping() {
        let csv = "code,underlying,option_type,strike_price,expiry,issuer_id,issuer_name\n\
                   W1,XYZ,put,1,2026-03-01,GRM,Custom Name\n";

        let instruments = load_instruments(csv.as_bytes(), &any_active()).unwrap();
        assert_eq!(instruments[0].issuer_name.as_deref(), Some("Custom Name"));
        assert_eq!(instruments[0].option_type, OptionType::Put);
    }

    #[test]
    fn instrument_file_applies_active_filter() {
        let csv = "code,underlying,option_type,strike_price,expiry\n\
                   EXPIRED,XYZ,call,1,2026-01-08\n\
                   EARLY,XYZ,call,1,2026-02-01\n\
                   LATE,XYZ,call,1,2026-03-01\n";
        let filter = ActiveFilter::new(date("2026-01-08"), Some(date("2026-03-01")));

        let instruments = load_instruments(csv.as_bytes(), &filter).unwrap();
        let kept: Vec<_> = instruments.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(kept, ["LATE"]);
    }

    #[test]
    fn invalid_expiry_fails_the_load() {
        let csv = "code,underlying,option_type,strike_price,expiry\nW1,XYZ,call,1,soon\n";

        let err = load_instruments(csv.as_bytes(), &any_active()).unwrap_err();
        assert!(matches!(err, SourceError::InvalidValue { column: "expiry", line: 2, .. }));
    }

    #[test]
    fn semicolon_delimited_files_are_accepted() {
        let csv = "code;underlying;option_type;strike_price;expiry\nW1;XYZ;call;10,5;2026-03-01\n";

        let instruments = load_instruments(csv.as_bytes(), &any_active()).unwrap();
        assert_eq!(instruments[0].code, "W1");
        // A decimal comma is not a number; the strike is coerced to missing.
        assert_eq!(instruments[0].strike_price, None);
    }

    #[test]
    fn price_file_reports_every_missing_column() {
        let csv = "code,price\nW1,2.0\n";

        let err = load_prices(csv.as_bytes(), &codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), istanbul())
            .unwrap_err();
        match err {
            SourceError::MissingColumns { columns, .. } => {
                assert_eq!(columns, ["date (or bucket)", "close"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn price_file_pairs_start_and_end_closes() {
        let csv = "code,date,close\n\
                   W1,2026-01-01,2.00\n\
                   W1,2026-01-08,2.50\n\
                   W2,2026-01-01,1.00\n\
                   W3,2026-01-01,1.00\n\
                   W3,2026-01-08,1.10\n";

        let prices = load_prices(
            csv.as_bytes(),
            &codes(&["W1", "W2"]),
            date("2026-01-01"),
            date("2026-01-08"),
            istanbul(),
        )
        .unwrap();

        assert_eq!(prices.requested, 2);
        assert_eq!(prices.pairs.len(), 1);
        let pair = &prices.pairs[0];
        assert_eq!(pair.code, "W1");
        assert_eq!(pair.start_price, dec!(2.00));
        assert_eq!(pair.end_price, dec!(2.50));
        assert_eq!(pair.start_date, date("2026-01-01"));
        assert_eq!(pair.end_date, date("2026-01-08"));
    }

    #[test]
    fn bucket_is_accepted_as_date_column() {
        let csv = "code,bucket,close\nW1,2026-01-01,2\nW1,2026-01-08,3\n";

        let prices = load_prices(csv.as_bytes(), &codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), istanbul())
            .unwrap();
        assert_eq!(prices.pairs.len(), 1);
    }

    #[test]
    fn timestamps_are_dated_in_the_reference_zone() {
        // 22:00 UTC on Dec 31 is already Jan 1 in Istanbul.
        let csv = "code,date,close\n\
                   W1,2025-12-31T22:00:00Z,2\n\
                   W1,2026-01-08 00:00:00+03,3\n";

        let prices = load_prices(csv.as_bytes(), &codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), istanbul())
            .unwrap();
        assert_eq!(prices.pairs.len(), 1);

        let utc = FixedOffset::east_opt(0).unwrap();
        let prices = load_prices(csv.as_bytes(), &codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), utc)
            .unwrap();
        assert!(prices.is_empty());
    }

    #[test]
    fn latest_duplicate_observation_wins() {
        let csv = "code,date,close\n\
                   W1,2026-01-01 18:00:00+03:00,2.20\n\
                   W1,2026-01-01 10:00:00+03:00,1.90\n\
                   W1,2026-01-08,3.00\n\
                   W1,2026-01-08,4.00\n";

        let prices = load_prices(csv.as_bytes(), &codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), istanbul())
            .unwrap();
        let pair = &prices.pairs[0];
        assert_eq!(pair.start_price, dec!(2.20));
        assert_eq!(pair.end_price, dec!(4.00));
    }

    #[test]
    fn invalid_close_fails_the_load() {
        let csv = "code,date,close\nW1,2026-01-01,abc\n";

        let err = load_prices(csv.as_bytes(), &codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), istanbul())
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidValue { column: "close", .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn observation_time_formats() {
        let zone = istanbul();
        let parsed = |raw: &str| parse_observation_time(raw, zone).map(|t| t.naive_local());
        let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();

        assert_eq!(parsed("2026-01-01"), Some(at("2026-01-01 00:00:00")));
        assert_eq!(parsed("2026-01-01 09:30:00"), Some(at("2026-01-01 09:30:00")));
        assert_eq!(parsed("2026-01-01T06:30:00+00:00"), Some(at("2026-01-01 09:30:00")));
        assert_eq!(parsed("2026-01-01 06:30:00.250+00"), parsed("2026-01-01T06:30:00.250Z"));
        assert_eq!(parsed("yesterday"), None);
    }

    #[tokio::test]
    async fn file_source_reads_from_paths() {
        let dir = tempfile::tempdir().unwrap();
        let instruments = dir.path().join("warrants.csv");
        let prices = dir.path().join("prices.csv");
        std::fs::write(&instruments, "code,underlying,option_type,strike_price,expiry\nW1,XYZ,call,1,2026-03-01\n").unwrap();
        std::fs::write(&prices, "code,date,close\nW1,2026-01-01,1\nW1,2026-01-08,2\n").unwrap();

        let source = FileSource::from_paths(&instruments, &prices).await.unwrap();
        let loaded = source.load_instruments(&any_active()).unwrap();
        let pairs = source
            .load_prices(&codes(&["W1"]), date("2026-01-01"), date("2026-01-08"), istanbul())
            .unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(pairs.len(), 1);
    }
}

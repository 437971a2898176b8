use crate::enums::OptionType;
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized warrant, as produced by every instrument source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Trimmed instrument code. The join key for prices.
    pub code: String,
    pub underlying: Option<String>,
    pub option_type: OptionType,
    /// `None` when the source value was missing or not numeric.
    pub strike_price: Option<Decimal>,
    pub issuer_id: Option<String>,
    pub issuer_name: Option<String>,
    pub expiry: NaiveDate,
}

/// The start/end closing prices of a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    pub code: String,
    pub start_price: Decimal,
    pub start_date: NaiveDate,
    pub end_price: Decimal,
    pub end_date: NaiveDate,
}

/// The result of a price fetch: only codes observed on both dates, plus the
/// number of codes that were asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricePairs {
    pub pairs: Vec<PricePair>,
    pub requested: usize,
}

impl PricePairs {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// An instrument joined with its price pair and the computed return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub instrument: Instrument,
    pub start_price: Decimal,
    pub start_date: NaiveDate,
    pub end_price: Decimal,
    pub end_date: NaiveDate,
    /// `(end_price - start_price) / start_price * 100`
    pub return_pct: Decimal,
}

impl ReturnRecord {
    /// Joins an instrument with its prices and computes the percentage return.
    ///
    /// Fails when `start_price` is zero or negative, or when the return does not
    /// fit in a `Decimal`.
    pub fn new(instrument: Instrument, prices: &PricePair) -> Result<Self, CoreError> {
        if prices.start_price <= Decimal::ZERO {
            return Err(CoreError::NonPositiveStartPrice {
                code: instrument.code,
                price: prices.start_price,
            });
        }

        let change = prices.end_price - prices.start_price;
        let return_pct = change
            .checked_div(prices.start_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                CoreError::Calculation(format!("return overflow for {}", instrument.code))
            })?;

        Ok(Self {
            instrument,
            start_price: prices.start_price,
            start_date: prices.start_date,
            end_price: prices.end_price,
            end_date: prices.end_date,
            return_pct,
        })
    }

    pub fn code(&self) -> &str {
        &self.instrument.code
    }
}

/// The flat record shape shared by file exports and the web response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub code: String,
    pub underlying: Option<String>,
    pub option_type: OptionType,
    pub issuer_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub strike_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub return_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub start_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub end_price: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub expiry: NaiveDate,
}

impl From<&ReturnRecord> for OutputRecord {
    fn from(record: &ReturnRecord) -> Self {
        let instrument = &record.instrument;
        Self {
            code: instrument.code.clone(),
            underlying: instrument.underlying.clone(),
            option_type: instrument.option_type,
            issuer_name: instrument.issuer_name.clone(),
            strike_price: instrument.strike_price,
            return_pct: record.return_pct,
            start_price: record.start_price,
            end_price: record.end_price,
            start_date: record.start_date,
            end_date: record.end_date,
            expiry: instrument.expiry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn instrument(code: &str) -> Instrument {
        Instrument {
            code: code.to_string(),
            underlying: Some("XYZ".to_string()),
            option_type: OptionType::Call,
            strike_price: Some(dec!(10.5)),
            issuer_id: None,
            issuer_name: None,
            expiry: date("2026-03-01"),
        }
    }

    fn pair(code: &str, start: Decimal, end: Decimal) -> PricePair {
        PricePair {
            code: code.to_string(),
            start_price: start,
            start_date: date("2026-01-01"),
            end_price: end,
            end_date: date("2026-01-08"),
        }
    }

    #[test]
    fn computes_percentage_return() {
        let record = ReturnRecord::new(instrument("W1"), &pair("W1", dec!(2.00), dec!(2.50))).unwrap();
        assert_eq!(record.return_pct, dec!(25));

        let record = ReturnRecord::new(instrument("W1"), &pair("W1", dec!(4), dec!(1))).unwrap();
        assert_eq!(record.return_pct, dec!(-75));
    }

    #[test]
    fn rejects_non_positive_start_price() {
        assert!(matches!(
            ReturnRecord::new(instrument("W1"), &pair("W1", dec!(0), dec!(1))),
            Err(CoreError::NonPositiveStartPrice { .. })
        ));
        assert!(matches!(
            ReturnRecord::new(instrument("W1"), &pair("W1", dec!(-1), dec!(1))),
            Err(CoreError::NonPositiveStartPrice { .. })
        ));
    }

    #[test]
    fn overflowing_return_is_a_calculation_error() {
        let result = ReturnRecord::new(instrument("W1"), &pair("W1", Decimal::new(1, 28), dec!(1000)));
        assert!(matches!(result, Err(CoreError::Calculation(_))));
    }

    #[test]
    fn output_record_serializes_numbers_and_iso_dates() {
        let record = ReturnRecord::new(instrument("W1"), &pair("W1", dec!(2.00), dec!(2.50))).unwrap();
        let json = serde_json::to_value(OutputRecord::from(&record)).unwrap();

        assert_eq!(json["code"], "W1");
        assert_eq!(json["option_type"], "A");
        assert_eq!(json["return_pct"], 25.0);
        assert_eq!(json["strike_price"], 10.5);
        assert_eq!(json["start_date"], "2026-01-01");
        assert_eq!(json["expiry"], "2026-03-01");
        assert!(json["issuer_name"].is_null());
    }
}

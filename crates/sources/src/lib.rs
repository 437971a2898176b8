//! # Varant Data Sources
//!
//! Loads the two tables the return analysis needs, the active instruments and
//! the start/end price pairs, from either the relational stores or a pair of
//! user-supplied delimited files. Both variants produce identical, fully
//! normalized shapes so nothing downstream knows where the data came from.
//!
//! ## Public API
//!
//! - `MarketDataSource`: The closed set of source variants, chosen once per request.
//! - `DbSource` / `FileSource`: The two variants.
//! - `SourceError`: The specific error types that can be returned from this crate.

pub mod error;
pub mod file;
pub mod relational;

pub use error::SourceError;
pub use file::FileSource;
pub use relational::DbSource;

use chrono::{FixedOffset, NaiveDate};
use core_types::{ActiveFilter, Instrument, PricePairs};

/// Where a request reads its instruments and prices from.
#[derive(Debug, Clone)]
pub enum MarketDataSource {
    Database(DbSource),
    Files(FileSource),
}

impl MarketDataSource {
    /// Fetches the normalized, active instruments.
    pub async fn fetch_instruments(&self, filter: &ActiveFilter) -> Result<Vec<Instrument>, SourceError> {
        match self {
            MarketDataSource::Database(source) => source.fetch_instruments(filter).await,
            MarketDataSource::Files(source) => source.load_instruments(filter),
        }
    }

    /// Fetches start/end price pairs for `codes`, dated in `zone`.
    pub async fn fetch_prices(
        &self,
        codes: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        zone: FixedOffset,
    ) -> Result<PricePairs, SourceError> {
        match self {
            MarketDataSource::Database(source) => source.fetch_prices(codes, start_date, end_date, zone).await,
            MarketDataSource::Files(source) => source.load_prices(codes, start_date, end_date, zone),
        }
    }

    /// A short, user-facing name of the variant.
    pub fn label(&self) -> &'static str {
        match self {
            MarketDataSource::Database(_) => "Veritabanı",
            MarketDataSource::Files(_) => "CSV",
        }
    }
}

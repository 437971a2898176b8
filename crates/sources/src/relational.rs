//! Relational variant of the instrument and price sources.

use crate::error::SourceError;
use chrono::{FixedOffset, NaiveDate};
use configuration::DatabaseSettings;
use core_types::{
    ActiveFilter, Instrument, OptionType, PricePair, PricePairs, normalize_code, resolve_issuer_name,
};
use database::{DbDerivative, DbRepository, connect};
use std::collections::BTreeSet;
use std::time::Duration;

/// Reads instruments from the catalog database and prices from the tick store.
///
/// Every fetch opens its own connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct DbSource {
    catalog_url: String,
    prices_url: String,
    connect_timeout: Duration,
}

impl DbSource {
    pub fn new(catalog_url: impl Into<String>, prices_url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            prices_url: prices_url.into(),
            connect_timeout,
        }
    }

    /// Builds the source from settings, failing if either DSN is missing.
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self, SourceError> {
        let (catalog_url, prices_url) = settings.urls()?;
        Ok(Self::new(catalog_url, prices_url, settings.connect_timeout()))
    }

    pub async fn fetch_instruments(&self, filter: &ActiveFilter) -> Result<Vec<Instrument>, SourceError> {
        let repo = DbRepository::new(connect(&self.catalog_url, self.connect_timeout).await?);
        let result = repo.get_active_warrants(filter.end_date, filter.min_expiry).await;
        repo.close().await;

        let mut instruments: Vec<Instrument> = result?.into_iter().map(normalize_derivative).collect();
        // The query already filters; this keeps the invariant independent of the SQL.
        filter.retain(&mut instruments);
        Ok(instruments)
    }

    pub async fn fetch_prices(
        &self,
        codes: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        zone: FixedOffset,
    ) -> Result<PricePairs, SourceError> {
        let codes: Vec<String> = codes
            .iter()
            .map(|c| normalize_code(c))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if codes.is_empty() {
            return Ok(PricePairs::default());
        }

        let repo = DbRepository::new(connect(&self.prices_url, self.connect_timeout).await?);
        let result = repo
            .get_price_pairs(&codes, start_date, end_date, zone.local_minus_utc())
            .await;
        repo.close().await;

        let pairs = result?
            .into_iter()
            .map(|row| PricePair {
                code: normalize_code(&row.code),
                start_price: row.start_price,
                start_date: row.start_date,
                end_price: row.end_price,
                end_date: row.end_date,
            })
            .collect();

        Ok(PricePairs {
            pairs,
            requested: codes.len(),
        })
    }
}

/// Turns a catalog row into a normalized instrument.
///
/// The catalog query falls back to the raw issuer code when a brokerage has no
/// title; such codes are resolved through the static issuer table.
fn normalize_derivative(row: DbDerivative) -> Instrument {
    let blank_to_none = |value: Option<String>| {
        value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let issuer_id = blank_to_none(row.issuer_id);
    let issuer_name = blank_to_none(row.issuer_name)
        .or_else(|| issuer_id.clone())
        .map(|name| resolve_issuer_name(&name));

    Instrument {
        code: normalize_code(&row.code),
        underlying: blank_to_none(row.underlying),
        option_type: OptionType::normalize(row.option_type.as_deref()),
        strike_price: row.strike_price,
        issuer_id,
        issuer_name,
        expiry: row.expiry,
    }
}

//! # Varant Return Analyzer
//!
//! Runs one warrant-return analysis: fetch the active instruments, fetch their
//! start/end closes, inner-join the two and rank the result.
//!
//! - `ReturnEngine` is a pure, synchronous calculator over in-memory tables.
//! - `Analyzer` drives a single request against a `MarketDataSource`, bounding
//!   each fetch with a timeout. It holds no state between requests.

use chrono::{FixedOffset, NaiveDate};
use configuration::Settings;
use core_types::ActiveFilter;
use sources::MarketDataSource;
use std::time::Duration;

pub mod engine;
pub mod error;

pub use engine::{JoinStats, ReturnEngine, ReturnSet};
pub use error::AnalyzerError;

/// The parameters of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// When set, only instruments expiring on or after this date are analyzed.
    pub min_expiry: Option<NaiveDate>,
}

impl AnalysisRequest {
    pub fn active_filter(&self) -> ActiveFilter {
        ActiveFilter::new(self.end_date, self.min_expiry)
    }
}

/// What a completed request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// At least one instrument had prices on both dates.
    Completed(ReturnSet),
    /// No price pairs exist for the requested dates. Not an error: callers
    /// show a "no data" message instead.
    NoData {
        instruments: usize,
        codes_requested: usize,
    },
}

/// Drives the fetch → join → rank pipeline for one request.
#[derive(Debug, Clone)]
pub struct Analyzer {
    reference_zone: FixedOffset,
    fetch_timeout: Duration,
}

impl Analyzer {
    pub fn new(reference_zone: FixedOffset, fetch_timeout: Duration) -> Self {
        Self {
            reference_zone,
            fetch_timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AnalyzerError> {
        Ok(Self::new(settings.reference_zone()?, settings.fetch_timeout()))
    }

    /// Runs the analysis for `request` against `source`.
    pub async fn run(
        &self,
        source: &MarketDataSource,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalyzerError> {
        tracing::info!(
            source = source.label(),
            start = %request.start_date,
            end = %request.end_date,
            min_expiry = ?request.min_expiry,
            "Starting warrant return analysis."
        );

        // 1. Instruments
        let instruments = self
            .bounded("instruments", source.fetch_instruments(&request.active_filter()))
            .await??;
        tracing::info!(count = instruments.len(), "Active warrants loaded.");

        // 2. Prices
        let codes: Vec<String> = instruments.iter().map(|i| i.code.clone()).collect();
        let prices = self
            .bounded(
                "prices",
                source.fetch_prices(&codes, request.start_date, request.end_date, self.reference_zone),
            )
            .await??;
        tracing::info!(count = prices.len(), requested = prices.requested, "Price pairs loaded.");

        if prices.is_empty() {
            return Ok(AnalysisOutcome::NoData {
                instruments: instruments.len(),
                codes_requested: prices.requested,
            });
        }

        // 3. Join and rank
        let set = ReturnEngine::new().compute(instruments, &prices);
        let stats = set.stats();
        tracing::info!(
            joined = stats.joined,
            without_prices = stats.without_prices,
            rejected = stats.rejected_start_price,
            "Returns calculated."
        );

        Ok(AnalysisOutcome::Completed(set))
    }

    async fn bounded<F: Future>(&self, stage: &'static str, fetch: F) -> Result<F::Output, AnalyzerError> {
        tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| AnalyzerError::Timeout {
                stage,
                after: self.fetch_timeout,
            })
    }
}

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Data source error: {0}")]
    Source(#[from] sources::SourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Fetching {stage} did not finish within {after:?}")]
    Timeout { stage: &'static str, after: Duration },
}

impl AnalyzerError {
    /// True when the failure was caused by malformed user input.
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalyzerError::Source(e) if e.is_validation())
    }
}

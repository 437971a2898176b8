use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{file} file is missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        file: &'static str,
        columns: Vec<String>,
    },

    #[error("{file} file, line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        file: &'static str,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Failed to parse delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] database::DbError),

    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
}

impl SourceError {
    /// True for errors caused by malformed user input rather than a backend failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SourceError::MissingColumns { .. } | SourceError::InvalidValue { .. } | SourceError::Csv(_)
        )
    }
}

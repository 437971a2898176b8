use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis error: {0}")]
    Analyzer(#[from] analyzer::AnalyzerError),
    #[error("Data source error: {0}")]
    Source(#[from] sources::SourceError),
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
    #[error("Invalid form upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("{0}")]
    BadRequest(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Analyzer(err) if err.is_validation() => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Analyzer(analyzer::AnalyzerError::Timeout { stage, after }) => {
                tracing::error!(stage, ?after, "Fetch timed out.");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    format!("Loading {stage} took longer than {after:?}"),
                )
            }
            AppError::Analyzer(err) => {
                tracing::error!(error = ?err, "Analyzer error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during analysis".to_string(),
                )
            }
            AppError::Source(err) if err.is_validation() => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Source(err) => {
                tracing::error!(error = ?err, "Data source error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while loading data".to_string(),
                )
            }
            AppError::Config(config_err) => {
                tracing::error!(error = ?config_err, "Configuration error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server configuration error occurred".to_string(),
                )
            }
            AppError::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_client_errors() {
        let err = AppError::Source(sources::SourceError::MissingColumns {
            file: "price",
            columns: vec!["close".to_string()],
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::BadRequest("both files are required".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeouts_map_to_gateway_timeout() {
        let err = AppError::Analyzer(analyzer::AnalyzerError::Timeout {
            stage: "prices",
            after: std::time::Duration::from_secs(30),
        });
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }
}

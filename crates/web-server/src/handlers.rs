use crate::dates::format_date_range;
use crate::{AppState, error::AppError};
use analyzer::{AnalysisOutcome, AnalysisRequest, JoinStats};
use axum::{
    Json,
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
};
use chrono::{Days, Local, NaiveDate};
use core_types::OutputRecord;
use serde::Serialize;
use serde_json::json;
use sources::{DbSource, FileSource, MarketDataSource};
use std::sync::Arc;

/// The successful analysis payload rendered by the results page.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub date_range: String,
    pub data_source: &'static str,
    pub total_analyzed: usize,
    pub rising: Vec<OutputRecord>,
    pub falling: Vec<OutputRecord>,
    pub coverage: JoinStats,
}

/// The fields of the analysis form, collected from the multipart body.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub expiry_date: Option<String>,
    pub instruments_csv: Option<Vec<u8>>,
    pub prices_csv: Option<Vec<u8>>,
}

impl AnalyzeForm {
    /// Reads every known field from the upload. File parts without a file name
    /// (the browser's "nothing selected") count as absent.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let has_file = field.file_name().is_some_and(|f| !f.is_empty());
            match name.as_str() {
                "start_date" => form.start_date = Some(field.text().await?),
                "end_date" => form.end_date = Some(field.text().await?),
                "expiry_date" => form.expiry_date = Some(field.text().await?),
                "instruments_csv" if has_file => form.instruments_csv = Some(field.bytes().await?.to_vec()),
                "prices_csv" if has_file => form.prices_csv = Some(field.bytes().await?.to_vec()),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Validates the dates and splits off the uploaded files, if any.
    ///
    /// Either both files are uploaded or neither is.
    pub fn into_request(self) -> Result<(AnalysisRequest, Option<FileSource>), AppError> {
        let start_date = parse_form_date("start_date", self.start_date.as_deref())?
            .ok_or_else(|| AppError::BadRequest("start_date is required".to_string()))?;
        let end_date = parse_form_date("end_date", self.end_date.as_deref())?
            .ok_or_else(|| AppError::BadRequest("end_date is required".to_string()))?;
        let min_expiry = parse_form_date("expiry_date", self.expiry_date.as_deref())?;

        let files = match (self.instruments_csv, self.prices_csv) {
            (Some(instruments), Some(prices)) => Some(FileSource::from_bytes(instruments, prices)),
            (None, None) => None,
            _ => {
                return Err(AppError::BadRequest(
                    "Her iki CSV dosyası da yüklenmelidir veya hiçbiri yüklenmeyin.".to_string(),
                ));
            }
        };

        Ok((
            AnalysisRequest {
                start_date,
                end_date,
                min_expiry,
            },
            files,
        ))
    }
}

fn parse_form_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{field} must be a YYYY-MM-DD date, got '{value}'"))),
    }
}

/// # GET /
/// The date selection form, defaulting to the last seven days.
pub async fn index() -> Html<String> {
    let today = Local::now().date_naive();
    let week_ago = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    Html(crate::page::render_index(week_ago, today))
}

/// # POST /analyze
/// Runs the analysis against the uploaded files, or the databases when no
/// files were uploaded.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = AnalyzeForm::from_multipart(multipart).await?;
    let (request, files) = form.into_request()?;

    let source = match files {
        Some(files) => MarketDataSource::Files(files),
        None => MarketDataSource::Database(DbSource::from_settings(&state.settings.database)?),
    };

    let outcome = state.analyzer.run(&source, &request).await?;
    let set = match outcome {
        AnalysisOutcome::Completed(set) => set,
        AnalysisOutcome::NoData { .. } => {
            let body = json!({
                "error": "Belirtilen tarih aralığında veri bulunamadı!",
                "start_date": request.start_date,
                "end_date": request.end_date,
            });
            return Ok(Json(body).into_response());
        }
    };

    let n = state.settings.ranking_size;
    let to_output = |records: Vec<&core_types::ReturnRecord>| {
        records.into_iter().map(OutputRecord::from).collect::<Vec<_>>()
    };

    let response = AnalyzeResponse {
        date_range: format_date_range(request.start_date, request.end_date),
        data_source: source.label(),
        total_analyzed: set.total(),
        rising: to_output(set.top(n)),
        falling: to_output(set.bottom(n)),
        coverage: *set.stats(),
    };
    Ok(Json(response).into_response())
}

use analyzer::Analyzer;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::Settings;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod dates;
pub mod error;
pub mod handlers;
pub mod page;

/// The shared application state that all handlers can access.
///
/// Read-only: every request opens its own data source connections.
pub struct AppState {
    pub settings: Settings,
    pub analyzer: Analyzer,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let max_upload = state.settings.server.max_upload_bytes;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_upload))
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialised by the caller.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.bind_addr;
    let analyzer = Analyzer::from_settings(&settings)?;
    let app = router(Arc::new(AppState { settings, analyzer }));

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

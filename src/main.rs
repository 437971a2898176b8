use analyzer::{AnalysisOutcome, AnalysisRequest, Analyzer};
use chrono::NaiveDate;
use clap::Parser;
use configuration::{ExportFormat, Settings};
use sources::{DbSource, FileSource, MarketDataSource};
use std::path::PathBuf;

mod export;
mod report;

/// The main entry point for the warrant return analysis CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Load settings (config.toml, .env, environment) and start logging
    let settings = configuration::load_settings()?;
    let _log_guard = configuration::init_tracing(&settings)?;

    run(cli, settings).await
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Ranks active warrants by their price return between two dates.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The start date of the return window (format: YYYY-MM-DD).
    #[arg(long)]
    start_date: NaiveDate,

    /// The end date of the return window (format: YYYY-MM-DD).
    #[arg(long)]
    end_date: NaiveDate,

    /// Only analyze warrants expiring on or after this date (format: YYYY-MM-DD).
    #[arg(long)]
    expiry: Option<NaiveDate>,

    /// Write the results to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file format. Defaults to the configured export format.
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// Only save the top and bottom rankings instead of every warrant.
    #[arg(long)]
    lite: bool,

    /// Read warrants from this CSV file instead of the database.
    #[arg(long, requires = "prices_csv")]
    instruments_csv: Option<PathBuf>,

    /// Read prices from this CSV file instead of the database.
    #[arg(long, requires = "instruments_csv")]
    prices_csv: Option<PathBuf>,
}

// ==============================================================================
// Analysis Command Logic
// ==============================================================================

/// Handles the orchestration of a single analysis run.
async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let request = AnalysisRequest {
        start_date: cli.start_date,
        end_date: cli.end_date,
        min_expiry: cli.expiry,
    };

    println!("Tarih Aralığı: {} - {}", request.start_date, request.end_date);
    if let Some(min_expiry) = request.min_expiry {
        println!("Minimum Expiry: {}", min_expiry);
    }

    // Pick the data source once; nothing downstream branches on it.
    let source = match (&cli.instruments_csv, &cli.prices_csv) {
        (Some(instruments), Some(prices)) => {
            MarketDataSource::Files(FileSource::from_paths(instruments, prices).await?)
        }
        _ => MarketDataSource::Database(DbSource::from_settings(&settings.database)?),
    };
    println!("Veri kaynağı: {}", source.label());

    let analyzer = Analyzer::from_settings(&settings)?;
    let set = match analyzer.run(&source, &request).await? {
        AnalysisOutcome::Completed(set) => set,
        AnalysisOutcome::NoData { instruments, .. } => {
            println!("  {} aktif varant bulundu", instruments);
            println!("\nBelirtilen tarih aralığında fiyat verisi bulunamadı!");
            return Ok(());
        }
    };
    println!("  {}", report::coverage_line(set.stats()));

    let n = settings.ranking_size;
    report::print_ranking(&format!("EN YÜKSEK GETİRİLİ {n} VARANT"), &set.top(n));
    report::print_ranking(&format!("EN DÜŞÜK GETİRİLİ {n} VARANT"), &set.bottom(n));

    if let Some(path) = &cli.output {
        let format = cli.format.unwrap_or(settings.export_format);
        let records = export::select_records(&set, n, cli.lite);

        export::write_records(path, &records, format)?;
        tracing::info!(path = %path.display(), rows = records.len(), ?format, lite = cli.lite, "Results saved.");
        println!(
            "\nSonuçlar kaydedildi ({}{} - {} satır): {}",
            format!("{format:?}").to_uppercase(),
            if cli.lite { " - lite" } else { "" },
            records.len(),
            path.display()
        );
    }

    println!("\nToplam analiz edilen varant: {}", set.total());
    Ok(())
}

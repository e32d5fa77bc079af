use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use seller_intel::config::{AppConfig, JsonFileConfigStore, ScoringConfig};
use seller_intel::error::AppError;
use seller_intel::leads::{
    persist_output, CountySource, CsvCountySource, InMemoryLeadStore, LeadPipeline, RunStatus,
    RunSummary,
};
use seller_intel::telemetry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "TD Seller Intelligence",
    about = "Score county assessor records for propensity to sell and target-customer fit",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scoring pipeline over a county CSV export
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Canonical-column CSV export of raw county records
    #[arg(long)]
    input: PathBuf,
    /// County name recorded on ingested rows lacking one
    #[arg(long, default_value = "franklin")]
    county: String,
    /// Restrict the run to a single ZIP code
    #[arg(long)]
    zip: Option<String>,
    /// JSON object of scoring config overrides
    #[arg(long)]
    config: Option<PathBuf>,
    /// Evaluation date for derived fields (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Directory for scored output files; omitted means summary-only
    #[arg(long)]
    out: Option<PathBuf>,
    /// Compute everything but write no output files
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let app_config = AppConfig::load();
    telemetry::init(&app_config.telemetry)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Score(args) => run_score(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let scoring_config = match &args.config {
        Some(path) => ScoringConfig::load(&JsonFileConfigStore::new(path)),
        None => ScoringConfig::default(),
    };

    let source = CsvCountySource::new(args.county.clone(), &args.input);
    let raw_records = match source.fetch_raw_records(args.zip.as_deref()) {
        Ok(records) => records,
        Err(err) => {
            // Total inability to obtain input is the one fatal case; report
            // it as an error-status run before exiting nonzero.
            let summary = RunSummary {
                status: RunStatus::Error,
                records_processed: 0,
                hot_leads: 0,
                warm_leads: 0,
                neighborhoods: 0,
                duration_seconds: 0.0,
                errors: vec![err.to_string()],
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Err(err.into());
        }
    };

    info!(
        county = %source.county(),
        records = raw_records.len(),
        %today,
        "loaded raw records"
    );

    let pipeline = LeadPipeline::new(scoring_config);
    let output = pipeline.run(raw_records, today);

    // The durable store is the spreadsheet transport living outside this
    // crate; the CLI persists to the in-memory store only to exercise the
    // seam and produce the run-log-adjusted summary. Durable output is the
    // optional --out directory below.
    let store = InMemoryLeadStore::new();
    let summary = persist_output(&output, &store, "score");

    if !args.dry_run {
        if let Some(out_dir) = &args.out {
            write_outputs(out_dir, &output)?;
            info!(out = %out_dir.display(), "wrote scored output files");
        }
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.status == RunStatus::Error {
        std::process::exit(1);
    }
    Ok(())
}

fn write_outputs(out_dir: &Path, output: &seller_intel::leads::PipelineOutput) -> Result<(), AppError> {
    fs::create_dir_all(out_dir)?;

    let files: [(&str, serde_json::Value); 4] = [
        ("master.json", serde_json::to_value(&output.records)?),
        ("hot_leads.json", serde_json::to_value(&output.hot_leads)?),
        ("warm_leads.json", serde_json::to_value(&output.warm_leads)?),
        (
            "neighborhood_stats.json",
            serde_json::to_value(&output.neighborhood_stats)?,
        ),
    ];

    for (name, value) in files {
        fs::write(out_dir.join(name), serde_json::to_string_pretty(&value)?)?;
    }

    Ok(())
}

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use hoopscraper::{
    config::{Config, DataLayout},
    fantasy::FantasyTeamAggregator,
    report, run, PipelineError,
};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fantasy basketball season tables from saved team pages")]
struct Args {
    /// Root holding raw_data/, processed_data/ and html/.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Season to work on, named by the year it ends in.
    #[arg(long, global = true, default_value_t = chrono::Local::now().year())]
    year: i32,

    /// YAML file with league settings, category weights and team overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the season's player table and fantasy team averages.
    Process,
    /// Recompute fantasy team averages from the saved player table.
    FantasyTeams,
    /// Render HTML pages for every processed season.
    WriteHtml,
}

fn run_command(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let root = args
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let layout = DataLayout::new(root);
    info!(root = %layout.root().display(), year = args.year, command = ?args.command, "startup");

    match args.command {
        Command::Process => {
            let report = run::process_season(&config, &layout, args.year)
                .with_context(|| format!("processing season {}", args.year))?;
            info!(
                loaded = report.loaded,
                missing = report.missing.len(),
                cast_failures = report.cast_failures,
                "season done"
            );
            if let Some(err) = report.failure_error(args.year) {
                return Err(err.into());
            }
        }
        Command::FantasyTeams => {
            if FantasyTeamAggregator.run(&layout, args.year)?.is_none() {
                info!(year = args.year, "nothing to aggregate");
            }
        }
        Command::WriteHtml => {
            let written = report::write_html(&layout)?;
            info!(files = written.len(), "html done");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    match run_command(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(PipelineError::exit_code(&err))
        }
    }
}

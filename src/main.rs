use anyhow::{Context, Result};
use argexport::azure::auth;
use argexport::azure::client::ArgClient;
use argexport::config::{ArgApi, RunConfig, MANAGEMENT_SCOPE};
use argexport::{export, run};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::Level;
use url::Url;

/// Export Azure resource configuration change history via Resource Graph
#[derive(Parser, Debug)]
#[command(name = "argexport", version, about, long_about = None)]
struct Args {
    /// JSON file with run parameters
    #[arg(short, long)]
    parameter_file: PathBuf,

    /// Optional log file (appended; stdout otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let tracing_level = level.to_tracing_level();

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_max_level(tracing_level)
            .with_target(false)
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:?}");
            std::process::exit(1);
        }
    };

    let result = tokio::select! {
        result = execute(&args) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, aborting run");
            std::process::exit(130);
        }
    };

    if let Err(err) = result {
        tracing::error!("Execution error: {:?}", err);
        std::process::exit(1);
    }
}

async fn execute(args: &Args) -> Result<()> {
    let config = RunConfig::load(&args.parameter_file)?;
    let api = ArgApi::default();
    let client = ArgClient::new()?;

    let authority = Url::parse(auth::DEFAULT_AUTHORITY).context("Invalid authority URL")?;
    let token = auth::obtain_access_token(
        &authority,
        &config.tenant_name,
        &config.client_id,
        &config.client_secret,
        MANAGEMENT_SCOPE,
    )
    .await?;

    let records = run::run(&config, &api, &client, &token.access_token).await?;

    tracing::info!("Writing {} results to a file...", records.len());
    export::write_records(Path::new(&config.export_filename), &records)?;

    Ok(())
}

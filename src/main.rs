mod cli;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use cli::commands::{self, Command};
use cli::output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use vultr_registry::{describe_error, Client, Config};

/// Manage Vultr container registries
#[derive(Parser, Debug)]
#[command(name = "vcr", version, about, long_about = None)]
struct Args {
    /// API key (defaults to VULTR_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API base URL (defaults to VULTR_API_URL or https://api.vultr.com)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled: cannot open {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG takes precedence over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = tracing_level.as_str().to_ascii_lowercase();
        EnvFilter::new(format!("vultr_registry={level},vcr={level},reqwest={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("vcr started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("vcr").join("vcr.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".vcr").join("vcr.log");
    }
    PathBuf::from("vcr.log")
}

/// Effective configuration (CLI > environment > config file > defaults)
fn load_config(api_key: Option<String>, base_url: Option<String>) -> Result<Config> {
    let mut config = Config::load().with_env()?;

    if let Some(key) = api_key {
        config.api_key = Some(key);
    }
    if let Some(url) = base_url {
        config.base_url = url;
    }

    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let Args {
        api_key,
        base_url,
        output,
        command,
        ..
    } = args;

    // configure edits the file only, so broken settings must not block it
    let command = match command {
        Command::Configure(configure) => return commands::run_configure(configure),
        command => command,
    };

    let config = load_config(api_key, base_url)?;

    if config.api_key.is_none() {
        tracing::warn!("No API key configured; requests will be unauthenticated");
    }

    let client = Client::new(&config)?;
    commands::run(command, &client, output).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Command failed: {:?}", err);
            match err.downcast_ref::<vultr_registry::Error>() {
                Some(api_err) => eprintln!("Error: {}", describe_error(api_err)),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

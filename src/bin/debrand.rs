use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "debrand")]
#[command(about = "Remove the original company's branding from a mirrored site", long_about = None)]
struct Cli {
    #[arg(
        long,
        default_value = "mirror/videa-saversion.webflow.io",
        help = "Root directory of the mirrored site"
    )]
    root: PathBuf,

    #[arg(long, help = "Write changes and rename files (default is dry-run)")]
    apply: bool,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text",
        help = "Output format for the run summary"
    )]
    format: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let report = mirrorkit::debrand::run(&cli.root, cli.apply).unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(2);
    });

    match cli.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Error serializing report: {}", e);
                process::exit(2);
            }
        },
        OutputFormat::Text => println!("{}", report),
    }
}

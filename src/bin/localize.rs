use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use mirrorkit::config::DEFAULT_SITE_HOST;
use mirrorkit::{Localizer, SiteConfig};

#[derive(Parser)]
#[command(name = "localize")]
#[command(about = "Download external assets of a mirrored site and rewrite references to local copies", long_about = None)]
struct Cli {
    #[arg(help = "Root directory of the mirrored site")]
    site_root: PathBuf,

    #[arg(
        long = "site-host",
        default_value = DEFAULT_SITE_HOST,
        help = "Host of the mirrored site; same-host URLs are page links, not assets"
    )]
    site_host: String,

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

    let localizer = Localizer::new(SiteConfig::new(cli.site_host)).unwrap_or_else(|e| {
        log::error!("Error creating localizer: {}", e);
        process::exit(2);
    });

    let report = localizer.run(&cli.site_root).unwrap_or_else(|e| {
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

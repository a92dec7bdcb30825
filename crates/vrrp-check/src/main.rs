//! vrrp-check binary

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use vrrp_check::{ReportFormat, Settings, Verdict, check_file, render};

#[derive(Parser)]
#[command(name = "vrrp-check")]
#[command(about = "Validate a keepalived-style VRRP configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file to check
    config: PathBuf,

    /// Settings file (default: search the standard locations)
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Log level, overrides the settings file (RUST_LOG overrides both)
    #[arg(long)]
    log_level: Option<String>,

    /// Fail on informational diagnostics too
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            // Tracing is not initialized yet
            eprintln!("Settings error: {e}");
            eprintln!("Using default settings");
            Settings::default()
        }),
    };

    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    common::logging::init(level, settings.logging.format)?;

    let build = check_file(&settings, &cli.config)?;
    print!("{}", render(&build, cli.format)?);

    let failed = match Verdict::of(&build) {
        Verdict::Clean => false,
        Verdict::Warnings => cli.strict,
        Verdict::Errors => true,
    };
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

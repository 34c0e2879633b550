//! volgrid - build an implied-volatility surface from a market snapshot.
//!
//! Reads a JSON snapshot (spot price and call chains per expiration),
//! calibrates every eligible quote, interpolates the selected field onto a
//! grid, and writes the result as JSON.
//!
//! ```text
//! volgrid --quotes spy.json --mode diff --as-of 2026-10-15T10:00:00 --output surface.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use volgrid::config::{ConfigOverrides, LogLevel, SurfaceConfig};
use volgrid::provider::StaticProvider;
use volgrid::surface::DisplayMode;
use volgrid::{VolGridError, compute_surface};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    VolGrid(#[from] VolGridError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Implied-volatility surface from listed call options
#[derive(Debug, Parser)]
#[command(name = "volgrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Market snapshot (JSON: spot and call chains per expiration)
    #[arg(short, long)]
    quotes: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Risk-free rate (continuously compounded)
    #[arg(long)]
    rate: Option<f64>,

    /// Continuous dividend yield
    #[arg(long)]
    dividend_yield: Option<f64>,

    /// Field to interpolate: model, reference, or diff
    #[arg(short, long)]
    mode: Option<DisplayMode>,

    /// Evaluation time (YYYY-MM-DDTHH:MM:SS), defaults to now
    #[arg(long)]
    as_of: Option<NaiveDateTime>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Output file, defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            rate: self.rate,
            dividend_yield: self.dividend_yield,
            display_mode: self.mode,
            log_level: self.log_level,
        }
    }
}

fn init_tracing(level: LogLevel) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = SurfaceConfig::load(cli.config.as_deref(), &cli.overrides())?;
    init_tracing(config.log_level);

    let provider = StaticProvider::from_file(&cli.quotes)?;
    let evaluation = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    let output = compute_surface(&provider, &config, evaluation)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "surface written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "volgrid",
            "--quotes",
            "snapshot.json",
            "--rate",
            "0.04",
            "--mode",
            "DIFF",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.rate, Some(0.04));
        assert_eq!(overrides.dividend_yield, None);
        assert_eq!(overrides.display_mode, Some(DisplayMode::VolDiff));
        assert_eq!(overrides.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn flags_win_over_file_and_env() {
        let path = std::env::temp_dir().join(format!("volgrid-cli-{}.toml", std::process::id()));
        std::fs::write(&path, "rate = 0.02\ndisplay_mode = \"reference\"\n").unwrap();
        let cli = Cli::try_parse_from([
            "volgrid",
            "--quotes",
            "snapshot.json",
            "--mode",
            "model",
        ])
        .unwrap();
        let config = SurfaceConfig::load_with(Some(&path), &cli.overrides(), |key| {
            (key == volgrid::config::ENV_RATE).then(|| "0.03".to_string())
        });
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();
        assert_eq!(config.rate, 0.03);
        assert_eq!(config.display_mode, DisplayMode::ModelVol);
    }

    #[test]
    fn quotes_flag_is_required() {
        assert!(Cli::try_parse_from(["volgrid"]).is_err());
    }
}

//! Run configuration.
//!
//! Values are resolved from, lowest to highest priority:
//!
//! 1. built-in defaults
//! 2. a TOML file
//! 3. `VOLGRID_*` environment variables
//! 4. explicit overrides (the command line)

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conventions::EXPIRY_CUTOFF_DAYS;
use crate::error::VolGridError;
use crate::implied::{ImpliedVolSolver, MAX_VOL, MIN_VOL, VolBracket};
use crate::pipeline::QuoteFilterPipeline;
use crate::surface::{DEFAULT_AXIS_RESOLUTION, DisplayMode, SurfaceBuilder};
use crate::validate::validate_finite;

pub const ENV_RATE: &str = "VOLGRID_RATE";
pub const ENV_DIVIDEND_YIELD: &str = "VOLGRID_DIVIDEND_YIELD";
pub const ENV_DISPLAY_MODE: &str = "VOLGRID_DISPLAY_MODE";
pub const ENV_LOG_LEVEL: &str = "VOLGRID_LOG_LEVEL";

/// Log verbosity for the command-line front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = VolGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(VolGridError::Config {
                message: format!(
                    "invalid log level '{s}', must be one of: trace, debug, info, warn, error"
                ),
            }),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = VolGridError;
    fn try_from(s: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        s.parse()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Parameters of one surface computation.
///
/// # Examples
/// ```
/// use volgrid::config::SurfaceConfig;
/// use volgrid::surface::DisplayMode;
///
/// let config = SurfaceConfig::from_toml_str("rate = 0.04\ndisplay_mode = \"diff\"")?;
/// assert_eq!(config.rate, 0.04);
/// assert_eq!(config.dividend_yield, 0.013);
/// assert_eq!(config.display_mode, DisplayMode::VolDiff);
/// # Ok::<(), volgrid::VolGridError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    pub display_mode: DisplayMode,
    /// Samples per grid axis.
    pub axis_resolution: usize,
    /// Calendar days after evaluation inside which expirations are ignored.
    pub expiry_cutoff_days: i64,
    /// Lower end of the implied-volatility search bracket.
    pub min_vol: f64,
    /// Upper end of the implied-volatility search bracket.
    pub max_vol: f64,
    pub log_level: LogLevel,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            rate: 0.015,
            dividend_yield: 0.013,
            display_mode: DisplayMode::ModelVol,
            axis_resolution: DEFAULT_AXIS_RESOLUTION,
            expiry_cutoff_days: EXPIRY_CUTOFF_DAYS,
            min_vol: MIN_VOL,
            max_vol: MAX_VOL,
            log_level: LogLevel::Info,
        }
    }
}

/// Explicit per-run overrides, typically parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub rate: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub display_mode: Option<DisplayMode>,
    pub log_level: Option<LogLevel>,
}

impl SurfaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// [`VolGridError::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        let config: SurfaceConfig = toml::from_str(content).map_err(|e| VolGridError::Config {
            message: format!("failed to parse TOML: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file; keys it omits keep their defaults.
    ///
    /// # Errors
    /// [`VolGridError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| VolGridError::Config {
            message: format!("failed to read config file {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults overlaid with `VOLGRID_*` environment variables.
    pub fn from_env() -> crate::error::Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve file → environment → overrides, then validate.
    pub fn load(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> crate::error::Result<Self> {
        Self::load_with(path, overrides, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with environment lookups routed through `lookup`.
    pub fn load_with<F>(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
        lookup: F,
    ) -> crate::error::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.merge(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Overlay values looked up through `lookup` under the `VOLGRID_*` keys.
    pub fn apply_env<F>(&mut self, lookup: F) -> crate::error::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_RATE) {
            self.rate = parse_env(ENV_RATE, &v)?;
        }
        if let Some(v) = lookup(ENV_DIVIDEND_YIELD) {
            self.dividend_yield = parse_env(ENV_DIVIDEND_YIELD, &v)?;
        }
        if let Some(v) = lookup(ENV_DISPLAY_MODE) {
            self.display_mode = v.parse().map_err(|e| VolGridError::Config {
                message: format!("{ENV_DISPLAY_MODE}: {e}"),
            })?;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v.parse()?;
        }
        Ok(())
    }

    /// Apply explicit overrides (they take precedence over everything else).
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(rate) = overrides.rate {
            self.rate = rate;
        }
        if let Some(q) = overrides.dividend_yield {
            self.dividend_yield = q;
        }
        if let Some(mode) = overrides.display_mode {
            self.display_mode = mode;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    /// # Errors
    /// [`VolGridError::Config`] for a non-finite rate or yield, an axis
    /// resolution below 2, a negative cutoff, or an invalid vol bracket.
    pub fn validate(&self) -> crate::error::Result<()> {
        let as_config = |e: VolGridError| VolGridError::Config {
            message: e.to_string(),
        };
        validate_finite(self.rate, "rate").map_err(as_config)?;
        validate_finite(self.dividend_yield, "dividend_yield").map_err(as_config)?;
        if self.axis_resolution < 2 {
            return Err(VolGridError::Config {
                message: format!(
                    "axis_resolution must be at least 2, got {}",
                    self.axis_resolution
                ),
            });
        }
        if self.expiry_cutoff_days < 0 {
            return Err(VolGridError::Config {
                message: format!(
                    "expiry_cutoff_days must be non-negative, got {}",
                    self.expiry_cutoff_days
                ),
            });
        }
        self.bracket().map_err(as_config)?;
        Ok(())
    }

    /// The configured implied-volatility search bracket.
    pub fn bracket(&self) -> crate::error::Result<VolBracket> {
        VolBracket::new(self.min_vol, self.max_vol)
    }

    /// Quote pipeline configured with this bracket and cutoff.
    pub fn pipeline(&self) -> crate::error::Result<QuoteFilterPipeline> {
        Ok(QuoteFilterPipeline::new()
            .solver(ImpliedVolSolver::with_bracket(self.bracket()?))
            .cutoff_days(self.expiry_cutoff_days))
    }

    /// Empty surface builder at this resolution.
    pub fn surface_builder(&self) -> SurfaceBuilder {
        SurfaceBuilder::new().axis_resolution(self.axis_resolution)
    }
}

fn parse_env(key: &str, value: &str) -> crate::error::Result<f64> {
    value.trim().parse::<f64>().map_err(|_| VolGridError::Config {
        message: format!("{key} must be a number, got '{value}'"),
    })
}

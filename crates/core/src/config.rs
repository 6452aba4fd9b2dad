use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::cache::MemoizedQuoteRuntime;
use crate::cpq::currency::FxTable;
use crate::cpq::{DeterministicQuoteRuntime, QuoteRuntime};

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["staffquote.toml", "config/staffquote.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    /// JSON rate catalog; without one every rate comes from the built-in tables.
    pub catalog_path: Option<PathBuf>,
    pub default_currency: String,
    /// Per-code overrides layered over the fallback FX table.
    pub fx_rates: BTreeMap<String, Decimal>,
    pub memoize: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub default_currency: Option<String>,
    pub memoize: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig {
                catalog_path: None,
                default_currency: "USD".to_string(),
                fx_rates: BTreeMap::new(),
                memoize: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Quote runtime for embedders that keep one alive across evaluations, such as an
    /// interactive editor. With `pricing.memoize` identical inputs reuse the previous result.
    pub fn quote_runtime(&self) -> Box<dyn QuoteRuntime> {
        self.wrap_runtime(DeterministicQuoteRuntime::default())
    }

    pub fn wrap_runtime<R>(&self, runtime: R) -> Box<dyn QuoteRuntime>
    where
        R: QuoteRuntime + 'static,
    {
        if self.pricing.memoize {
            Box::new(MemoizedQuoteRuntime::new(runtime))
        } else {
            Box::new(runtime)
        }
    }

    /// Fallback FX table with the configured overrides applied.
    pub fn fx_table(&self) -> FxTable {
        FxTable::with_overrides(&self.pricing.fx_rates)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            if let Some(catalog_path) = pricing.catalog_path {
                self.pricing.catalog_path = Some(catalog_path);
            }
            if let Some(default_currency) = pricing.default_currency {
                self.pricing.default_currency = default_currency;
            }
            if let Some(fx_rates) = pricing.fx_rates {
                self.pricing.fx_rates.extend(fx_rates);
            }
            if let Some(memoize) = pricing.memoize {
                self.pricing.memoize = memoize;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STAFFQUOTE_CATALOG_PATH") {
            self.pricing.catalog_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("STAFFQUOTE_DEFAULT_CURRENCY") {
            self.pricing.default_currency = value;
        }
        if let Some(value) = read_env("STAFFQUOTE_MEMOIZE") {
            self.pricing.memoize = parse_bool("STAFFQUOTE_MEMOIZE", &value)?;
        }

        let log_level =
            read_env("STAFFQUOTE_LOGGING_LEVEL").or_else(|| read_env("STAFFQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STAFFQUOTE_LOGGING_FORMAT").or_else(|| read_env("STAFFQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.pricing.catalog_path = Some(catalog_path);
        }
        if let Some(default_currency) = overrides.default_currency {
            self.pricing.default_currency = default_currency;
        }
        if let Some(memoize) = overrides.memoize {
            self.pricing.memoize = memoize;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if let Some((code, _)) = pricing.fx_rates.iter().find(|(_, rate)| **rate <= Decimal::ZERO) {
        return Err(ConfigError::Validation(format!(
            "pricing.fx_rates.{code} must be greater than zero"
        )));
    }

    let currency = pricing.default_currency.trim();
    if currency.is_empty() {
        return Err(ConfigError::Validation(
            "pricing.default_currency must not be empty".to_string(),
        ));
    }
    let table = FxTable::with_overrides(&pricing.fx_rates);
    if !table.contains(currency) {
        let known = table.codes().collect::<Vec<_>>().join("|");
        return Err(ConfigError::Validation(format!(
            "pricing.default_currency `{currency}` has no FX rate (expected one of {known}, or add it under [pricing.fx_rates])"
        )));
    }

    if let Some(path) = &pricing.catalog_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "pricing.catalog_path must not be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    catalog_path: Option<PathBuf>,
    default_currency: Option<String>,
    fx_rates: Option<BTreeMap<String, Decimal>>,
    memoize: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use staffquote_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILES};
use staffquote_core::errors::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

/// Human-readable effective config; an invalid config is reported as a JSON failure payload.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &ApplicationError::from(error)),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    let catalog_path = config
        .pricing
        .catalog_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(render_line(
        "pricing.catalog_path",
        &catalog_path,
        source("pricing.catalog_path", &["STAFFQUOTE_CATALOG_PATH"]),
    ));
    lines.push(render_line(
        "pricing.default_currency",
        &config.pricing.default_currency,
        source("pricing.default_currency", &["STAFFQUOTE_DEFAULT_CURRENCY"]),
    ));
    lines.push(render_line(
        "pricing.memoize",
        &config.pricing.memoize.to_string(),
        source("pricing.memoize", &["STAFFQUOTE_MEMOIZE"]),
    ));

    let fx_table = config.fx_table();
    let fx_rates = fx_table
        .codes()
        .map(|code| format!("{code}={}", fx_table.rate(code)))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(render_line("pricing.fx_rates", &fx_rates, source("pricing.fx_rates", &[])));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["STAFFQUOTE_LOGGING_LEVEL", "STAFFQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["STAFFQUOTE_LOGGING_FORMAT", "STAFFQUOTE_LOG_FORMAT"]),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

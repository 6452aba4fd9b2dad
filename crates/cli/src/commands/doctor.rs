use serde::Serialize;
use staffquote_core::config::{AppConfig, LoadOptions};
use staffquote_core::documents::read_catalog;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INPUT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code follows the first failing check: config failures before catalog failures.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = report.exit_code();

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

impl DoctorReport {
    fn exit_code(&self) -> u8 {
        let failed = |name: &str| {
            self.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
        };
        if failed("config_validation") {
            EXIT_CONFIG
        } else if failed("catalog_readability") {
            EXIT_INPUT
        } else {
            0
        }
    }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_fx_table(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog_readability", "fx_table"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // A skipped catalog check (no catalog configured) is not a failure.
    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    let Some(path) = config.pricing.catalog_path.as_deref() else {
        return DoctorCheck {
            name: "catalog_readability",
            status: CheckStatus::Skipped,
            details: "no catalog configured; built-in role and service rates apply".to_string(),
        };
    };

    match read_catalog(path) {
        Ok(catalog) if catalog.is_empty() => DoctorCheck {
            name: "catalog_readability",
            status: CheckStatus::Pass,
            details: format!("`{}` parsed but holds no entries", path.display()),
        },
        Ok(catalog) => DoctorCheck {
            name: "catalog_readability",
            status: CheckStatus::Pass,
            details: format!("`{}` parsed with {} entries", path.display(), catalog.len()),
        },
        Err(error) => DoctorCheck {
            name: "catalog_readability",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_fx_table(config: &AppConfig) -> DoctorCheck {
    let table = config.fx_table();
    let currency = &config.pricing.default_currency;
    let codes = table.codes().collect::<Vec<_>>().join(", ");

    DoctorCheck {
        name: "fx_table",
        status: CheckStatus::Pass,
        details: format!(
            "default currency {currency} at {} per USD; known codes: {codes}",
            table.rate(currency)
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

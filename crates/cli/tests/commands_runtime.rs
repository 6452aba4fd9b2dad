use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use rust_decimal::Decimal;
use serde_json::{json, Value};
use staffquote_cli::commands::quote::QuoteArgs;
use staffquote_cli::commands::{config, doctor, quote, score, snapshot, staff};
use tempfile::TempDir;

const STAFFING_SPEC: &str = r#"{
    "service_type": "staffing",
    "profiles": [{
        "id": "data_engineer-sr-1",
        "role": "Data Engineer",
        "seniority": "Sr",
        "count": 2,
        "unit_price": 6440.77
    }]
}"#;

const PROJECT_SPEC: &str = r#"{
    "service_type": "project",
    "complexity": "high",
    "role_counts": { "data_engineer": 1 },
    "metrics": { "project": { "pipelines": 2 } },
    "commercial_discount": 10
}"#;

const SUSTAIN_SPEC: &str = r#"{
    "service_type": "sustain",
    "tech_stack": ["airflow", "tableau"],
    "metrics": { "sustain": { "pipelines": 12, "dashboards": 3 } },
    "sustain": {
        "criticality": { "frequency": "daily", "has_manual_process": true, "dependencies": "sap" },
        "operations": { "support_window": "24x7", "weekend_usage": true }
    }
}"#;

#[test]
fn quote_prices_staffing_spec_as_json_payload() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", STAFFING_SPEC);

        let result = quote::run(&QuoteArgs { spec, json: true, ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 0, "expected successful quote");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], Value::Null);
        assert_eq!(amount(&payload["data"]["breakdown"]["roles_cost"]), Decimal::new(1_288_154, 2));
        assert_eq!(amount(&payload["data"]["breakdown"]["l2_support_cost"]), Decimal::ZERO);
        assert_eq!(amount(&payload["data"]["breakdown"]["final_total"]), Decimal::new(1_288_154, 2));
        assert_eq!(payload["data"]["historical"], false);
    });
}

#[test]
fn quote_uses_catalog_and_presents_display_currency() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", PROJECT_SPEC);
        let catalog = write_catalog(dir.path(), "catalog.json", 4_000);

        let result = quote::run(&QuoteArgs {
            spec,
            catalog: Some(catalog),
            currency: Some("EUR".to_string()),
            json: true,
            ..QuoteArgs::default()
        });
        assert_eq!(result.exit_code, 0, "expected successful quote");

        let payload = parse_payload(&result.output);
        assert_eq!(amount(&payload["data"]["breakdown"]["final_total"]), Decimal::from(10_890));
        assert_eq!(payload["data"]["presented"]["currency"], "EUR");
        assert_eq!(payload["data"]["presented"]["final_total_display"], "EUR 10,018.80");
    });
}

#[test]
fn quote_human_output_lists_totals() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", STAFFING_SPEC);

        let result = quote::run(&QuoteArgs { spec, ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("quote: staffing engagement (live rates)"));
        assert!(result.output.contains("- final_total = USD 12,881.54"));
    });
}

#[test]
fn snapshot_then_quote_reproduces_issued_price_after_catalog_change() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", PROJECT_SPEC);
        let issued_catalog = write_catalog(dir.path(), "issued.json", 4_000);
        let repriced_catalog = write_catalog(dir.path(), "repriced.json", 9_000);

        let captured = snapshot::run(&spec, Some(&issued_catalog));
        assert_eq!(captured.exit_code, 0, "expected snapshot capture");
        let captured = parse_payload(&captured.output);
        assert!(captured["data"]["snapshot_id"].is_string());
        let snapshot_path = write(
            dir.path(),
            "issued-snapshot.json",
            &captured["data"]["snapshot"].to_string(),
        );

        let reopened = quote::run(&QuoteArgs {
            spec: spec.clone(),
            catalog: Some(repriced_catalog.clone()),
            snapshot: Some(snapshot_path),
            json: true,
            ..QuoteArgs::default()
        });
        let reopened = parse_payload(&reopened.output);
        assert_eq!(reopened["data"]["historical"], true);
        assert_eq!(amount(&reopened["data"]["breakdown"]["final_total"]), Decimal::from(10_890));

        let live = quote::run(&QuoteArgs {
            spec,
            catalog: Some(repriced_catalog),
            json: true,
            ..QuoteArgs::default()
        });
        let live = parse_payload(&live.output);
        assert_ne!(amount(&live["data"]["breakdown"]["final_total"]), Decimal::from(10_890));
    });
}

#[test]
fn quote_reports_missing_spec_as_input_failure() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let result = quote::run(&QuoteArgs {
            spec: dir.path().join("absent.json"),
            json: true,
            ..QuoteArgs::default()
        });
        assert_eq!(result.exit_code, 3, "expected input failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "input_unreadable");
    });
}

#[test]
fn quote_reports_malformed_spec_as_input_failure() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", r#"{"service_type": "consulting"}"#);

        let result = quote::run(&QuoteArgs { spec, json: true, ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "input_invalid");
    });
}

#[test]
fn quote_returns_config_failure_for_unknown_default_currency() {
    with_env(&[("STAFFQUOTE_DEFAULT_CURRENCY", "JPY")], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", STAFFING_SPEC);

        let result = quote::run(&QuoteArgs { spec, json: true, ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn score_reports_tier_for_sustain_spec() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", SUSTAIN_SPEC);

        let result = score::run(&spec);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "score");
        // pipelines 4 + dashboards 2 + manual 5 + daily 4 + one dependency 1 = 16 / 7
        assert_eq!(amount(&payload["data"]["total"]), Decimal::new(229, 2));
        assert_eq!(payload["data"]["tier_label"], "S1/LOW");
    });
}

#[test]
fn staff_suggests_lines_from_tech_stack() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let spec = write(dir.path(), "spec.json", SUSTAIN_SPEC);

        let result = staff::run(&spec);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["created"], 2);
        let profiles = payload["data"]["profiles"].as_array().cloned().unwrap_or_default();
        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().all(|profile| profile["provenance"] == "suggested"));
        assert_eq!(profiles[0]["role"], "Data Engineer");
        assert_eq!(profiles[0]["allocation_percentage"], 50);
    });
}

#[test]
fn config_attributes_env_sources() {
    with_env(&[("STAFFQUOTE_LOG_LEVEL", "debug"), ("STAFFQUOTE_DEFAULT_CURRENCY", "MXN")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);
        let output = result.output;
        assert!(output.contains(
            "- pricing.default_currency = MXN (source: env (STAFFQUOTE_DEFAULT_CURRENCY))"
        ));
        assert!(output.contains("- logging.level = debug (source: env (STAFFQUOTE_LOG_LEVEL))"));
        assert!(output.contains("- pricing.memoize = true (source: default)"));
    });
}

#[test]
fn config_reports_invalid_config_as_failure_payload() {
    with_env(&[("STAFFQUOTE_DEFAULT_CURRENCY", "JPY")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_passes_without_catalog_and_fails_on_broken_catalog() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0);
        let report: Value = serde_json::from_str(&result.output).expect("doctor json");
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(report["checks"][1]["status"], "skipped");
    });

    let dir = TempDir::new().expect("tempdir");
    let broken = write(dir.path(), "catalog.json", "[{oops");
    let broken = broken.to_string_lossy().to_string();
    with_env(&[("STAFFQUOTE_CATALOG_PATH", broken.as_str())], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 3);
        let report: Value = serde_json::from_str(&result.output).expect("doctor json");
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][1]["name"], "catalog_readability");
        assert_eq!(report["checks"][1]["status"], "fail");
    });
}

#[test]
fn doctor_exits_with_config_code_when_config_is_invalid() {
    with_env(&[("STAFFQUOTE_DEFAULT_CURRENCY", "JPY")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] catalog_readability:"));
    });
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("fixture should be writable");
    path
}

fn write_catalog(dir: &Path, name: &str, data_engineer_med: i64) -> PathBuf {
    let catalog = json!([
        { "service_name": "Data Engineer", "level_label": "Med", "base_price": data_engineer_med },
        { "service_name": "Pipe", "level_label": "Alta", "base_price": 2500, "multiplier": 1 }
    ]);
    write(dir, name, &catalog.to_string())
}

fn amount(value: &Value) -> Decimal {
    value.as_str().and_then(|raw| raw.parse().ok()).expect("money is serialized as a decimal string")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be a JSON payload")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STAFFQUOTE_CATALOG_PATH",
        "STAFFQUOTE_DEFAULT_CURRENCY",
        "STAFFQUOTE_MEMOIZE",
        "STAFFQUOTE_LOGGING_LEVEL",
        "STAFFQUOTE_LOGGING_FORMAT",
        "STAFFQUOTE_LOG_LEVEL",
        "STAFFQUOTE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

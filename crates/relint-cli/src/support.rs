use relint_checks::VerificationReport;
use relint_model::{Dataset, TableReadError};
use relint_schema::{EnumRegistry, SchemaConfig};
use serde::Serialize;
use std::fs;

pub fn load_dataset_or_exit(tables: &str) -> (Dataset, Vec<TableReadError>) {
    Dataset::load_dir(tables).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_schema_or_exit(path: &str) -> SchemaConfig {
    SchemaConfig::load(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

/// The enum document is optional; omitting it means no enum checks.
pub fn load_enums_or_exit(path: Option<&str>) -> EnumRegistry {
    match path {
        Some(path) => EnumRegistry::load(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        }),
        None => EnumRegistry::new(),
    }
}

pub fn render_json_or_exit(payload: &impl Serialize) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render payload: {e}");
        std::process::exit(2);
    })
}

/// Print the rendered payload to stdout, or write it to `output`.
pub fn emit_or_exit(rendered: &str, output: Option<&str>) {
    match output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n")).unwrap_or_else(|e| {
                eprintln!("error: failed to write {path}: {e}");
                std::process::exit(2);
            });
        }
        None => println!("{rendered}"),
    }
}

/// Human-readable summary: one header line, one line per failing check.
pub fn print_report_summary(label: &str, report: &VerificationReport) {
    println!(
        "[{label}] {} (tables={}, checks={}, failures={})",
        if report.has_failures() { "FAIL" } else { "OK" },
        report.tables.len(),
        report.check_count(),
        report.failure_count()
    );

    for table in &report.tables {
        for check in &table.checks {
            if check.result.failed() {
                println!(
                    "  - FAIL {} {}{}",
                    table.table,
                    check.check,
                    details_suffix(&check.details)
                );
            }
        }
    }
    for check in &report.relationships {
        if check.result.failed() {
            println!(
                "  - FAIL {} {}{}",
                check.relationship,
                check.check,
                details_suffix(&check.details)
            );
        }
    }

    let summary = &report.generic_fk_summary;
    println!(
        "  generic: {} checks, {} passed, {} failed, {} info",
        summary.total_checks, summary.passes, summary.fails, summary.info_metrics_count
    );
}

fn details_suffix(details: &Option<serde_json::Value>) -> String {
    match details {
        Some(value) => format!(" ({value})"),
        None => String::new(),
    }
}

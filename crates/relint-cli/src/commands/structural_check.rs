use crate::support::{
    load_dataset_or_exit, load_enums_or_exit, print_report_summary, render_json_or_exit,
};
use relint_checks::run_verification;
use relint_schema::SchemaConfig;

pub fn run(tables: String, enums: Option<String>, json: bool) {
    let (dataset, read_errors) = load_dataset_or_exit(&tables);
    let enums = load_enums_or_exit(enums.as_deref());

    // No declarations: only the per-table sections are produced.
    let report = run_verification(&dataset, &read_errors, &SchemaConfig::default(), &enums);

    if json {
        let payload = serde_json::json!({
            "schema": report.schema,
            "snapshotRef": &report.snapshot_ref,
            "tables": &report.tables,
        });
        println!("{}", render_json_or_exit(&payload));
    } else {
        print_report_summary("structural-check", &report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
}

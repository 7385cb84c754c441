use crate::support::{
    load_dataset_or_exit, load_schema_or_exit, print_report_summary, render_json_or_exit,
};
use relint_checks::run_verification;
use relint_schema::EnumRegistry;

pub fn run(tables: String, schema: String, json: bool) {
    let (dataset, read_errors) = load_dataset_or_exit(&tables);
    let mut schema = load_schema_or_exit(&schema);
    schema.foreign_keys.clear();

    let report = run_verification(&dataset, &read_errors, &schema, &EnumRegistry::new());

    if json {
        let payload = serde_json::json!({
            "schema": report.schema,
            "snapshotRef": &report.snapshot_ref,
            "genericRelationships": &report.generic_relationships,
            "genericFkSummary": &report.generic_fk_summary,
        });
        println!("{}", render_json_or_exit(&payload));
    } else {
        print_report_summary("generic-check", &report);
    }

    if report.generic_fk_summary.fails > 0 {
        std::process::exit(1);
    }
}

use crate::support::{
    emit_or_exit, load_dataset_or_exit, load_enums_or_exit, load_schema_or_exit,
    print_report_summary, render_json_or_exit,
};
use relint_checks::run_verification;

pub fn run(
    tables: String,
    schema: String,
    enums: Option<String>,
    output: Option<String>,
    json: bool,
) {
    let (dataset, read_errors) = load_dataset_or_exit(&tables);
    let schema = load_schema_or_exit(&schema);
    let enums = load_enums_or_exit(enums.as_deref());

    let report = run_verification(&dataset, &read_errors, &schema, &enums);

    if json || output.is_some() {
        let rendered = render_json_or_exit(&report);
        emit_or_exit(&rendered, output.as_deref());
    } else {
        print_report_summary("verify", &report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
}

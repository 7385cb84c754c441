use crate::support::{load_dataset_or_exit, render_json_or_exit};
use relint_model::DataStore;
use serde_json::json;

pub fn get(table: String, id: String, tables: String, json_output: bool) {
    let (dataset, _read_errors) = load_dataset_or_exit(&tables);
    let store = DataStore::new(dataset);

    let record = store.get(&table, &id);
    if json_output {
        let payload = json!({
            "action": "record.get",
            "table": table,
            "id": id,
            "found": record.is_some(),
            "record": record,
        });
        println!("{}", render_json_or_exit(&payload));
        return;
    }

    match record {
        Some(record) => println!("{}", render_json_or_exit(record)),
        None => {
            eprintln!("error: record not found: {table}/{id}");
            std::process::exit(1);
        }
    }
}

use log::{info, warn};
use redcap_schema::{DictionaryRow, SchemaRegistry, materialize_batch, migration};
use std::collections::HashMap;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(dictionary_path) = args.next() else {
        eprintln!("usage: redcap-schema <dictionary.json> [records.json] [group_by]");
        return Ok(());
    };

    let start = Instant::now();
    let rows: Vec<DictionaryRow> =
        serde_json::from_str(&std::fs::read_to_string(&dictionary_path)?)?;
    let registry = SchemaRegistry::from_rows(rows)?;
    info!(
        "loaded {} field definitions from {dictionary_path} in {:?}",
        registry.len(),
        start.elapsed()
    );

    if let Some(records_path) = args.next() {
        let raws: Vec<HashMap<String, String>> =
            serde_json::from_str(&std::fs::read_to_string(&records_path)?)?;
        let start = Instant::now();
        let results = materialize_batch(&raws, &registry);
        let ok = results.iter().filter(|r| r.is_ok()).count();
        info!(
            "materialized {ok}/{} records in {:?}",
            results.len(),
            start.elapsed()
        );
        for (i, result) in results.iter().enumerate() {
            if let Err(err) = result {
                warn!("record {i}: {err}");
            }
        }
    }

    let group_by = args.next().unwrap_or_else(|| "form_name".to_string());
    print!("{}", migration::generate(&registry, &group_by, None)?);
    Ok(())
}

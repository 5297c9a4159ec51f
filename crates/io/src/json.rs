// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use facetgrid_engine::{Dataset, Record};
use serde_json::{Map, Value};

use crate::error::IngestError;

/// Records as an array of objects, keys in dataset field order.
/// Absent cells are `null`.
pub fn records_to_value(dataset: &Dataset, records: &[&Record]) -> Value {
    let rows = records
        .iter()
        .map(|record| {
            let object: Map<String, Value> = dataset
                .field_names()
                .map(|field| {
                    let value = match record.value(field) {
                        Some(v) => Value::String(v.to_string()),
                        None => Value::Null,
                    };
                    (field.to_string(), value)
                })
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

pub fn write_records<W: Write>(
    out: W,
    dataset: &Dataset,
    records: &[&Record],
) -> Result<(), IngestError> {
    serde_json::to_writer_pretty(out, &records_to_value(dataset, records))
        .map_err(|e| IngestError::Io(e.to_string()))
}

pub fn export(dataset: &Dataset, records: &[&Record], path: &Path) -> Result<(), IngestError> {
    let file = File::create(path)
        .map_err(|e| IngestError::Io(format!("{}: {e}", path.display())))?;
    write_records(BufWriter::new(file), dataset, records)
}

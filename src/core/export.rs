// FlowTrace - core/export.rs
//
// CSV and JSON export of parsed steps.
// Core layer: writes to any Write trait object.

use crate::core::model::{ContentPayload, Step};
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export the step tree as pretty-printed JSON.
///
/// The serialised shape (per-item `type` tag, `key`/`value`/`values`/
/// `jsonData` fields) matches what flow-log consumers already expect.
pub fn export_json<W: Write>(
    steps: &[Step],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_item_budget(steps)?;
    serde_json::to_writer_pretty(writer, steps).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(steps.iter().map(|s| s.content.len()).sum())
}

/// Export a flattened item table as CSV.
///
/// Writes: step, timestamp, kind, severity, key, value. Lists join their
/// values with `; `, JSON payloads are compact-serialised into the value
/// column, and messages put their text there.
pub fn export_csv<W: Write>(
    steps: &[Step],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_item_budget(steps)?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["step", "timestamp", "kind", "severity", "key", "value"])
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for step in steps {
        let header = step.header.as_deref().unwrap_or("");
        for item in &step.content {
            let (severity, key, value) = match &item.payload {
                ContentPayload::Message { severity, text } => {
                    (severity.label(), String::new(), text.clone())
                }
                ContentPayload::KeyValue { key, value } => ("", key.clone(), value.clone()),
                ContentPayload::List { key, values } => ("", key.clone(), values.join("; ")),
                ContentPayload::Json { key, data } => (
                    "",
                    key.clone(),
                    serde_json::to_string(data).unwrap_or_default(),
                ),
            };

            csv_writer
                .write_record([
                    header,
                    item.timestamp.as_deref().unwrap_or(""),
                    item.payload.kind(),
                    severity,
                    key.as_str(),
                    value.as_str(),
                ])
                .map_err(|e| ExportError::Csv {
                    path: export_path.to_path_buf(),
                    source: e,
                })?;
            count += 1;
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

fn check_item_budget(steps: &[Step]) -> Result<(), ExportError> {
    let count: usize = steps.iter().map(|s| s.content.len()).sum();
    if count > constants::MAX_EXPORT_ITEMS {
        return Err(ExportError::TooManyItems {
            count,
            max: constants::MAX_EXPORT_ITEMS,
        });
    }
    Ok(())
}

//! Synthetic test rows for exercising the pipeline without hardware.

use chrono::{DateTime, FixedOffset};
use rand::Rng;
use serde_json::{json, Value};

use crate::{ArchiveError, DocumentStore};

/// Sensors reporting temperature (°C).
pub const TEMPERATURE_SENSORS: [u32; 3] = [1, 2, 3];

/// Sensors reporting pressure (N).
pub const PRESSURE_SENSORS: [u32; 2] = [4, 5];

/// One reading from every sensor, stamped with `now`'s local date and time.
///
/// Rows are written one per sensor so the dashboard reads them unchanged.
pub fn synthetic_rows<R: Rng>(now: DateTime<FixedOffset>, rng: &mut R) -> Vec<Value> {
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();

    let mut rows = Vec::with_capacity(TEMPERATURE_SENSORS.len() + PRESSURE_SENSORS.len());
    for id in TEMPERATURE_SENSORS {
        rows.push(json!({
            "date": date,
            "time": time,
            "sensor_id": id,
            "temperature": rng.gen_range(20..=30u32),
        }));
    }
    for id in PRESSURE_SENSORS {
        rows.push(json!({
            "date": date,
            "time": time,
            "sensor_id": id,
            "pressure": rng.gen_range(0..=50u32),
        }));
    }
    rows
}

/// Append `rows` to the document at `path` and write it back.
///
/// The document must already exist; blank content counts as an empty list.
/// Returns the number of rows in the document afterwards.
pub async fn append_rows(
    store: &dyn DocumentStore,
    path: &str,
    rows: Vec<Value>,
    message: &str,
) -> Result<usize, ArchiveError> {
    let document = store
        .read(path)
        .await?
        .ok_or_else(|| ArchiveError::NotFound(path.to_string()))?;

    let mut existing = if document.content.trim().is_empty() {
        Vec::new()
    } else {
        match serde_json::from_str(&document.content)? {
            Value::Array(existing) => existing,
            _ => {
                return Err(ArchiveError::Parse(format!(
                    "{} is not a JSON list of rows",
                    path
                )))
            }
        }
    };
    existing.extend(rows);

    let content = serde_json::to_string_pretty(&existing)?;
    store.update(path, &content, &document.sha, message).await?;
    Ok(existing.len())
}

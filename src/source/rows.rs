//! Decoding of schema-less JSON row documents.
//!
//! Feeds arrive as loosely typed rows (spreadsheet exports, device uploads).
//! Two row shapes are understood:
//!
//! - long rows name their sensor, `{"sensor_id": 2, "temperature": 25.5}`
//! - wide rows carry one column per sensor,
//!   `{"date": .., "time": .., "sensor1": 24, .., "sensor5": 31}`
//!
//! Decoding never fails on a bad row: a row without a usable sensor id still
//! becomes an [`Observation`] (without an id) so positions stay aligned with
//! the document, and non-numeric values are simply left out.

use handwatch_types::{metric, Batch, Observation, SensorId};
use serde_json::Value;

use super::FetchError;

/// Keys that may carry the sensor id, in order of preference.
const ID_KEYS: &[&str] = &["sensor_id", "id", "sensor"];

/// Keys that describe the row rather than measure anything.
const METADATA_KEYS: &[&str] = &["date", "time", "timestamp"];

/// Column prefix of wide rows, followed by the sensor id.
const WIDE_PREFIX: &str = "sensor";

/// Wide-row sensors whose column holds pressure; every other column is a
/// temperature.
pub const WIDE_PRESSURE_SENSORS: [u32; 2] = [4, 5];

/// Extract the row array from a document.
///
/// Accepts a top-level array, or an object wrapping one under `rows` or
/// `data`.
pub fn document_rows(document: Value) -> Result<Vec<Value>, FetchError> {
    match document {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => {
            for key in ["rows", "data"] {
                if let Some(Value::Array(rows)) = map.remove(key) {
                    return Ok(rows);
                }
            }
            Err(FetchError::Parse(
                "expected a JSON array of rows (or an object with a \"rows\" array)".to_string(),
            ))
        }
        Value::Null => Ok(Vec::new()),
        other => Err(FetchError::Parse(format!(
            "expected a JSON array of rows, found {}",
            kind(&other)
        ))),
    }
}

/// Decode one row into the observations it carries, all at `position`.
///
/// A long row yields one observation. A wide row yields one per sensor
/// column with a numeric value. A row that is neither yields a single
/// unidentified observation.
pub fn decode_rows(position: u64, row: &Value) -> Vec<Observation> {
    if let Value::Object(fields) = row {
        let has_id = fields
            .keys()
            .any(|key| ID_KEYS.iter().any(|id| key.eq_ignore_ascii_case(id)));
        if !has_id {
            let wide = decode_wide(position, fields);
            if !wide.is_empty() {
                return wide;
            }
        }
    }
    vec![decode_row(position, row)]
}

fn decode_wide(position: u64, fields: &serde_json::Map<String, Value>) -> Vec<Observation> {
    let mut observations: Vec<Observation> = fields
        .iter()
        .filter_map(|(key, value)| {
            let id = wide_column_id(key)?;
            let value = parse_number(value)?;
            let metric = if WIDE_PRESSURE_SENSORS.contains(&id) {
                metric::PRESSURE
            } else {
                metric::TEMPERATURE
            };
            Some(
                Observation::builder(position)
                    .sensor(id)
                    .reading(metric, value)
                    .build(),
            )
        })
        .collect();
    observations.sort_by_key(|o| o.sensor_id);
    observations
}

/// Sensor id of a `sensor<N>` (or `sensor_<N>`) column.
fn wide_column_id(key: &str) -> Option<u32> {
    let head = key.get(..WIDE_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(WIDE_PREFIX) {
        return None;
    }
    let digits = key[WIDE_PREFIX.len()..].trim_start_matches('_');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Decode one long row at the given position.
pub fn decode_row(position: u64, row: &Value) -> Observation {
    let mut observation = Observation::new(position);
    let Value::Object(fields) = row else {
        return observation;
    };

    // First id key present wins, even if its value turns out to be invalid
    observation.sensor_id = ID_KEYS
        .iter()
        .find_map(|wanted| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| parse_sensor_id(value))
        })
        .flatten();

    for (key, value) in fields {
        let name = key.to_ascii_lowercase();
        if ID_KEYS.contains(&name.as_str()) || METADATA_KEYS.contains(&name.as_str()) {
            continue;
        }
        if let Some(number) = parse_number(value) {
            observation.readings.insert(name, number);
        }
    }

    observation
}

fn parse_sensor_id(value: &Value) -> Option<SensorId> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(id) => u32::try_from(id).ok().map(SensorId::new),
            None => n.as_f64().and_then(SensorId::from_f64),
        },
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Assigns absolute positions to the rows of a polled document.
///
/// Each poll is aligned against the previous one: the first rows of the new
/// document that repeat the tail of the old one keep their positions, and
/// every row after them gets a position past anything handed out before.
/// This covers a document that only grows, one that is reset to an empty
/// list (the daily archive), and a window serving only the latest rows. An
/// unchanged document gets the same positions again, which the resolver
/// rejects as stale.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    previous: Vec<Value>,
    first_position: u64,
    next_position: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode rows into a batch with absolute positions.
    pub fn sequence(&mut self, rows: &[Value]) -> Batch {
        let shift = self.alignment(rows);
        let overlap = (self.previous.len() - shift).min(rows.len());
        let overlap_start = self.first_position + shift as u64;

        let mut observations = Vec::with_capacity(rows.len());
        let mut first_position = self.next_position;
        for (i, row) in rows.iter().enumerate() {
            let position = if i < overlap {
                overlap_start + i as u64
            } else {
                let position = self.next_position;
                self.next_position += 1;
                position
            };
            if i == 0 {
                first_position = position;
            }
            observations.extend(decode_rows(position, row));
        }

        self.first_position = first_position;
        self.previous = rows.to_vec();
        Batch::from_observations(observations)
    }

    /// Smallest shift of the previous rows whose remainder starts `rows`.
    fn alignment(&self, rows: &[Value]) -> usize {
        let previous = &self.previous;
        (0..previous.len())
            .find(|&shift| {
                let tail = &previous[shift..];
                let len = tail.len().min(rows.len());
                tail[..len] == rows[..len]
            })
            .unwrap_or(previous.len())
    }

    /// Position the next new row will get.
    pub fn next_position(&self) -> u64 {
        self.next_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_long_format_row() {
        let obs = decode_row(3, &json!({"sensor_id": 2, "temperature": 25.5, "date": "2024-05-01"}));
        assert_eq!(obs.position, 3);
        assert_eq!(obs.sensor_id, Some(SensorId::new(2)));
        assert_eq!(obs.reading("temperature"), Some(25.5));
        assert_eq!(obs.readings.len(), 1);
    }

    #[test]
    fn accepts_id_aliases_and_loose_encodings() {
        let by_id = decode_row(0, &json!({"ID": "4", "Pressure": "12.5"}));
        assert_eq!(by_id.sensor_id, Some(SensorId::new(4)));
        assert_eq!(by_id.reading("pressure"), Some(12.5));

        let float_id = decode_row(0, &json!({"sensor": 3.0, "cap": 1200}));
        assert_eq!(float_id.sensor_id, Some(SensorId::new(3)));
        assert_eq!(float_id.reading("cap"), Some(1200.0));
    }

    #[test]
    fn invalid_ids_leave_row_unidentified() {
        for row in [
            json!({"temperature": 30}),
            json!({"sensor_id": "thumb", "temperature": 30}),
            json!({"sensor_id": -1, "temperature": 30}),
            json!({"sensor_id": null, "temperature": 30}),
            json!({"sensor_id": 2.5, "temperature": 30}),
        ] {
            assert_eq!(decode_row(0, &row).sensor_id, None, "row {}", row);
        }
    }

    #[test]
    fn non_numeric_metrics_are_dropped() {
        let obs = decode_row(0, &json!({"id": 1, "temperature": "hot", "pressure": true, "resistive": 7}));
        assert_eq!(obs.reading("temperature"), None);
        assert_eq!(obs.reading("pressure"), None);
        assert_eq!(obs.reading("resistive"), Some(7.0));
    }

    #[test]
    fn non_object_rows_keep_their_position() {
        let obs = decode_row(9, &json!([1, 2, 3]));
        assert_eq!(obs.position, 9);
        assert!(!obs.is_identified());
    }

    #[test]
    fn document_shapes() {
        assert_eq!(document_rows(json!([{"id": 1}])).unwrap().len(), 1);
        assert_eq!(document_rows(json!({"rows": [{"id": 1}, {"id": 2}]})).unwrap().len(), 2);
        assert_eq!(document_rows(json!({"data": []})).unwrap().len(), 0);
        assert!(document_rows(Value::Null).unwrap().is_empty());
        assert!(matches!(document_rows(json!({"id": 1})), Err(FetchError::Parse(_))));
        assert!(matches!(document_rows(json!(42)), Err(FetchError::Parse(_))));
    }

    #[test]
    fn sequencer_positions_follow_document_index() {
        let mut seq = Sequencer::new();
        let batch = seq.sequence(&[json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(batch.high_water_mark(), Some(1));

        let grown = seq.sequence(&[json!({"id": 1}), json!({"id": 2}), json!({"id": 1})]);
        assert_eq!(grown.high_water_mark(), Some(2));
        assert_eq!(seq.next_position(), 3);
    }

    #[test]
    fn sequencer_repeats_positions_for_unchanged_document() {
        let mut seq = Sequencer::new();
        let rows = [json!({"id": 1, "temperature": 30}), json!({"id": 2, "temperature": 31})];
        let first = seq.sequence(&rows);
        let again = seq.sequence(&rows);
        assert_eq!(first, again);
    }

    #[test]
    fn sequencer_keeps_positions_increasing_across_reset() {
        let mut seq = Sequencer::new();
        let before = seq.sequence(&[json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
        assert_eq!(before.high_water_mark(), Some(2));

        let reset = seq.sequence(&[]);
        assert!(reset.is_empty());
        assert_eq!(seq.next_position(), 3);

        let after = seq.sequence(&[json!({"id": 1, "temperature": 31})]);
        assert_eq!(after.high_water_mark(), Some(3));
    }

    #[test]
    fn sequencer_follows_sliding_window() {
        let mut seq = Sequencer::new();
        let row = |t: u32| json!({"sensor_id": 1, "temperature": t});

        let first = seq.sequence(&[row(20), row(21), row(22)]);
        assert_eq!(first.high_water_mark(), Some(2));

        // Window slides by one row
        let slid = seq.sequence(&[row(21), row(22), row(23)]);
        let positions: Vec<u64> = slid.iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);

        // Window replaced entirely
        let replaced = seq.sequence(&[row(30), row(31), row(32)]);
        let positions: Vec<u64> = replaced.iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![4, 5, 6]);
    }

    #[test]
    fn sliding_window_keeps_resolver_advancing() {
        use crate::data::{Outcome, Resolver};

        let mut seq = Sequencer::new();
        let mut resolver = Resolver::new();
        let window = |poll: u32| -> Vec<Value> {
            (0..3)
                .map(|i| json!({"sensor_id": 1, "temperature": 20 + poll * 3 + i}))
                .collect()
        };

        let outcomes: Vec<Outcome> = (0..4)
            .map(|poll| resolver.apply(&seq.sequence(&window(poll))))
            .collect();
        assert!(outcomes.iter().all(|o| *o == Outcome::Accepted), "{:?}", outcomes);
        assert_eq!(resolver.snapshot().metric(SensorId::new(1), "temperature"), 31.0);

        assert_eq!(resolver.apply(&seq.sequence(&window(3))), Outcome::Rejected);
    }

    #[test]
    fn decodes_wide_row_into_one_observation_per_sensor() {
        let row = json!({
            "date": "2024-03-02", "time": "09:15:30",
            "sensor1": 24, "sensor2": 25, "sensor3": 26, "sensor4": 12, "sensor5": 40
        });
        let observations = decode_rows(7, &row);

        assert_eq!(observations.len(), 5);
        assert!(observations.iter().all(|o| o.position == 7));
        let ids: Vec<u32> = observations.iter().filter_map(|o| o.sensor_id).map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(observations[0].reading(metric::TEMPERATURE), Some(24.0));
        assert_eq!(observations[2].reading(metric::TEMPERATURE), Some(26.0));
        assert_eq!(observations[3].reading(metric::PRESSURE), Some(12.0));
        assert_eq!(observations[4].reading(metric::PRESSURE), Some(40.0));
        assert_eq!(observations[4].readings.len(), 1);
    }

    #[test]
    fn wide_rows_skip_unusable_columns() {
        let observations = decode_rows(0, &json!({"Sensor_2": "25.5", "sensor3": "err", "sensorx": 1}));
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].sensor_id, Some(SensorId::new(2)));
        assert_eq!(observations[0].reading(metric::TEMPERATURE), Some(25.5));

        let nothing = decode_rows(4, &json!({"date": "2024-03-02", "sensor1": null}));
        assert_eq!(nothing.len(), 1);
        assert!(!nothing[0].is_identified());
        assert_eq!(nothing[0].position, 4);
    }

    #[test]
    fn long_rows_ignore_sensor_columns() {
        let observations = decode_rows(0, &json!({"sensor_id": 2, "temperature": 30, "sensor5": 9}));
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].sensor_id, Some(SensorId::new(2)));
    }

    #[test]
    fn wide_document_resolves_every_sensor() {
        use crate::data::{Outcome, Resolver};

        let rows = [
            json!({"date": "2024-03-02", "time": "09:00:00", "sensor1": 24, "sensor2": 25, "sensor3": 26, "sensor4": 10, "sensor5": 20}),
            json!({"date": "2024-03-02", "time": "09:00:05", "sensor1": 27, "sensor2": 28, "sensor3": 29, "sensor4": 30, "sensor5": 40}),
        ];
        let mut seq = Sequencer::new();
        let mut resolver = Resolver::new();

        assert_eq!(resolver.apply(&seq.sequence(&rows)), Outcome::Accepted);
        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.metric(SensorId::new(1), metric::TEMPERATURE), 27.0);
        assert_eq!(snapshot.metric(SensorId::new(5), metric::PRESSURE), 40.0);
    }
}

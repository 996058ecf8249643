//! Snapshot - the latest known reading for each sensor.

use std::collections::BTreeMap;

use crate::{Observation, SensorId};

/// Value substituted when a sensor or metric has never reported.
pub const DEFAULT_READING: f64 = 0.0;

/// The latest row seen for one sensor.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Position of the row this reading came from.
    pub position: u64,

    /// Metric values from that row.
    pub readings: BTreeMap<String, f64>,
}

impl SensorReading {
    /// Get a metric value from this reading.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.readings.get(metric).copied().filter(|v| v.is_finite())
    }
}

impl From<&Observation> for SensorReading {
    fn from(obs: &Observation) -> Self {
        Self {
            position: obs.position,
            readings: obs.readings.clone(),
        }
    }
}

/// A resolved view of a sensor feed: one entry per sensor, holding the most
/// recent row for that sensor.
///
/// # Example
///
/// ```rust
/// use handwatch_types::{SensorId, SensorReading, Snapshot};
///
/// let mut snapshot = Snapshot::new();
/// snapshot.insert(SensorId::new(2), SensorReading {
///     position: 0,
///     readings: [("temperature".to_string(), 25.0)].into_iter().collect(),
/// });
///
/// assert_eq!(snapshot.metric(SensorId::new(2), "temperature"), 25.0);
/// // Sensors that never reported read as a neutral zero
/// assert_eq!(snapshot.metric(SensorId::new(9), "pressure"), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Latest reading per sensor.
    pub sensors: BTreeMap<SensorId, SensorReading>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no sensor has reported.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Number of sensors in the snapshot.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Insert or replace the reading for a sensor.
    pub fn insert(&mut self, id: SensorId, reading: SensorReading) {
        self.sensors.insert(id, reading);
    }

    /// Get the latest reading for a sensor.
    pub fn get(&self, id: SensorId) -> Option<&SensorReading> {
        self.sensors.get(&id)
    }

    /// Check whether a sensor has reported.
    pub fn contains(&self, id: SensorId) -> bool {
        self.sensors.contains_key(&id)
    }

    /// Iterate over sensors in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&SensorId, &SensorReading)> {
        self.sensors.iter()
    }

    /// Look up a metric, distinguishing "absent" from any real value.
    pub fn reading(&self, id: SensorId, metric: &str) -> Option<f64> {
        self.sensors.get(&id).and_then(|r| r.get(metric))
    }

    /// Look up a metric, substituting [`DEFAULT_READING`] when the sensor or
    /// metric is missing.
    pub fn metric(&self, id: SensorId, metric: &str) -> f64 {
        self.reading(id, metric).unwrap_or(DEFAULT_READING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(pairs: &[(&str, f64)]) -> SensorReading {
        SensorReading {
            position: 0,
            readings: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn metric_returns_present_value() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(SensorId::new(3), reading(&[("capacitive", 1200.0)]));
        assert_eq!(snapshot.metric(SensorId::new(3), "capacitive"), 1200.0);
        assert_eq!(snapshot.reading(SensorId::new(3), "capacitive"), Some(1200.0));
    }

    #[test]
    fn metric_defaults_for_missing_sensor_or_key() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(SensorId::new(3), reading(&[("capacitive", 1200.0)]));

        assert_eq!(snapshot.metric(SensorId::new(9), "pressure"), DEFAULT_READING);
        assert_eq!(snapshot.metric(SensorId::new(3), "temperature"), DEFAULT_READING);
        assert_eq!(snapshot.reading(SensorId::new(3), "temperature"), None);
    }

    #[test]
    fn metric_defaults_for_non_finite_value() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(SensorId::new(1), reading(&[("temperature", f64::NAN)]));
        assert_eq!(snapshot.metric(SensorId::new(1), "temperature"), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(SensorId::new(2), reading(&[("temperature", 25.0)]));

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, parsed);
    }
}

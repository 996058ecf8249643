//! Observation - a single raw row from a sensor feed.

use std::collections::BTreeMap;

use crate::SensorId;

/// One row of raw input from a data source.
///
/// `position` is the row's recency index in the source's full history; the
/// resolver uses it to pick the latest row per sensor and to detect stale
/// batches. Rows without a usable `sensor_id` are kept here so positions
/// still line up with the source, and are dropped during resolution.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Absolute position of the row in the source's history.
    pub position: u64,

    /// Sensor that produced the row, if the row carried a valid id.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub sensor_id: Option<SensorId>,

    /// Numeric metric values keyed by metric name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub readings: BTreeMap<String, f64>,
}

impl Observation {
    /// Create an empty observation at the given position.
    pub fn new(position: u64) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Create a builder for an observation at the given position.
    pub fn builder(position: u64) -> ObservationBuilder {
        ObservationBuilder::new(position)
    }

    /// Get a metric value carried by this row.
    pub fn reading(&self, metric: &str) -> Option<f64> {
        self.readings.get(metric).copied()
    }

    /// Whether the row identifies its sensor.
    pub fn is_identified(&self) -> bool {
        self.sensor_id.is_some()
    }
}

/// Builder for constructing `Observation` instances.
#[derive(Debug)]
pub struct ObservationBuilder {
    observation: Observation,
}

impl ObservationBuilder {
    /// Create a new builder at the given position.
    pub fn new(position: u64) -> Self {
        Self {
            observation: Observation::new(position),
        }
    }

    /// Set the sensor id.
    pub fn sensor(mut self, id: impl Into<SensorId>) -> Self {
        self.observation.sensor_id = Some(id.into());
        self
    }

    /// Add a metric value. Non-finite values are ignored.
    pub fn reading(mut self, metric: impl Into<String>, value: f64) -> Self {
        if value.is_finite() {
            self.observation.readings.insert(metric.into(), value);
        }
        self
    }

    /// Build the observation.
    pub fn build(self) -> Observation {
        self.observation
    }
}

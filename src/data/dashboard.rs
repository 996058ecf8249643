//! Dashboard model: a resolved snapshot laid out on the hand.
//!
//! This module turns a [`Snapshot`] into per-point readings and summary
//! figures, and derives the link status shown in the header.

use std::time::{Duration, Instant};

use handwatch_types::{metric, SensorId, Snapshot};

use super::layout::HandLayout;

/// Liveness thresholds for the data source.
///
/// Both are measured from the last *accepted* batch, so a source that keeps
/// answering with stale data still goes stale and then offline.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Time without new data after which the feed is shown as stale.
    pub stale_after: Duration,
    /// Time without new data after which the source is considered offline.
    pub offline_after: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(5),
            offline_after: Duration::from_secs(30),
        }
    }
}

/// Liveness of the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkStatus {
    /// Data arrived within the stale threshold.
    Live,
    /// Nothing accepted yet.
    Waiting,
    /// No new data for longer than `stale_after`.
    Stale,
    /// No new data for longer than `offline_after`.
    Offline,
}

impl LinkStatus {
    /// Classify the time since the last accepted batch.
    pub fn from_age(age: Option<Duration>, thresholds: &Thresholds) -> Self {
        match age {
            None => LinkStatus::Waiting,
            Some(age) if age >= thresholds.offline_after => LinkStatus::Offline,
            Some(age) if age >= thresholds.stale_after => LinkStatus::Stale,
            Some(_) => LinkStatus::Live,
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            LinkStatus::Live => "LIVE",
            LinkStatus::Waiting => "WAIT",
            LinkStatus::Stale => "STALE",
            LinkStatus::Offline => "OFFLINE",
        }
    }
}

/// The metric the map is coloured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Temperature,
    Pressure,
}

impl Metric {
    pub fn toggle(self) -> Self {
        match self {
            Metric::Temperature => Metric::Pressure,
            Metric::Pressure => Metric::Temperature,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Pressure => "Force",
        }
    }

    /// Row key the metric is read from.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Temperature => metric::TEMPERATURE,
            Metric::Pressure => metric::PRESSURE,
        }
    }
}

/// Reading for one sensor point on the hand.
#[derive(Debug, Clone, PartialEq)]
pub struct PointReading {
    pub label: String,
    pub sensor_id: SensorId,
    /// Position on the displayed hand.
    pub x: f64,
    pub y: f64,
    /// Temperature, 0.0 when the sensor never reported one.
    pub temperature: f64,
    /// Pressure, 0.0 when the sensor never reported one.
    pub pressure: f64,
    pub has_temperature: bool,
    pub has_pressure: bool,
    /// Whether the sensor appears in the snapshot with any metric.
    pub present: bool,
}

impl PointReading {
    /// Whether the sensor appears in the snapshot at all.
    pub fn reported(&self) -> bool {
        self.present
    }

    /// The metric's value, `None` when the sensor did not report it.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.has_temperature.then_some(self.temperature),
            Metric::Pressure => self.has_pressure.then_some(self.pressure),
        }
    }
}

/// Everything the views need for one accepted snapshot.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub points: Vec<PointReading>,
    /// Mean temperature over points that reported one.
    pub avg_temperature: Option<f64>,
    /// Mean pressure over points that reported one.
    pub avg_pressure: Option<f64>,
    /// Sensors present in the snapshot, including ones not on the layout.
    pub sensors_reporting: usize,
    /// High-water mark of the batch this data came from.
    pub high_water_mark: Option<u64>,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Lay a snapshot out on the hand.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        layout: &HandLayout,
        high_water_mark: Option<u64>,
        now: Instant,
    ) -> Self {
        let points: Vec<PointReading> = layout
            .points()
            .iter()
            .map(|point| {
                let (x, y) = layout.position(point);
                let id = point.sensor_id;
                PointReading {
                    label: point.label.clone(),
                    sensor_id: id,
                    x,
                    y,
                    temperature: snapshot.metric(id, metric::TEMPERATURE),
                    pressure: snapshot.metric(id, metric::PRESSURE),
                    has_temperature: snapshot.reading(id, metric::TEMPERATURE).is_some(),
                    has_pressure: snapshot.reading(id, metric::PRESSURE).is_some(),
                    present: snapshot.contains(id),
                }
            })
            .collect();

        let avg_temperature = mean(points.iter().filter(|p| p.has_temperature).map(|p| p.temperature));
        let avg_pressure = mean(points.iter().filter(|p| p.has_pressure).map(|p| p.pressure));

        Self {
            points,
            avg_temperature,
            avg_pressure,
            sensors_reporting: snapshot.len(),
            high_water_mark,
            last_updated: now,
        }
    }

    /// Number of layout points whose sensor has reported.
    pub fn points_reporting(&self) -> usize {
        self.points.iter().filter(|p| p.reported()).count()
    }

    /// Difference between the average temperature and a baseline.
    pub fn temperature_delta(&self, baseline: f64) -> Option<f64> {
        self.avg_temperature.map(|t| t - baseline)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

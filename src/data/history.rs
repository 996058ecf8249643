//! Historical data tracking for sparklines and rate calculations.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use handwatch_types::SensorId;

use super::dashboard::DashboardData;

/// Maximum number of samples to keep per series.
const MAX_HISTORY_SIZE: usize = 60;

/// A bounded series of timestamped samples.
pub type Series = VecDeque<(Instant, f64)>;

/// Tracks per-sensor readings across accepted snapshots.
///
/// Only accepted snapshots are recorded, so a stale feed does not flatten
/// the trend lines.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Temperature samples per sensor.
    pub temperature: HashMap<SensorId, Series>,
    /// Pressure samples per sensor.
    pub pressure: HashMap<SensorId, Series>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the readings of an accepted snapshot.
    pub fn record(&mut self, data: &DashboardData) {
        for point in &data.points {
            if point.has_temperature {
                push_capped(
                    self.temperature.entry(point.sensor_id).or_default(),
                    (data.last_updated, point.temperature),
                );
            }
            if point.has_pressure {
                push_capped(
                    self.pressure.entry(point.sensor_id).or_default(),
                    (data.last_updated, point.pressure),
                );
            }
        }
    }

    /// Sparkline levels (0-7) for a series; empty with fewer than two samples.
    pub fn sparkline(series: Option<&Series>) -> Vec<u8> {
        let Some(values) = series else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        values
            .iter()
            .map(|(_, v)| {
                if range <= f64::EPSILON {
                    return 3;
                }
                let normalized = ((v - min) / range * 7.0).round() as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Temperature sparkline for a sensor.
    pub fn temperature_sparkline(&self, id: SensorId) -> Vec<u8> {
        Self::sparkline(self.temperature.get(&id))
    }

    /// Pressure sparkline for a sensor.
    pub fn pressure_sparkline(&self, id: SensorId) -> Vec<u8> {
        Self::sparkline(self.pressure.get(&id))
    }

    /// Change per second between the last two samples of a series.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn rate(series: Option<&Series>) -> Option<f64> {
        let values = series?;
        if values.len() < 2 {
            return None;
        }

        let (current_time, current) = *values.back()?;
        let (previous_time, previous) = *values.get(values.len() - 2)?;
        let elapsed = current_time.duration_since(previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some((current - previous) / elapsed)
        } else {
            None
        }
    }

    /// Temperature change per second for a sensor.
    pub fn temperature_rate(&self, id: SensorId) -> Option<f64> {
        Self::rate(self.temperature.get(&id))
    }

    /// Pressure change per second for a sensor.
    pub fn pressure_rate(&self, id: SensorId) -> Option<f64> {
        Self::rate(self.pressure.get(&id))
    }
}

fn push_capped(series: &mut Series, sample: (Instant, f64)) {
    series.push_back(sample);
    if series.len() > MAX_HISTORY_SIZE {
        series.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dashboard::PointReading;
    use std::time::Duration;

    fn make_data(at: Instant, readings: Vec<(u32, Option<f64>, Option<f64>)>) -> DashboardData {
        let points = readings
            .into_iter()
            .map(|(id, temp, press)| PointReading {
                label: format!("s{}", id),
                sensor_id: SensorId::new(id),
                x: 0.0,
                y: 0.0,
                temperature: temp.unwrap_or(0.0),
                pressure: press.unwrap_or(0.0),
                has_temperature: temp.is_some(),
                has_pressure: press.is_some(),
                present: temp.is_some() || press.is_some(),
            })
            .collect();

        DashboardData {
            points,
            avg_temperature: None,
            avg_pressure: None,
            sensors_reporting: 0,
            high_water_mark: None,
            last_updated: at,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let h = History::new();
        assert!(h.temperature.is_empty());
        assert!(h.pressure.is_empty());
    }

    #[test]
    fn record_skips_unreported_metrics() {
        let mut h = History::new();
        h.record(&make_data(Instant::now(), vec![(1, Some(33.0), None)]));

        assert_eq!(h.temperature.get(&SensorId::new(1)).map(|s| s.len()), Some(1));
        assert!(!h.pressure.contains_key(&SensorId::new(1)));
    }

    #[test]
    fn history_caps_at_max_size() {
        let mut h = History::new();
        let start = Instant::now();

        for i in 0..70 {
            let at = start + Duration::from_millis(i * 100);
            h.record(&make_data(at, vec![(1, Some(i as f64), None)]));
        }

        let series = h.temperature.get(&SensorId::new(1)).unwrap();
        assert_eq!(series.len(), 60);
        assert_eq!(series.front().map(|(_, v)| *v), Some(10.0));
    }

    #[test]
    fn sparkline_empty_with_single_reading() {
        let mut h = History::new();
        h.record(&make_data(Instant::now(), vec![(1, Some(30.0), None)]));
        assert!(h.temperature_sparkline(SensorId::new(1)).is_empty());
        assert!(h.temperature_sparkline(SensorId::new(2)).is_empty());
    }

    #[test]
    fn sparkline_spans_full_range() {
        let mut h = History::new();
        let start = Instant::now();
        for (i, v) in [30.0, 31.0, 34.0].into_iter().enumerate() {
            let at = start + Duration::from_secs(i as u64);
            h.record(&make_data(at, vec![(1, Some(v), None)]));
        }
        assert_eq!(h.temperature_sparkline(SensorId::new(1)), vec![0, 2, 7]);
    }

    #[test]
    fn flat_series_renders_mid_level() {
        let mut h = History::new();
        let start = Instant::now();
        for i in 0..3 {
            h.record(&make_data(start + Duration::from_secs(i), vec![(2, None, Some(5.0))]));
        }
        assert_eq!(h.pressure_sparkline(SensorId::new(2)), vec![3, 3, 3]);
    }

    #[test]
    fn rate_uses_last_two_samples() {
        let mut h = History::new();
        let start = Instant::now();
        h.record(&make_data(start, vec![(1, Some(30.0), Some(10.0))]));
        h.record(&make_data(start + Duration::from_secs(2), vec![(1, Some(31.0), Some(4.0))]));

        assert_eq!(h.temperature_rate(SensorId::new(1)), Some(0.5));
        assert_eq!(h.pressure_rate(SensorId::new(1)), Some(-3.0));
        assert_eq!(h.temperature_rate(SensorId::new(9)), None);
    }
}

//! Display ranges for metrics.

use crate::data::Metric;

/// The range a metric is plotted over.
///
/// Values outside the range are clamped for colouring; the readout still
/// shows the raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScale {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl MetricScale {
    pub fn new(min: f64, max: f64, unit: &'static str) -> Self {
        Self { min, max, unit }
    }

    /// Skin temperature, −20..60 °C.
    pub fn temperature() -> Self {
        Self::new(-20.0, 60.0, "°C")
    }

    /// Fingertip force, 0..50 N.
    pub fn pressure() -> Self {
        Self::new(0.0, 50.0, "N")
    }

    /// Default scale for a metric.
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Temperature => Self::temperature(),
            Metric::Pressure => Self::pressure(),
        }
    }

    /// Same unit over a different range.
    pub fn with_range(self, min: f64, max: f64) -> Self {
        Self { min, max, ..self }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the range, 0.0 to 1.0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        (self.clamp(value) - self.min) / span
    }

    /// Value with unit, e.g. "33.1°C".
    pub fn format(&self, value: f64) -> String {
        format!("{:.1}{}", value, self.unit)
    }
}

/// The scales for both metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub temperature: MetricScale,
    pub pressure: MetricScale,
}

impl Default for Scales {
    fn default() -> Self {
        Self {
            temperature: MetricScale::temperature(),
            pressure: MetricScale::pressure(),
        }
    }
}

impl Scales {
    pub fn get(&self, metric: Metric) -> &MetricScale {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Pressure => &self.pressure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_and_normalize() {
        let scale = MetricScale::temperature();
        assert_eq!(scale.clamp(75.0), 60.0);
        assert_eq!(scale.clamp(-40.0), -20.0);
        assert_eq!(scale.normalize(-20.0), 0.0);
        assert_eq!(scale.normalize(20.0), 0.5);
        assert_eq!(scale.normalize(100.0), 1.0);
        assert_eq!(scale.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn test_degenerate_range() {
        let scale = MetricScale::pressure().with_range(10.0, 10.0);
        assert_eq!(scale.normalize(12.0), 0.0);
        assert_eq!(scale.clamp(12.0), 10.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(MetricScale::temperature().format(33.04), "33.0°C");
        assert_eq!(MetricScale::pressure().format(12.5), "12.5N");
    }

    #[test]
    fn test_scales_lookup() {
        let scales = Scales::default();
        assert_eq!(scales.get(Metric::Pressure).max, 50.0);
        assert_eq!(scales.get(Metric::Temperature).unit, "°C");
        assert_eq!(MetricScale::for_metric(Metric::Pressure), MetricScale::pressure());
    }
}

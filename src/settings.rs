//! Dashboard settings.
//!
//! Settings are layered: serde defaults, then an optional TOML file, then
//! `HANDWATCH_*` environment variables (nested keys separated by `__`, e.g.
//! `HANDWATCH_SOURCE__URL`). Command-line flags are applied on top by the
//! binary.
//!
//! ```toml
//! refresh = "1s"
//! hand = "left"
//!
//! [source]
//! kind = "http"
//! url = "http://192.168.1.40/readings"
//! timeout = "3s"
//!
//! [thresholds]
//! stale_after = "5s"
//! offline_after = "30s"
//!
//! [log]
//! file = "handwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::layout::default_points;
use crate::data::{Hand, HandLayout, SensorPoint, Thresholds};
use crate::source::{DataSource, FileSource, HttpSource, SimulatedSource};
use crate::ui::{MetricScale, Scales};

/// Where batches come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    File,
    Http,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    /// HTTP request timeout.
    pub timeout: String,
    /// Seed for the simulated source.
    pub seed: Option<u64>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            path: None,
            url: None,
            timeout: "5s".to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub stale_after: String,
    pub offline_after: String,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            stale_after: "5s".to_string(),
            offline_after: "30s".to_string(),
        }
    }
}

/// Display range of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangeSettings {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScaleSettings {
    pub temperature: RangeSettings,
    pub pressure: RangeSettings,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            temperature: RangeSettings { min: -20.0, max: 60.0 },
            pressure: RangeSettings { min: 0.0, max: 50.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file; logging is off when unset since the terminal belongs to the UI.
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

/// All dashboard settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Poll interval.
    pub refresh: String,
    pub source: SourceSettings,
    pub thresholds: ThresholdSettings,
    pub hand: Hand,
    pub points: Vec<SensorPoint>,
    /// Reference temperature for the header delta (°C).
    pub baseline_temperature: f64,
    pub scales: ScaleSettings,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh: "1s".to_string(),
            source: SourceSettings::default(),
            thresholds: ThresholdSettings::default(),
            hand: Hand::default(),
            points: default_points(),
            baseline_temperature: 33.0,
            scales: ScaleSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(env)
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Poll interval.
    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_duration(&self.refresh).context("Invalid refresh interval")
    }

    /// HTTP request timeout.
    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.source.timeout).context("Invalid source timeout")
    }

    /// Liveness thresholds.
    pub fn thresholds(&self) -> Result<Thresholds> {
        let stale_after =
            parse_duration(&self.thresholds.stale_after).context("Invalid stale threshold")?;
        let offline_after =
            parse_duration(&self.thresholds.offline_after).context("Invalid offline threshold")?;
        if offline_after < stale_after {
            anyhow::bail!("offline threshold must not be shorter than the stale threshold");
        }
        Ok(Thresholds {
            stale_after,
            offline_after,
        })
    }

    /// Sensor layout for the configured hand.
    pub fn layout(&self) -> HandLayout {
        HandLayout::new(self.hand, self.points.clone())
    }

    /// Display ranges for both metrics.
    pub fn scales(&self) -> Scales {
        Scales {
            temperature: MetricScale::temperature()
                .with_range(self.scales.temperature.min, self.scales.temperature.max),
            pressure: MetricScale::pressure()
                .with_range(self.scales.pressure.min, self.scales.pressure.max),
        }
    }

    /// Build the configured data source.
    pub fn build_source(&self) -> Result<Box<dyn DataSource>> {
        let source: Box<dyn DataSource> = match self.source.kind {
            SourceKind::Simulated => {
                Box::new(SimulatedSource::new(self.points.clone(), self.source.seed))
            }
            SourceKind::File => {
                let path = self
                    .source
                    .path
                    .as_ref()
                    .context("source.path is required for a file source")?;
                Box::new(FileSource::new(path))
            }
            SourceKind::Http => {
                let url = self
                    .source
                    .url
                    .as_ref()
                    .context("source.url is required for an http source")?;
                Box::new(
                    HttpSource::builder()
                        .url(url)
                        .timeout(self.timeout()?)
                        .build()?,
                )
            }
        };
        Ok(source)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("HANDWATCH")
        .prefix_separator("_")
        .separator("__")
}

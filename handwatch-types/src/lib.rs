//! # handwatch-types
//!
//! Core types shared by the handwatch dashboard and its tooling. A data
//! source produces [`Batch`]es of raw [`Observation`]s; the dashboard resolves
//! them into a [`Snapshot`] holding the latest reading per [`SensorId`].
//!
//! ## Features
//!
//! - `serde`: JSON (or any serde format) support for all types
//!
//! ## Example
//!
//! ```rust
//! use handwatch_types::{Batch, Observation, SensorId};
//!
//! let batch = Batch::builder()
//!     .row(|o| o.sensor(2).reading("temperature", 25.0))
//!     .row(|o| o.sensor(3).reading("capacitive", 1200.0))
//!     .build();
//!
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.high_water_mark(), Some(1));
//! assert_eq!(batch.observations[0].sensor_id, Some(SensorId::new(2)));
//! ```

mod batch;
mod observation;
mod sensor;
mod snapshot;

pub use batch::*;
pub use observation::*;
pub use sensor::*;
pub use snapshot::*;

/// Well-known metric names emitted by hand sensors.
pub mod metric {
    /// Skin temperature in °C.
    pub const TEMPERATURE: &str = "temperature";
    /// Contact force/pressure, in newtons.
    pub const PRESSURE: &str = "pressure";
    /// Raw capacitive touch reading.
    pub const CAPACITIVE: &str = "capacitive";
    /// Raw resistive (FSR) reading.
    pub const RESISTIVE: &str = "resistive";
}

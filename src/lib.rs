//! # handwatch
//!
//! A live terminal dashboard and library for hand-mounted temperature and
//! pressure sensors.
//!
//! Sensor feeds arrive as loosely structured rows, sometimes repeated,
//! sometimes out of date. This crate resolves each fetched batch into the
//! latest reading per sensor, refuses batches that are not newer than what
//! is already shown, and renders the result on a hand outline in an
//! interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │(resolver)│    │(render) │    │          │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └──────────┘  │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ┌─────────┐                                                 │
//! │  │ source  │◀── Simulated | File | Http | Channel            │
//! │  │ (input) │                                                 │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Session state, the poll cycle and user interaction
//! - **[`source`]**: The [`DataSource`] trait with simulated, file, HTTP and
//!   channel implementations
//! - **[`data`]**: The [`Resolver`], hand layout, dashboard model and history
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`clock`]**: Injectable time for the poll loop
//! - **[`settings`]**: Layered configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Generated data
//! handwatch --simulate
//!
//! # A JSON document on disk
//! handwatch --file readings.json
//!
//! # An HTTP endpoint
//! handwatch --url http://192.168.1.40/readings --refresh 500ms
//! ```
//!
//! ### Resolving batches directly
//!
//! ```
//! use handwatch::{Outcome, Resolver};
//! use handwatch_types::{Batch, SensorId};
//!
//! let mut resolver = Resolver::new();
//! let batch = Batch::builder()
//!     .row(|o| o.sensor(1).reading("temperature", 31.0))
//!     .row(|o| o.sensor(1).reading("temperature", 32.5))
//!     .build();
//!
//! assert_eq!(resolver.apply(&batch), Outcome::Accepted);
//! assert_eq!(resolver.snapshot().metric(SensorId::new(1), "temperature"), 32.5);
//!
//! // The same batch again is stale
//! assert_eq!(resolver.apply(&batch), Outcome::Rejected);
//! ```
//!
//! ### As a library with a channel source
//!
//! ```no_run
//! use handwatch::{App, ChannelSource, Thresholds};
//! use handwatch_types::Batch;
//!
//! # tokio_test::block_on(async {
//! let (tx, source) = ChannelSource::create("uplink");
//! let mut app = App::new(Box::new(source), Thresholds::default());
//!
//! // A producer task publishes the current batch
//! tokio::spawn(async move {
//!     let _ = tx.send(Batch::builder().row(|o| o.sensor(2).reading("pressure", 4.0)).build());
//! });
//!
//! app.tick();
//! # });
//! ```

pub mod app;
pub mod clock;
pub mod data;
pub mod events;
pub mod logging;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use clock::{Clock, ManualClock, SystemClock, Ticker};
pub use data::{
    resolve, DashboardData, Hand, HandLayout, LinkStatus, Metric, Outcome, Resolution, Resolver,
    ResolverState, SensorPoint, Thresholds,
};
pub use settings::Settings;
pub use source::{ChannelSource, DataSource, FetchError, FileSource, HttpSource, SimulatedSource};

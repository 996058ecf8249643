//! Data models and processing for sensor feeds.
//!
//! This module turns raw batches into a resolved snapshot and then into
//! display-ready data.
//!
//! ## Submodules
//!
//! - [`resolver`]: Latest-reading resolution and staleness gating ([`Resolver`])
//! - [`layout`]: Hand geometry and sensor positions ([`HandLayout`])
//! - [`dashboard`]: Per-point readings, averages and link status ([`DashboardData`])
//! - [`history`]: Historical tracking for sparklines and rates
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Batch (raw rows)
//!        │
//!        ▼
//! Resolver::apply() ── rejected ──▶ keep previous DashboardData
//!        │ accepted
//!        ▼
//! DashboardData::from_snapshot()
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod dashboard;
pub mod duration;
pub mod history;
pub mod layout;
pub mod resolver;

pub use dashboard::{DashboardData, LinkStatus, Metric, PointReading, Thresholds};
pub use history::History;
pub use layout::{Hand, HandLayout, SensorPoint};
pub use resolver::{resolve, Outcome, Resolution, Resolver, ResolverState};

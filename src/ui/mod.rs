//! Terminal rendering.
//!
//! - [`common`]: header, tabs, status bar and help overlay
//! - [`map`]: hand outline with colour-coded sensor points
//! - [`sensors`]: per-sensor table with trends
//! - [`scale`]: display ranges ([`MetricScale`])
//! - [`theme`]: colours and gradients ([`Theme`])

pub mod common;
pub mod map;
pub mod scale;
pub mod sensors;
pub mod theme;

pub use scale::{MetricScale, Scales};
pub use theme::Theme;

//! Data source abstraction for fetching sensor batches.
//!
//! This module provides a trait-based abstraction for pulling raw rows from
//! various backends (generated data, files on disk, HTTP endpoints, in-memory
//! channels). Every fetch returns the source's current batch; deciding
//! whether that batch is new is the resolver's job.

mod channel;
mod error;
mod file;
mod http;
pub mod rows;
mod simulated;

pub use channel::ChannelSource;
pub use error::FetchError;
pub use file::FileSource;
pub use http::HttpSource;
pub use simulated::SimulatedSource;

use std::fmt::Debug;

use handwatch_types::Batch;

/// Trait for fetching sensor batches from various sources.
///
/// A failed fetch is reported as an error, distinct from an empty batch,
/// so the dashboard can show an error banner while keeping the last good
/// data on screen.
///
/// # Example
///
/// ```
/// use handwatch::{DataSource, SimulatedSource};
/// use handwatch::data::HandLayout;
///
/// let mut source = SimulatedSource::new(HandLayout::default().points().to_vec(), Some(7));
/// let batch = source.fetch().unwrap();
/// assert_eq!(batch.len(), 5);
/// ```
pub trait DataSource: Send + Debug {
    /// Fetch the current batch.
    fn fetch(&mut self) -> Result<Batch, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

//! # handwatch-archive
//!
//! Housekeeping for the JSON document a handwatch sensor feed is written to
//! when that document lives in a GitHub repository.
//!
//! - **[`rotate`]**: once a day, copy the document to
//!   `archive/Data_<date>.json` and reset it to `[]`
//! - **[`append`]**: add one synthetic reading per sensor, for testing the
//!   pipeline without hardware
//!
//! Both work against any [`DocumentStore`]; [`GithubStore`] talks to the
//! GitHub contents API and [`MemoryStore`] keeps documents in process.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use handwatch_archive::{rotate_if_stale, MemoryStore, RotateOutcome};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = MemoryStore::new().with_document(
//!     "sensor_data.json",
//!     r#"[{"date": "2024-03-01", "sensor_id": 1, "temperature": 24}]"#,
//! );
//! let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
//!
//! let outcome = rotate_if_stale(&store, "sensor_data.json", "archive", today).await?;
//! assert!(matches!(outcome, RotateOutcome::Archived { .. }));
//! assert_eq!(store.content("sensor_data.json").as_deref(), Some("[]"));
//! # Ok::<(), handwatch_archive::ArchiveError>(())
//! # }).unwrap();
//! ```

pub mod append;
pub mod error;
pub mod github;
pub mod rotate;
pub mod settings;
pub mod store;

pub use append::{append_rows, synthetic_rows};
pub use error::ArchiveError;
pub use github::GithubStore;
pub use rotate::{rotate_if_stale, RotateOutcome};
pub use settings::ArchiveSettings;
pub use store::{Document, DocumentStore, MemoryStore};

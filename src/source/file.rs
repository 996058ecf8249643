//! File-based data source.
//!
//! Polls a JSON row document on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use handwatch_types::Batch;

use super::rows::{document_rows, Sequencer};
use super::{DataSource, FetchError};

/// A data source that reads sensor rows from a JSON file.
///
/// This covers spreadsheet exports and documents synced down from the
/// archive repository. The source tracks the file's modification time and
/// only re-parses when the file has been updated; otherwise it hands back
/// the batch it already has, which the resolver will treat as stale.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_modified: Option<SystemTime>,
    sequencer: Sequencer,
    cached_batch: Option<Batch>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_modified: None,
            sequencer: Sequencer::new(),
            cached_batch: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file's modification time.
    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and parse the file.
    fn read_file(&mut self) -> Result<Batch, FetchError> {
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(self.sequencer.sequence(&[]));
        }
        let document: serde_json::Value = serde_json::from_str(&content)?;
        let rows = document_rows(document)?;
        Ok(self.sequencer.sequence(&rows))
    }
}

impl DataSource for FileSource {
    fn fetch(&mut self) -> Result<Batch, FetchError> {
        let current_modified = self.get_modified_time();

        // Check if file has been modified since last read
        let file_changed = match (&self.cached_batch, self.last_modified, current_modified) {
            (None, _, _) => true,       // Nothing read yet
            (Some(_), _, None) => true, // File disappeared, surface the read error
            (Some(_), None, Some(_)) => true,
            (Some(_), Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            if let Some(batch) = &self.cached_batch {
                return Ok(batch.clone());
            }
        }

        let batch = self.read_file()?;
        self.last_modified = current_modified;
        self.cached_batch = Some(batch.clone());
        Ok(batch)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handwatch_types::SensorId;
    use std::io::{Seek, Write};
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"[
            {"sensor_id": 1, "temperature": 32.5},
            {"sensor_id": 4, "pressure": 12.0},
            {"sensor_id": 1, "temperature": 33.0}
        ]"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/sensor_data.json");
        assert_eq!(source.path(), Path::new("/tmp/sensor_data.json"));
        assert_eq!(source.description(), "file: /tmp/sensor_data.json");
    }

    #[test]
    fn test_file_source_reads_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let batch = source.fetch().unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.high_water_mark(), Some(2));
        assert_eq!(batch.observations[1].sensor_id, Some(SensorId::new(4)));
    }

    #[test]
    fn test_file_source_unchanged_file_returns_same_batch() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let first = source.fetch().unwrap();
        let second = source.fetch().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let _ = source.fetch().unwrap();
        let first_modified = file.as_file().metadata().unwrap().modified().unwrap();

        file.rewind().unwrap();
        file.as_file().set_len(0).unwrap();
        writeln!(
            file,
            r#"[{{"sensor_id": 1, "temperature": 32.5}}, {{"sensor_id": 4, "pressure": 12.0}},
                {{"sensor_id": 1, "temperature": 33.0}}, {{"sensor_id": 2, "temperature": 30.0}}]"#
        )
        .unwrap();
        file.flush().unwrap();
        file.as_file()
            .set_modified(first_modified + Duration::from_secs(5))
            .unwrap();

        let batch = source.fetch().unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.high_water_mark(), Some(3));
    }

    #[test]
    fn test_file_source_same_mtime_keeps_cached_batch() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let first = source.fetch().unwrap();
        let modified = file.as_file().metadata().unwrap().modified().unwrap();

        file.rewind().unwrap();
        file.as_file().set_len(0).unwrap();
        writeln!(file, r#"[{{"sensor_id": 2, "temperature": 30.0}}]"#).unwrap();
        file.flush().unwrap();
        file.as_file().set_modified(modified).unwrap();

        assert_eq!(source.fetch().unwrap(), first);
    }

    #[test]
    fn test_file_source_empty_file_is_empty_batch() {
        let file = NamedTempFile::new().unwrap();
        let mut source = FileSource::new(file.path());
        let batch = source.fetch().unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/sensor_data.json");

        let err = source.fetch().unwrap_err();
        assert!(matches!(err, FetchError::Read(_)));
        assert!(err.to_string().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        let err = source.fetch().unwrap_err();
        assert!(err.to_string().contains("Parse error"));
    }
}

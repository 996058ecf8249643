//! Channel-based data source.
//!
//! Receives batches via a tokio watch channel. Useful when rows are pushed
//! by another task (a serial reader, a bridge from a device uplink) rather
//! than polled from a file or endpoint, and for driving the app in tests.

use handwatch_types::Batch;
use tokio::sync::watch;

use super::{DataSource, FetchError};

/// A data source that receives batches via a channel.
///
/// The producer publishes the full current batch; every fetch returns the
/// latest value. Once the producer is dropped the source reports
/// [`FetchError::Disconnected`].
///
/// # Example
///
/// ```
/// use handwatch::{ChannelSource, DataSource};
/// use handwatch_types::Batch;
///
/// let (tx, mut source) = ChannelSource::create("serial:/dev/ttyUSB0");
/// tx.send(Batch::builder().row(|o| o.sensor(1).reading("temperature", 31.0)).build()).unwrap();
/// assert_eq!(source.fetch().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Batch>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where the batches come from
    pub fn new(receiver: watch::Receiver<Batch>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
        }
    }

    /// Create a channel pair.
    ///
    /// Returns (sender, source). The channel starts out holding an empty
    /// batch.
    pub fn create(source_description: &str) -> (watch::Sender<Batch>, Self) {
        let (tx, rx) = watch::channel(Batch::new());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn fetch(&mut self) -> Result<Batch, FetchError> {
        // Err here means every sender has been dropped
        if self.receiver.has_changed().is_err() {
            return Err(FetchError::Disconnected);
        }
        Ok(self.receiver.borrow_and_update().clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_fetch() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially holds an empty batch
        assert!(source.fetch().unwrap().is_empty());

        tx.send(
            Batch::builder()
                .row(|o| o.sensor(1).reading("temperature", 31.0))
                .row(|o| o.sensor(4).reading("pressure", 9.0))
                .build(),
        )
        .unwrap();

        let batch = source.fetch().unwrap();
        assert_eq!(batch.len(), 2);

        // Unchanged channel hands back the same batch again
        assert_eq!(source.fetch().unwrap(), batch);
    }

    #[test]
    fn test_channel_source_disconnected() {
        let (tx, mut source) = ChannelSource::create("test");
        drop(tx);

        assert!(matches!(source.fetch(), Err(FetchError::Disconnected)));
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("serial:/dev/ttyUSB0");
        assert_eq!(source.description(), "channel: serial:/dev/ttyUSB0");
    }
}

//! Latest-reading resolution and staleness gating.
//!
//! Turns a raw batch (possibly stale, possibly with duplicate or malformed
//! rows) into a consistent [`Snapshot`]: the latest row per sensor, accepted
//! only when the batch carries data strictly newer than the last accepted
//! one.
//!
//! ```text
//! Batch ──▶ drop rows without sensor id ──▶ last-wins per sensor ──▶ candidate
//!                                                                     │
//!             high-water mark > stored mark? ── no ──▶ keep prior (rejected)
//!                                            └─ yes ─▶ store candidate (accepted)
//! ```

use handwatch_types::{Batch, SensorReading, Snapshot};

/// Resolver state carried from one poll cycle to the next.
///
/// Starts as "no data seen". Each dashboard session owns its own state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolverState {
    high_water_mark: Option<u64>,
    snapshot: Snapshot,
}

impl ResolverState {
    /// The initial "no data seen" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// High-water mark of the last accepted batch.
    pub fn high_water_mark(&self) -> Option<u64> {
        self.high_water_mark
    }

    /// Snapshot of the last accepted batch.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Whether any batch has been accepted.
    pub fn has_data(&self) -> bool {
        self.high_water_mark.is_some()
    }
}

/// Result of resolving one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// State to carry into the next cycle.
    pub state: ResolverState,
    /// True when the batch was stale or empty and the prior snapshot was kept.
    pub rejected: bool,
}

impl Resolution {
    /// The snapshot to render for this cycle.
    pub fn snapshot(&self) -> &Snapshot {
        &self.state.snapshot
    }
}

/// Keep the latest row for each identified sensor in the batch.
///
/// Rows with a greater position win; for equal positions the later row in
/// iteration order wins.
pub fn latest_per_sensor(batch: &Batch) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for obs in batch.identified() {
        let Some(id) = obs.sensor_id else {
            continue;
        };
        let newer = snapshot.get(id).is_none_or(|current| obs.position >= current.position);
        if newer {
            snapshot.insert(id, SensorReading::from(obs));
        }
    }
    snapshot
}

/// Resolve a batch against the prior state.
///
/// Pure: performs no I/O and never fails. Malformed rows are filtered, stale
/// or empty batches are rejected by returning `prior` unchanged.
pub fn resolve(batch: &Batch, prior: ResolverState) -> Resolution {
    let Some(mark) = batch.high_water_mark() else {
        return Resolution {
            state: prior,
            rejected: true,
        };
    };

    if prior.high_water_mark.is_some_and(|stored| mark <= stored) {
        return Resolution {
            state: prior,
            rejected: true,
        };
    }

    Resolution {
        state: ResolverState {
            high_water_mark: Some(mark),
            snapshot: latest_per_sensor(batch),
        },
        rejected: false,
    }
}

/// Outcome of feeding one batch to a [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The batch advanced the high-water mark and replaced the snapshot.
    Accepted,
    /// The batch was stale or empty; the prior snapshot is still current.
    Rejected,
}

/// Owns a [`ResolverState`] and applies [`resolve`] in place.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    state: ResolverState,
    accepted: u64,
    rejected: u64,
}

impl Resolver {
    /// Create a resolver in the "no data seen" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a batch and keep the resulting state.
    pub fn apply(&mut self, batch: &Batch) -> Outcome {
        let prior = std::mem::take(&mut self.state);
        let resolution = resolve(batch, prior);
        self.state = resolution.state;
        if resolution.rejected {
            self.rejected += 1;
            Outcome::Rejected
        } else {
            self.accepted += 1;
            Outcome::Accepted
        }
    }

    /// Current state.
    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        self.state.snapshot()
    }

    /// Number of batches accepted so far.
    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    /// Number of batches rejected so far.
    pub fn rejected_count(&self) -> u64 {
        self.rejected
    }
}

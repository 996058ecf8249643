//! Batch - the rows fetched in one poll cycle.

use crate::{Observation, ObservationBuilder};

/// An ordered sequence of observations fetched in one poll cycle.
///
/// Row order must reflect recency; positions are normally increasing but
/// the resolver does not rely on it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Batch {
    /// Observations in source order.
    pub observations: Vec<Observation>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch from observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Create a builder that assigns positions from zero.
    pub fn builder() -> BatchBuilder {
        BatchBuilder::starting_at(0)
    }

    /// Number of rows, valid or not.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if the batch has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Iterate over all rows.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Iterate over rows that carry a valid sensor id.
    pub fn identified(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|o| o.is_identified())
    }

    /// Greatest position among identified rows.
    ///
    /// `None` when no row survives id filtering; such a batch never advances
    /// the resolver.
    pub fn high_water_mark(&self) -> Option<u64> {
        self.identified().map(|o| o.position).max()
    }
}

/// Builder for constructing `Batch` instances with sequential positions.
#[derive(Debug)]
pub struct BatchBuilder {
    next_position: u64,
    observations: Vec<Observation>,
}

impl BatchBuilder {
    /// Start assigning positions at `position`.
    pub fn starting_at(position: u64) -> Self {
        Self {
            next_position: position,
            observations: Vec::new(),
        }
    }

    /// Add a row built with a closure at the next position.
    pub fn row<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ObservationBuilder) -> ObservationBuilder,
    {
        let observation = f(ObservationBuilder::new(self.next_position)).build();
        self.next_position += 1;
        self.observations.push(observation);
        self
    }

    /// Add a pre-built observation. Its position is kept as-is and the
    /// builder continues after it.
    pub fn observation(mut self, observation: Observation) -> Self {
        self.next_position = self.next_position.max(observation.position + 1);
        self.observations.push(observation);
        self
    }

    /// Build the batch.
    pub fn build(self) -> Batch {
        Batch {
            observations: self.observations,
        }
    }
}

//! Sensor identifiers.

use core::fmt;
use core::str::FromStr;

/// Identifier of a physical sensor on the hand.
///
/// Upstream feeds are loose about how they encode ids (`2`, `2.0`, `"2"`),
/// so parsing accepts any of those forms as long as the value is a
/// non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SensorId(u32);

impl SensorId {
    /// Create an id from its numeric value.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The numeric value of this id.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Interpret a floating point value as an id.
    ///
    /// Only finite, integral, non-negative values that fit in a `u32` are
    /// valid; spreadsheet exports frequently turn integer columns into floats.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return None;
        }
        Some(Self(value as u32))
    }
}

impl From<u32> for SensorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid sensor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSensorId(pub String);

impl fmt::Display for InvalidSensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid sensor id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidSensorId {}

impl FromStr for SensorId {
    type Err = InvalidSensorId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<u32>() {
            return Ok(Self(id));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or_else(|| InvalidSensorId(s.to_string()))
    }
}

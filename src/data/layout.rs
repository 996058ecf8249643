//! Hand geometry: where each sensor sits on the rendered hand.
//!
//! Coordinates live in a 10 x 8 plotting area with the wrist at the bottom.
//! Everything is authored for a right hand (palm facing the viewer); the left
//! hand is the mirror image around `x = 5`.

use handwatch_types::SensorId;
use serde::{Deserialize, Serialize};

/// Width of the plotting area; mirroring maps `x` to `PLOT_WIDTH - x`.
pub const PLOT_WIDTH: f64 = 10.0;

/// Height of the plotting area.
pub const PLOT_HEIGHT: f64 = 8.0;

/// Outline of a right hand, wrist -> thumb -> fingers -> pinky -> wrist.
const RIGHT_OUTLINE_X: [f64; 64] = [
    4.50, 4.00, 3.50, 3.00, 2.50, 2.00, 1.50, 1.20, 1.00, 0.90, 0.85, 0.90, 1.10, 1.40, 1.70, 2.00,
    2.30, 2.50, 2.60, 2.70, 2.80, 2.90, 3.05, 3.20, 3.30, 3.40, 3.50, 3.70, 3.80, 3.90, 4.10, 4.30,
    4.50, 4.70, 4.90, 5.00, 5.10, 5.20, 5.40, 5.50, 5.60, 5.80, 6.00, 6.20, 6.40, 6.50, 6.60, 6.80,
    6.90, 7.10, 7.30, 7.50, 7.70, 7.80, 7.85, 7.80, 7.70, 7.50, 7.20, 6.80, 6.20, 5.50, 5.00, 4.50,
];

const OUTLINE_Y: [f64; 64] = [
    0.00, 0.05, 0.15, 0.30, 0.55, 0.90, 1.40, 1.80, 2.50, 3.20, 3.80, 4.20, 4.40, 4.40, 4.20, 3.80,
    3.20, 2.90, 3.50, 5.00, 6.00, 6.80, 7.00, 6.80, 6.00, 5.00, 3.90, 4.50, 6.00, 7.00, 7.50, 7.60,
    7.50, 7.00, 6.00, 5.00, 4.50, 4.10, 4.80, 5.50, 6.20, 6.70, 6.80, 6.70, 6.20, 5.50, 4.50, 3.80,
    4.80, 5.20, 5.40, 5.20, 4.80, 4.20, 3.50, 3.00, 2.20, 1.50, 1.00, 0.60, 0.30, 0.10, 0.05, 0.00,
];

/// Which hand is being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    #[default]
    Right,
}

impl Hand {
    /// The other hand.
    pub fn toggle(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Hand::Left => "Left hand",
            Hand::Right => "Right hand",
        }
    }

    /// Map a right-hand x coordinate onto this hand.
    pub fn map_x(&self, x: f64) -> f64 {
        match self {
            Hand::Left => PLOT_WIDTH - x,
            Hand::Right => x,
        }
    }
}

/// A named sensor position, authored in right-hand coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPoint {
    pub label: String,
    pub sensor_id: SensorId,
    pub x: f64,
    pub y: f64,
}

impl SensorPoint {
    pub fn new(label: impl Into<String>, sensor_id: u32, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            sensor_id: SensorId::new(sensor_id),
            x,
            y,
        }
    }
}

/// Sensor positions plus the hand they are drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLayout {
    pub hand: Hand,
    points: Vec<SensorPoint>,
}

impl Default for HandLayout {
    fn default() -> Self {
        Self::new(Hand::default(), default_points())
    }
}

impl HandLayout {
    pub fn new(hand: Hand, points: Vec<SensorPoint>) -> Self {
        Self { hand, points }
    }

    /// Sensor points as authored (right-hand coordinates).
    pub fn points(&self) -> &[SensorPoint] {
        &self.points
    }

    /// Position of a point on the displayed hand.
    pub fn position(&self, point: &SensorPoint) -> (f64, f64) {
        (self.hand.map_x(point.x), point.y)
    }

    /// Outline vertices for the displayed hand.
    pub fn outline(&self) -> Vec<(f64, f64)> {
        RIGHT_OUTLINE_X
            .iter()
            .zip(OUTLINE_Y.iter())
            .map(|(&x, &y)| (self.hand.map_x(x), y))
            .collect()
    }

    /// Switch to the other hand.
    pub fn toggle_hand(&mut self) {
        self.hand = self.hand.toggle();
    }
}

/// The five fingertip sensors, numbered thumb to pinky.
pub fn default_points() -> Vec<SensorPoint> {
    vec![
        SensorPoint::new("Thumb", 1, 1.5, 3.5),
        SensorPoint::new("Index Tip", 2, 3.0, 6.5),
        SensorPoint::new("Middle Tip", 3, 4.5, 7.0),
        SensorPoint::new("Ring Tip", 4, 6.0, 6.2),
        SensorPoint::new("Pinky Tip", 5, 7.2, 4.5),
    ]
}

//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{LinkStatus, Metric};

/// Blue → pale yellow → red, for temperature.
const TEMPERATURE_STOPS: &[(u8, u8, u8)] = &[(49, 54, 149), (255, 255, 191), (165, 0, 38)];

/// Pale green → deep green, for pressure.
const PRESSURE_STOPS: &[(u8, u8, u8)] = &[(199, 233, 192), (65, 171, 93), (0, 68, 27)];

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for a stale feed.
    pub warning: Color,
    /// Color for an offline source and fetch errors.
    pub critical: Color,
    /// Color for a live feed.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Color for the hand outline.
    pub outline: Color,
    /// Color for sensors without data.
    pub muted: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            outline: Color::White,
            muted: Color::DarkGray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            outline: Color::Black,
            muted: Color::Gray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a link status
    pub fn link_style(&self, status: LinkStatus) -> Style {
        match status {
            LinkStatus::Live => Style::default().fg(self.healthy),
            LinkStatus::Waiting => Style::default().fg(self.muted),
            LinkStatus::Stale => Style::default().fg(self.warning),
            LinkStatus::Offline => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Colour for a metric value already normalized to 0.0..=1.0.
    pub fn metric_color(&self, metric: Metric, normalized: f64) -> Color {
        let stops = match metric {
            Metric::Temperature => TEMPERATURE_STOPS,
            Metric::Pressure => PRESSURE_STOPS,
        };
        gradient(stops, normalized)
    }
}

/// Piecewise-linear interpolation between evenly spaced colour stops.
fn gradient(stops: &[(u8, u8, u8)], t: f64) -> Color {
    let Some(&last) = stops.last() else {
        return Color::Reset;
    };
    if stops.len() == 1 {
        return Color::Rgb(last.0, last.1, last.2);
    }

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (stops.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - index as f64;

    let (a, b) = (stops[index], stops[index + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

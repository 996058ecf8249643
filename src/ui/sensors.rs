//! Sensors view rendering.
//!
//! One row per layout point with both readings, a trend sparkline and rate
//! for the selected metric, and whether the sensor has reported.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{Metric, PointReading};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the trend column in samples.
const TREND_WIDTH: usize = 12;

/// Render the Sensors view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Sensor"),
        Cell::from("ID"),
        Cell::from("Temp"),
        Cell::from("Force"),
        Cell::from("Trend"),
        Cell::from("Rate"),
        Cell::from("State"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = match app.data {
        Some(ref data) => data.points.iter().map(|p| reading_row(app, p)).collect(),
        None => app
            .layout
            .points()
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.label.clone()),
                    Cell::from(p.sensor_id.to_string()),
                    Cell::from("-"),
                    Cell::from("-"),
                    Cell::from(""),
                    Cell::from("-"),
                    Cell::from("waiting").style(Style::default().fg(app.theme.muted)),
                ])
            })
            .collect(),
    };

    let widths = [
        Constraint::Fill(2),                 // Sensor
        Constraint::Length(4),               // ID
        Constraint::Fill(1),                 // Temp
        Constraint::Fill(1),                 // Force
        Constraint::Min(TREND_WIDTH as u16), // Trend
        Constraint::Fill(1),                 // Rate
        Constraint::Min(8),                  // State
    ];

    let count = app.layout.points().len();
    let selected = app.selected_index.min(count.saturating_sub(1));
    let position_info = if count > 0 {
        format!(" [{}/{}]", selected + 1, count)
    } else {
        String::new()
    };
    let title = format!(" Sensors · trend: {}{} ", app.metric.label(), position_info);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn reading_row<'a>(app: &App, point: &'a PointReading) -> Row<'a> {
    let value_cell = |metric: Metric| -> Cell<'a> {
        let scale = app.scales.get(metric);
        match point.value(metric) {
            Some(v) => Cell::from(scale.format(v)).style(
                Style::default().fg(app.theme.metric_color(metric, scale.normalize(v))),
            ),
            None => Cell::from("-").style(Style::default().fg(app.theme.muted)),
        }
    };

    let (trend, rate) = match app.metric {
        Metric::Temperature => (
            app.history.temperature_sparkline(point.sensor_id),
            app.history.temperature_rate(point.sensor_id),
        ),
        Metric::Pressure => (
            app.history.pressure_sparkline(point.sensor_id),
            app.history.pressure_rate(point.sensor_id),
        ),
    };
    let unit = app.scales.get(app.metric).unit;
    let rate = rate
        .map(|r| format!("{:+.2}{}/s", r, unit))
        .unwrap_or_else(|| "-".to_string());

    let state = if point.reported() {
        Cell::from("ok").style(Style::default().fg(app.theme.healthy))
    } else {
        Cell::from("no data").style(Style::default().fg(app.theme.muted).add_modifier(Modifier::DIM))
    };

    Row::new(vec![
        Cell::from(point.label.as_str()),
        Cell::from(point.sensor_id.to_string()),
        value_cell(Metric::Temperature),
        value_cell(Metric::Pressure),
        Cell::from(render_sparkline(&trend)),
        Cell::from(rate),
        state,
    ])
}

fn render_sparkline(data: &[u8]) -> String {
    // Take the most recent values
    let skip = data.len().saturating_sub(TREND_WIDTH);
    data[skip..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

//! Map view rendering.
//!
//! Draws the hand outline on a canvas with each sensor point coloured by the
//! selected metric, next to a colour legend.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::data::layout::{PLOT_HEIGHT, PLOT_WIDTH};

/// Radius of a sensor marker in plot units.
const MARKER_RADIUS: f64 = 0.3;

/// Number of swatches in the legend.
const LEGEND_STEPS: usize = 8;

/// Render the Map view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [canvas_area, legend_area] =
        Layout::horizontal([Constraint::Min(30), Constraint::Length(22)]).areas(area);

    render_canvas(frame, app, canvas_area);
    render_legend(frame, app, legend_area);
}

/// A point ready to draw.
struct Marked {
    x: f64,
    y: f64,
    text: String,
    color: ratatui::style::Color,
    selected: bool,
}

fn markers(app: &App) -> Vec<Marked> {
    let scale = app.scales.get(app.metric);

    match app.data {
        Some(ref data) => data
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let (text, color) = match point.value(app.metric) {
                    Some(v) => (
                        format!("{} {}", point.label, scale.format(v)),
                        app.theme.metric_color(app.metric, scale.normalize(v)),
                    ),
                    None => (format!("{} --", point.label), app.theme.muted),
                };
                Marked {
                    x: point.x,
                    y: point.y,
                    text,
                    color,
                    selected: i == app.selected_index,
                }
            })
            .collect(),
        // Nothing accepted yet: draw the layout without values
        None => app
            .layout
            .points()
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let (x, y) = app.layout.position(point);
                Marked {
                    x,
                    y,
                    text: point.label.clone(),
                    color: app.theme.muted,
                    selected: i == app.selected_index,
                }
            })
            .collect(),
    }
}

fn render_canvas(frame: &mut Frame, app: &App, area: Rect) {
    let outline = app.layout.outline();
    let markers = markers(app);
    let outline_color = app.theme.outline;
    let highlight = app.theme.highlight;

    let title = format!(" {} · {} ", app.layout.hand.label(), app.metric.label());

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, PLOT_WIDTH])
        .y_bounds([0.0, PLOT_HEIGHT])
        .paint(move |ctx| {
            for pair in outline.windows(2) {
                ctx.draw(&CanvasLine::new(
                    pair[0].0,
                    pair[0].1,
                    pair[1].0,
                    pair[1].1,
                    outline_color,
                ));
            }
            ctx.layer();

            for marker in &markers {
                ctx.draw(&Circle {
                    x: marker.x,
                    y: marker.y,
                    radius: MARKER_RADIUS,
                    color: marker.color,
                });
                ctx.draw(&Points {
                    coords: &[(marker.x, marker.y)],
                    color: marker.color,
                });
                if marker.selected {
                    ctx.draw(&Circle {
                        x: marker.x,
                        y: marker.y,
                        radius: MARKER_RADIUS * 1.8,
                        color: highlight,
                    });
                }
            }
            ctx.layer();

            for marker in &markers {
                let style = if marker.selected {
                    Style::default().fg(marker.color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(marker.color)
                };
                ctx.print(
                    marker.x + MARKER_RADIUS * 1.5,
                    marker.y,
                    Line::styled(marker.text.clone(), style),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let scale = app.scales.get(app.metric);

    let mut lines = vec![
        Line::from(Span::styled(app.metric.label(), app.theme.header)),
        Line::from(""),
    ];

    // Highest value on top
    for step in (0..LEGEND_STEPS).rev() {
        let t = step as f64 / (LEGEND_STEPS - 1) as f64;
        let value = scale.min + t * (scale.max - scale.min);
        lines.push(Line::from(vec![
            Span::styled("██ ", Style::default().fg(app.theme.metric_color(app.metric, t))),
            Span::raw(scale.format(value)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("██ ", Style::default().fg(app.theme.muted)),
        Span::raw("no data"),
    ]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Scale ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Metric, Thresholds};
    use crate::source::ChannelSource;
    use handwatch_types::Batch;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| render(frame, app, frame.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn labels_show_values_for_selected_metric() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), Thresholds::default());
        tx.send(
            Batch::builder()
                .row(|o| o.sensor(1).reading("temperature", 34.2).reading("pressure", 7.5))
                .build(),
        )
        .unwrap();
        app.reload_data().unwrap();

        let text = screen(&app);
        assert!(text.contains("Thumb 34.2°C"), "{}", text);
        assert!(text.contains("Pinky Tip --"), "{}", text);

        app.metric = Metric::Pressure;
        let text = screen(&app);
        assert!(text.contains("Thumb 7.5N"), "{}", text);
    }

    #[test]
    fn renders_layout_before_first_batch() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), Thresholds::default());

        let text = screen(&app);
        assert!(text.contains("Middle Tip"), "{}", text);
        assert!(text.contains("no data"), "{}", text);
    }
}

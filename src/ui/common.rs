//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_age;

/// Render the header bar with the feed overview.
///
/// Displays: link status, average temperature with delta, average force,
/// sensors reporting.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.link_status();
    let status_span = Span::styled(
        format!(" ● {} ", status.symbol()),
        app.theme.link_style(status),
    );
    let title = Span::styled(
        format!("HANDWATCH {} ", app.layout.hand.label().to_uppercase()),
        Style::default().add_modifier(Modifier::BOLD),
    );

    let Some(ref data) = app.data else {
        let line = Line::from(vec![status_span, title, Span::raw("│ Waiting for data...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let temperature = match (data.avg_temperature, data.temperature_delta(app.baseline_temperature)) {
        (Some(avg), Some(delta)) => format!(
            "{} ({:+.1})",
            app.scales.temperature.format(avg),
            delta
        ),
        _ => "-".to_string(),
    };
    let pressure = data
        .avg_pressure
        .map(|p| app.scales.pressure.format(p))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        status_span,
        title,
        Span::raw("│ Temp "),
        Span::styled(temperature, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ Force "),
        Span::styled(pressure, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::styled(
            format!("{}/{}", data.points_reporting(), data.points.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" sensors reporting"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Map "), Line::from(" 2:Sensors ")];

    let selected = match app.current_view {
        View::Map => 0,
        View::Sensors => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last update, source, available controls. A fetch error
/// or an offline source replaces the line with a banner while the last good
/// data stays on screen.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(banner) = app.banner() {
        let suffix = if app.data.is_some() {
            " | showing last good data"
        } else {
            ""
        };
        let paragraph = Paragraph::new(format!(" ⚠ {}{} | r:retry q:quit", banner, suffix))
            .style(Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Map => "t:metric h:hand Tab:switch ?:help q:quit",
        View::Sensors => "↑↓:select t:metric Tab:switch ?:help q:quit",
    };

    let status = match app.time_since_update() {
        Some(age) => format!(
            " {} | Updated {} ago | {}",
            app.source_description(),
            format_age(age),
            controls,
        ),
        None => format!(" {} | Waiting for data... | {}", app.source_description(), controls),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab 1/2     Switch views"),
        Line::from("  ↑/↓ j/k     Select sensor"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Display",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  t         Temperature / force"),
        Line::from("  h         Left / right hand"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Fetch now"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

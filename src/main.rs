use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Frame, Terminal,
};
use tracing::info;

use handwatch::app::{App, View};
use handwatch::settings::{Settings, SourceKind};
use handwatch::ui::Theme;
use handwatch::{events, logging, ui, Hand};

/// Upper bound on how long the loop waits for input, so the age shown in
/// the status bar keeps moving between fetches.
const MAX_EVENT_WAIT: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "handwatch", version)]
#[command(about = "Live terminal dashboard for hand-mounted temperature and pressure sensors")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read rows from a JSON file
    #[arg(short, long, conflicts_with_all = ["url", "simulate"])]
    file: Option<PathBuf>,

    /// Poll an HTTP endpoint returning JSON rows
    #[arg(short, long, conflicts_with_all = ["file", "simulate"])]
    url: Option<String>,

    /// Generate readings instead of reading a feed
    #[arg(long, conflicts_with_all = ["file", "url"])]
    simulate: bool,

    /// Seed for generated readings
    #[arg(long)]
    seed: Option<u64>,

    /// Refresh interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// HTTP request timeout (e.g., "5s")
    #[arg(long)]
    timeout: Option<String>,

    /// Time without new data before the feed is shown as stale
    #[arg(long)]
    stale_after: Option<String>,

    /// Time without new data before the source is shown as offline
    #[arg(long)]
    offline_after: Option<String>,

    /// Which hand to draw
    #[arg(long, value_enum)]
    hand: Option<Hand>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Command-line flags win over the file and the environment.
    fn apply(self, settings: &mut Settings) {
        if let Some(path) = self.file {
            settings.source.kind = SourceKind::File;
            settings.source.path = Some(path);
        }
        if let Some(url) = self.url {
            settings.source.kind = SourceKind::Http;
            settings.source.url = Some(url);
        }
        if self.simulate {
            settings.source.kind = SourceKind::Simulated;
        }
        if let Some(seed) = self.seed {
            settings.source.seed = Some(seed);
        }
        if let Some(refresh) = self.refresh {
            settings.refresh = refresh;
        }
        if let Some(timeout) = self.timeout {
            settings.source.timeout = timeout;
        }
        if let Some(stale_after) = self.stale_after {
            settings.thresholds.stale_after = stale_after;
        }
        if let Some(offline_after) = self.offline_after {
            settings.thresholds.offline_after = offline_after;
        }
        if let Some(hand) = self.hand {
            settings.hand = hand;
        }
        if let Some(log_file) = self.log_file {
            settings.log.file = Some(log_file);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    if let Some(ref path) = settings.log.file {
        logging::init_file_logging(path, &settings.log.level)?;
    }

    let app = App::from_settings(&settings)
        .context("Failed to start dashboard")?
        .with_theme(Theme::auto_detect());

    info!(source = app.source_description(), "starting dashboard");
    run_tui(app)
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        // Fetch when the refresh interval has elapsed (immediately on the first pass)
        app.tick();

        terminal.draw(|frame| draw(frame, app))?;

        // Wait for input until the next fetch is due
        let timeout = app.until_next_tick().min(MAX_EVENT_WAIT);
        if let Some(event) = events::poll_event(timeout)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Terminal will redraw on next iteration
                _ => {}
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = ratatui::widgets::Paragraph::new(msg)
            .alignment(ratatui::layout::Alignment::Center)
            .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
        let centered =
            ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(12),   // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    ui::common::render_header(frame, app, chunks[0]);
    ui::common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Map => ui::map::render(frame, app, chunks[2]),
        View::Sensors => ui::sensors::render(frame, app, chunks[2]),
    }

    ui::common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        ui::common::render_help(frame, app, area);
    }
}

//! Application state and navigation logic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock, Ticker};
use crate::data::{
    DashboardData, HandLayout, History, LinkStatus, Metric, Outcome, Resolver, Thresholds,
};
use crate::settings::Settings;
use crate::source::{DataSource, FetchError};
use crate::ui::{Scales, Theme};

/// Default poll interval.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(1);

/// Reference temperature for the header delta (°C).
pub const DEFAULT_BASELINE_TEMPERATURE: f64 = 33.0;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Hand outline with colour-coded sensor points.
    Map,
    /// Table of every sensor with trends.
    Sensors,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Map => View::Sensors,
            View::Sensors => View::Map,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: previous and next coincide
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Map => "Map",
            View::Sensors => "Sensors",
        }
    }
}

/// Main application state.
///
/// One `App` is one dashboard session: it owns its data source and its own
/// [`Resolver`], so two sessions never share a high-water mark.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub metric: Metric,

    // Data source
    source: Box<dyn DataSource>,
    resolver: Resolver,
    pub data: Option<DashboardData>,
    pub history: History,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,
    last_accepted: Option<Instant>,

    // Layout and presentation
    pub layout: HandLayout,
    pub scales: Scales,
    pub baseline_temperature: f64,
    pub theme: Theme,

    // Timing
    clock: Arc<dyn Clock>,
    ticker: Ticker,

    // Navigation state
    pub selected_index: usize,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and thresholds.
    ///
    /// Uses the default hand layout, scales and dark theme; the `with_*`
    /// methods override them.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds) -> Self {
        Self {
            running: true,
            current_view: View::Map,
            show_help: false,
            metric: Metric::default(),
            source,
            resolver: Resolver::new(),
            data: None,
            history: History::new(),
            load_error: None,
            thresholds,
            last_accepted: None,
            layout: HandLayout::default(),
            scales: Scales::default(),
            baseline_temperature: DEFAULT_BASELINE_TEMPERATURE,
            theme: Theme::default(),
            clock: Arc::new(SystemClock),
            ticker: Ticker::new(DEFAULT_REFRESH),
            selected_index: 0,
            status_message: None,
        }
    }

    /// Build a session from settings: source, thresholds, layout, scales,
    /// baseline and refresh interval.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let app = Self::new(settings.build_source()?, settings.thresholds()?)
            .with_layout(settings.layout())
            .with_scales(settings.scales())
            .with_baseline_temperature(settings.baseline_temperature)
            .with_refresh(settings.refresh_interval()?);
        Ok(app)
    }

    pub fn with_layout(mut self, layout: HandLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_scales(mut self, scales: Scales) -> Self {
        self.scales = scales;
        self
    }

    pub fn with_baseline_temperature(mut self, baseline: f64) -> Self {
        self.baseline_temperature = baseline;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the poll interval.
    pub fn with_refresh(mut self, interval: Duration) -> Self {
        self.ticker = Ticker::new(interval);
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The session's resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, self.clock.now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if self.clock.now().saturating_duration_since(*time) < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Fetch if the poll interval has elapsed.
    ///
    /// Returns true if a fetch was attempted.
    pub fn tick(&mut self) -> bool {
        if !self.ticker.due(self.clock.now()) {
            return false;
        }
        // Failures are recorded in load_error for the status bar
        let _ = self.reload_data();
        true
    }

    /// Time until the next scheduled fetch.
    pub fn until_next_tick(&self) -> Duration {
        self.ticker.remaining(self.clock.now())
    }

    /// Fetch one batch and run it through the resolver.
    ///
    /// A fetch failure is recorded in `load_error` and returned; the last
    /// accepted data stays on screen. A stale batch is not an error.
    pub fn reload_data(&mut self) -> Result<Outcome, FetchError> {
        let batch = match self.source.fetch() {
            Ok(batch) => batch,
            Err(e) => {
                warn!(source = self.source.description(), error = %e, "fetch failed");
                self.load_error = Some(e.to_string());
                return Err(e);
            }
        };
        self.load_error = None;

        let outcome = self.resolver.apply(&batch);
        match outcome {
            Outcome::Accepted => {
                let now = self.clock.now();
                let data = DashboardData::from_snapshot(
                    self.resolver.snapshot(),
                    &self.layout,
                    self.resolver.state().high_water_mark(),
                    now,
                );
                debug!(
                    rows = batch.len(),
                    high_water_mark = ?data.high_water_mark,
                    sensors = data.sensors_reporting,
                    "batch accepted"
                );
                self.history.record(&data);
                self.data = Some(data);
                self.last_accepted = Some(now);
                self.clamp_selection();
            }
            Outcome::Rejected => {
                debug!(
                    rows = batch.len(),
                    stored = ?self.resolver.state().high_water_mark(),
                    "batch rejected as stale"
                );
            }
        }
        Ok(outcome)
    }

    /// Time since the last accepted batch.
    pub fn time_since_update(&self) -> Option<Duration> {
        self.last_accepted
            .map(|t| self.clock.now().saturating_duration_since(t))
    }

    /// Liveness of the source.
    pub fn link_status(&self) -> LinkStatus {
        LinkStatus::from_age(self.time_since_update(), &self.thresholds)
    }

    /// Non-fatal problem to show in the status bar, if any.
    pub fn banner(&self) -> Option<String> {
        if let Some(ref err) = self.load_error {
            return Some(format!("Fetch failed: {}", err));
        }
        if self.link_status() == LinkStatus::Offline {
            return Some(format!(
                "No new data for {}",
                crate::data::duration::format_age(self.time_since_update().unwrap_or_default())
            ));
        }
        None
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Switch between temperature and force colouring.
    pub fn toggle_metric(&mut self) {
        self.metric = self.metric.toggle();
        self.set_status_message(format!("Showing {}", self.metric.label().to_lowercase()));
    }

    /// Mirror the layout onto the other hand.
    ///
    /// Re-lays the current snapshot out without touching the resolver or
    /// the history.
    pub fn toggle_hand(&mut self) {
        self.layout.toggle_hand();
        if let Some(ref data) = self.data {
            let relaid = DashboardData::from_snapshot(
                self.resolver.snapshot(),
                &self.layout,
                data.high_water_mark,
                data.last_updated,
            );
            self.data = Some(relaid);
        }
        info!(hand = self.layout.hand.label(), "hand toggled");
        self.set_status_message(format!("Showing {}", self.layout.hand.label().to_lowercase()));
    }

    /// Fetch immediately, reporting the result in the status bar.
    pub fn refresh_now(&mut self) {
        let message = match self.reload_data() {
            Ok(Outcome::Accepted) => "Updated".to_string(),
            Ok(Outcome::Rejected) => "No new data".to_string(),
            Err(e) => format!("Fetch failed: {}", e),
        };
        self.set_status_message(message);
    }

    /// Move selection down by one sensor.
    pub fn select_next(&mut self) {
        let max = self.layout.points().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    /// Move selection up by one sensor.
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.layout.points().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::data::Hand;
    use crate::source::ChannelSource;
    use handwatch_types::{Batch, SensorId};
    use tokio::sync::watch;

    fn app_with_channel() -> (watch::Sender<Batch>, ManualClock, App) {
        let (tx, source) = ChannelSource::create("test");
        let clock = ManualClock::new();
        let app = App::new(Box::new(source), Thresholds::default())
            .with_clock(Arc::new(clock.clone()));
        (tx, clock, app)
    }

    fn batch(start: u64, temperature: f64) -> Batch {
        handwatch_types::BatchBuilder::starting_at(start)
            .row(|o| o.sensor(1).reading("temperature", temperature))
            .row(|o| o.sensor(4).reading("pressure", 12.0))
            .build()
    }

    #[test]
    fn test_initial_state_is_waiting() {
        let (_tx, _clock, mut app) = app_with_channel();
        assert_eq!(app.link_status(), LinkStatus::Waiting);

        // The channel starts empty, which is not new data
        assert_eq!(app.reload_data().unwrap(), Outcome::Rejected);
        assert!(app.data.is_none());
        assert_eq!(app.link_status(), LinkStatus::Waiting);
        assert!(app.banner().is_none());
    }

    #[test]
    fn test_accepted_batch_updates_data_and_history() {
        let (tx, _clock, mut app) = app_with_channel();
        tx.send(batch(0, 31.0)).unwrap();

        assert_eq!(app.reload_data().unwrap(), Outcome::Accepted);
        let data = app.data.as_ref().unwrap();
        assert_eq!(data.points[0].temperature, 31.0);
        assert_eq!(data.points[3].pressure, 12.0);
        assert_eq!(data.high_water_mark, Some(1));
        assert_eq!(app.history.temperature[&SensorId::new(1)].len(), 1);
        assert_eq!(app.link_status(), LinkStatus::Live);
    }

    #[test]
    fn test_stale_batch_keeps_previous_data() {
        let (tx, clock, mut app) = app_with_channel();
        tx.send(batch(0, 31.0)).unwrap();
        app.reload_data().unwrap();

        clock.advance(Duration::from_secs(2));
        // Same extent, different values: rejected
        tx.send(batch(0, 99.0)).unwrap();
        assert_eq!(app.reload_data().unwrap(), Outcome::Rejected);
        assert_eq!(app.data.as_ref().unwrap().points[0].temperature, 31.0);
        assert_eq!(app.history.temperature[&SensorId::new(1)].len(), 1);
        assert_eq!(app.resolver().rejected_count(), 1);
    }

    #[test]
    fn test_link_goes_stale_then_offline_without_new_data() {
        let (tx, clock, mut app) = app_with_channel();
        tx.send(batch(0, 31.0)).unwrap();
        app.reload_data().unwrap();

        clock.advance(Duration::from_secs(6));
        app.reload_data().unwrap();
        assert_eq!(app.link_status(), LinkStatus::Stale);
        assert!(app.banner().is_none());

        clock.advance(Duration::from_secs(30));
        assert_eq!(app.link_status(), LinkStatus::Offline);
        assert!(app.banner().unwrap().starts_with("No new data"));

        tx.send(batch(2, 32.0)).unwrap();
        app.reload_data().unwrap();
        assert_eq!(app.link_status(), LinkStatus::Live);
    }

    #[test]
    fn test_fetch_failure_keeps_ghost_data() {
        let (tx, _clock, mut app) = app_with_channel();
        tx.send(batch(0, 31.0)).unwrap();
        app.reload_data().unwrap();
        drop(tx);

        assert!(matches!(app.reload_data(), Err(FetchError::Disconnected)));
        assert_eq!(app.load_error.as_deref(), Some("Source disconnected"));
        assert_eq!(app.data.as_ref().unwrap().points[0].temperature, 31.0);
        assert_eq!(app.banner().unwrap(), "Fetch failed: Source disconnected");
    }

    #[test]
    fn test_tick_follows_refresh_interval() {
        let (tx, clock, app) = app_with_channel();
        let mut app = app.with_refresh(Duration::from_secs(1));
        tx.send(batch(0, 31.0)).unwrap();

        assert!(app.tick());
        assert!(!app.tick());
        assert_eq!(app.until_next_tick(), Duration::from_secs(1));

        clock.advance(Duration::from_millis(400));
        assert!(!app.tick());
        assert_eq!(app.until_next_tick(), Duration::from_millis(600));

        clock.advance(Duration::from_millis(600));
        assert!(app.tick());
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let (tx_a, _clock_a, mut a) = app_with_channel();
        let (tx_b, _clock_b, mut b) = app_with_channel();

        tx_a.send(batch(10, 31.0)).unwrap();
        a.reload_data().unwrap();

        // A lower mark is still new for a separate session
        tx_b.send(batch(0, 29.0)).unwrap();
        assert_eq!(b.reload_data().unwrap(), Outcome::Accepted);
        assert_eq!(a.resolver().state().high_water_mark(), Some(11));
        assert_eq!(b.resolver().state().high_water_mark(), Some(1));
    }

    #[test]
    fn test_toggle_hand_relays_points() {
        let (tx, _clock, mut app) = app_with_channel();
        tx.send(batch(0, 31.0)).unwrap();
        app.reload_data().unwrap();
        let right_x = app.data.as_ref().unwrap().points[0].x;

        app.toggle_hand();
        assert_eq!(app.layout.hand, Hand::Left);
        let data = app.data.as_ref().unwrap();
        assert_eq!(data.points[0].x, 10.0 - right_x);
        assert_eq!(data.points[0].temperature, 31.0);
        // Re-laying out is not a new sample
        assert_eq!(app.history.temperature[&SensorId::new(1)].len(), 1);
        assert_eq!(app.get_status_message(), Some("Showing left hand"));
    }

    #[test]
    fn test_status_message_expires() {
        let (_tx, clock, mut app) = app_with_channel();
        app.toggle_metric();
        assert_eq!(app.metric, Metric::Pressure);
        assert_eq!(app.get_status_message(), Some("Showing force"));

        clock.advance(Duration::from_secs(3));
        assert_eq!(app.get_status_message(), None);
    }

    #[test]
    fn test_refresh_now_reports_outcome() {
        let (tx, _clock, mut app) = app_with_channel();
        tx.send(batch(0, 31.0)).unwrap();
        app.refresh_now();
        assert_eq!(app.get_status_message(), Some("Updated"));
        app.refresh_now();
        assert_eq!(app.get_status_message(), Some("No new data"));
    }

    #[test]
    fn test_selection_is_bounded() {
        let (_tx, _clock, mut app) = app_with_channel();
        app.select_prev();
        assert_eq!(app.selected_index, 0);
        for _ in 0..10 {
            app.select_next();
        }
        assert_eq!(app.selected_index, 4);
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.source.seed = Some(11);
        settings.hand = Hand::Left;
        settings.scales.pressure.max = 20.0;
        settings.baseline_temperature = 32.0;

        let mut app = App::from_settings(&settings).unwrap();
        assert_eq!(app.layout.hand, Hand::Left);
        assert_eq!(app.scales.pressure.max, 20.0);
        assert_eq!(app.baseline_temperature, 32.0);
        assert_eq!(app.source_description(), "simulated (seed 11)");
        assert!(app.tick());
        assert_eq!(app.data.as_ref().unwrap().points_reporting(), 5);
    }

    #[test]
    fn test_from_settings_rejects_bad_refresh() {
        let mut settings = Settings::default();
        settings.refresh = "fast".to_string();
        assert!(App::from_settings(&settings).is_err());
    }

    #[test]
    fn test_view_cycling() {
        assert_eq!(View::Map.next(), View::Sensors);
        assert_eq!(View::Sensors.next(), View::Map);
        assert_eq!(View::Map.prev(), View::Sensors);
        assert_eq!(View::Sensors.label(), "Sensors");
    }
}

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame, Terminal,
};
use reflectis::{
    clock::{Clock, SystemClock},
    config::{step_limit, Config, ConfigStore, FileConfigStore},
    limit_monitor::{LimitMonitor, LimitReached},
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session_clock::ClockState,
    ui::{
        frame_layout, overlay::LimitOverlay, settings_panel::SettingsView,
        tracker_card::TimeTrackerCard, CommunitiesList, HeaderBar, KeyHints,
    },
    user::{TrackerSettings, UserProfile, UserSession, UserUpdate},
    TICK_RATE_MS,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    time::Duration,
};

/// mindful usage timer with a daily limit
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Counts the time you spend in a session against a daily limit, resets at midnight, and interrupts you gently when the limit is reached."
)]
pub struct Cli {
    /// daily limit in minutes (overrides the config file)
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u32).range(5..=120))]
    limit: Option<u32>,

    /// start with the session clock paused
    #[clap(long)]
    paused: bool,

    /// path to the config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// tick interval in milliseconds
    #[clap(long, hide = true, default_value_t = TICK_RATE_MS)]
    tick_ms: u64,
}

impl Cli {
    fn overrides(&self) -> LaunchOverrides {
        LaunchOverrides {
            limit: self.limit,
            paused: self.paused,
        }
    }
}

/// Command line settings that only hold for this run and are never saved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOverrides {
    pub limit: Option<u32>,
    pub paused: bool,
}

impl LaunchOverrides {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(limit) = self.limit {
            config.daily_limit_minutes = limit;
        }
        if self.paused {
            config.start_paused = true;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    LimitOverlay,
    Settings,
    LoggedOut,
}

pub type ClockFactory = Box<dyn Fn() -> Box<dyn Clock>>;

pub struct App {
    pub session: UserSession,
    /// Effective settings for this run, overrides included
    pub config: Config,
    pub state: AppState,
    pub settings: SettingsView,
    /// What the store holds
    saved: Config,
    /// A crossing happened while the settings screen was open
    overlay_pending: bool,
    store: Box<dyn ConfigStore>,
    make_clock: ClockFactory,
    limit_tx: Sender<LimitReached>,
    limit_rx: Receiver<LimitReached>,
}

impl App {
    pub fn new(
        saved: Config,
        overrides: LaunchOverrides,
        store: Box<dyn ConfigStore>,
        make_clock: ClockFactory,
    ) -> Self {
        let (limit_tx, limit_rx) = mpsc::channel();
        let config = overrides.apply(saved.clone());
        let mut app = Self {
            session: UserSession::logged_out(),
            settings: settings_view(&config),
            config,
            state: AppState::LoggedOut,
            saved,
            overlay_pending: false,
            store,
            make_clock,
            limit_tx,
            limit_rx,
        };
        app.login(UserProfile::demo());
        app
    }

    pub fn login(&mut self, mut profile: UserProfile) {
        // the configured limit wins over whatever the profile carried
        profile.daily_time_limit = self.config.daily_limit_minutes;
        let tracker_settings = TrackerSettings {
            default_limit_minutes: self.config.daily_limit_minutes,
            initial_state: if self.config.start_paused {
                ClockState::Paused
            } else {
                ClockState::Active
            },
            near_limit_percent: self.config.near_limit_percent,
        };
        let tx = self.limit_tx.clone();
        let monitor = LimitMonitor::with_callback(move |event| {
            let _ = tx.send(*event);
        });
        self.session
            .log_in(profile, tracker_settings, (self.make_clock)(), monitor);
        self.overlay_pending = false;
        self.state = AppState::Dashboard;
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.overlay_pending = false;
        self.state = AppState::LoggedOut;
    }

    fn is_limit_reached(&self) -> bool {
        self.session
            .tracker()
            .is_some_and(|tracker| tracker.is_limit_reached())
    }

    pub fn on_tick(&mut self) {
        if let Some(tracker) = self.session.tracker_mut() {
            tracker.on_tick();
        }
        self.drain_limit_events();
        // midnight or a raised limit clears the condition under the overlay
        if self.state == AppState::LimitOverlay && !self.is_limit_reached() {
            self.state = AppState::Dashboard;
        }
    }

    fn drain_limit_events(&mut self) {
        let mut reached = None;
        while let Ok(event) = self.limit_rx.try_recv() {
            reached = Some(event);
        }
        let Some(event) = reached else {
            return;
        };
        if !self.session.is_authenticated() {
            return;
        }

        if self.config.auto_logout {
            info!(
                "auto logout after reaching {}min",
                event.daily_limit_minutes
            );
            self.logout();
        } else if self.state == AppState::Settings {
            // shown on leaving settings so pending edits survive
            self.overlay_pending = true;
        } else {
            self.state = AppState::LimitOverlay;
        }
    }

    fn leave_settings(&mut self) {
        let pending = std::mem::take(&mut self.overlay_pending);
        self.state = if pending && self.is_limit_reached() {
            AppState::LimitOverlay
        } else {
            AppState::Dashboard
        };
    }

    fn open_settings(&mut self) {
        self.settings = settings_view(&self.config);
        if let Some(tracker) = self.session.tracker() {
            self.settings.daily_limit_minutes = tracker.daily_limit_minutes();
        }
        self.state = AppState::Settings;
    }

    fn save_settings(&mut self) {
        // panel fields only; launch overrides stay out of the file
        let saved = Config {
            daily_limit_minutes: self.settings.daily_limit_minutes,
            time_warnings: self.settings.time_warnings,
            auto_logout: self.settings.auto_logout,
            ..self.saved.clone()
        };

        match self.store.save(&saved) {
            Ok(()) => {
                self.settings.status = Some("Settings saved".to_string());
                self.saved = saved;
            }
            Err(e) => {
                warn!("could not save settings: {e}");
                self.settings.status = Some(format!("Not saved: {e}"));
            }
        }
        // applied for this session even when the file could not be written
        self.config = Config {
            daily_limit_minutes: self.settings.daily_limit_minutes,
            time_warnings: self.settings.time_warnings,
            auto_logout: self.settings.auto_logout,
            ..self.config.clone()
        };
        self.session
            .update_user(UserUpdate::daily_time_limit(self.settings.daily_limit_minutes));
        self.drain_limit_events();
    }

    /// Returns true when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.state {
            AppState::Dashboard => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return true,
                KeyCode::Char(' ') => {
                    if let Some(tracker) = self.session.tracker_mut() {
                        tracker.toggle_session();
                    }
                }
                KeyCode::Char('r') => {
                    if let Some(tracker) = self.session.tracker_mut() {
                        tracker.reset_daily();
                    }
                }
                KeyCode::Char('s') => self.open_settings(),
                KeyCode::Char('l') => self.logout(),
                _ => {}
            },
            AppState::LimitOverlay => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return true,
                KeyCode::Char('a') => self.open_settings(),
                KeyCode::Char('c') => {
                    if let Some(tracker) = self.session.tracker_mut() {
                        tracker.pause_session();
                    }
                    self.state = AppState::Dashboard;
                }
                _ => {}
            },
            AppState::Settings => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Char('b') => self.leave_settings(),
                KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                    self.settings.daily_limit_minutes =
                        step_limit(self.settings.daily_limit_minutes, 1);
                }
                KeyCode::Char('-') | KeyCode::Left => {
                    self.settings.daily_limit_minutes =
                        step_limit(self.settings.daily_limit_minutes, -1);
                }
                KeyCode::Char('w') => self.settings.time_warnings = !self.settings.time_warnings,
                KeyCode::Char('o') => self.settings.auto_logout = !self.settings.auto_logout,
                KeyCode::Char('r') => {
                    if let Some(tracker) = self.session.tracker_mut() {
                        tracker.reset_daily();
                        self.settings.status = Some("Daily counter reset".to_string());
                    }
                }
                KeyCode::Char('s') | KeyCode::Enter => self.save_settings(),
                _ => {}
            },
            AppState::LoggedOut => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return true,
                KeyCode::Char('l') => self.login(UserProfile::demo()),
                _ => {}
            },
        }
        false
    }
}

fn settings_view(config: &Config) -> SettingsView {
    SettingsView {
        daily_limit_minutes: config.daily_limit_minutes,
        time_warnings: config.time_warnings,
        auto_logout: config.auto_logout,
        status: None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = logging::init() {
        eprintln!("logging disabled: {e}");
    }

    let store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let saved = store.load();
    let overrides = cli.overrides();
    info!("starting with {saved:?}, overrides {overrides:?}");

    let mut app = App::new(
        saved,
        overrides,
        Box::new(store),
        Box::new(|| Box::new(SystemClock::new()) as Box<dyn Clock>),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, Duration::from_millis(cli.tick_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick));

    terminal.draw(|f| ui(app, f))?;
    loop {
        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    app.session.logout();
    Ok(())
}

fn hints(state: AppState) -> &'static str {
    match state {
        AppState::Dashboard => "(space) pause/resume  (r)eset today  (s)ettings  (l)og out  (q)uit",
        AppState::LimitOverlay => "(a)djust limit  (c)ontinue anyway  (q)uit",
        AppState::Settings => "(-/+) limit  (w)arnings  aut(o) logout  (r)eset counter  (s)ave  (b)ack",
        AppState::LoggedOut => "(l)og in  (q)uit",
    }
}

fn ui(app: &App, f: &mut Frame) {
    let area = f.area();
    let [header, body, footer] = frame_layout(area);

    let snapshot = app.session.tracker().map(|t| t.snapshot());
    f.render_widget(
        HeaderBar {
            snapshot,
            username: app.session.user().map(|u| u.username.as_str()),
        },
        header,
    );

    match (app.state, snapshot, app.session.user()) {
        (AppState::Settings, _, _) => f.render_widget(&app.settings, body),
        (AppState::Dashboard | AppState::LimitOverlay, Some(snapshot), Some(user)) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(6), Constraint::Min(0)])
                .split(body);
            f.render_widget(
                TimeTrackerCard {
                    snapshot,
                    warnings: app.config.time_warnings,
                },
                chunks[0],
            );
            f.render_widget(
                CommunitiesList {
                    communities: &user.communities,
                },
                chunks[1],
            );
        }
        _ => {
            let message = Paragraph::new("You are logged out. Press (l) to log in.")
                .style(Style::default().add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center);
            f.render_widget(message, body);
        }
    }

    f.render_widget(KeyHints(hints(app.state)), footer);

    if app.state == AppState::LimitOverlay {
        if let Some(snapshot) = snapshot.filter(|s| s.is_limit_reached) {
            f.render_widget(
                LimitOverlay {
                    daily_limit_minutes: snapshot.daily_limit_minutes,
                },
                area,
            );
        }
    }
}

mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use pickr::{
    app_dirs::AppDirs,
    board::Board,
    config::{Config, ConfigStore, FileConfigStore, InputMode},
    input::{
        keys::{KeyAdapter, ReleaseMode},
        touch::MousePointer,
        Surface,
    },
    logging::init_tracing,
    runtime::{
        CrosstermEventSource, FixedTicker, PickrEvent, PickrEventSource, Runner, Ticker,
    },
    Tracker,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 50;

/// multiplayer finger picker: everyone holds a key or a mouse button, one gets chosen
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Everyone holds down a key (or a mouse button). Once nobody new has joined for a moment, one of you is picked at random."
)]
pub struct Cli {
    /// milliseconds everyone has to hold still before a pick is made
    #[clap(short = 'd', long)]
    delay_ms: Option<u64>,

    /// which inputs create contacts
    #[clap(short = 'i', long, value_enum)]
    input: Option<InputMode>,

    /// seed the random pick for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// don't ring the terminal bell when someone is chosen
    #[clap(long)]
    no_bell: bool,

    /// write logs here instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(delay_ms) = self.delay_ms {
            config.decision_delay_ms = delay_ms;
        }
        if let Some(input) = self.input {
            config.input_mode = input;
        }
        if self.no_bell {
            config.bell = false;
        }
        config
    }
}

#[derive(Debug)]
pub struct App {
    pub tracker: Tracker<Board>,
    pub keys: Option<KeyAdapter>,
    pub mouse: Option<MousePointer>,
    pub config: Config,
}

impl App {
    pub fn new(config: Config, seed: Option<u64>, surface: Surface, release: ReleaseMode) -> Self {
        let board = Board::new(config.input_mode.idle_prompt());
        let tracker = match seed {
            Some(seed) => Tracker::seeded(board, config.decision_delay(), seed),
            None => Tracker::new(board, config.decision_delay()),
        };

        let keys = config.input_mode.uses_keys().then(|| match seed {
            Some(seed) => {
                KeyAdapter::with_rng(surface, release, StdRng::seed_from_u64(seed.wrapping_add(1)))
            }
            None => KeyAdapter::new(surface, release),
        });
        let mouse = config.input_mode.uses_mouse().then(MousePointer::new);

        Self {
            tracker,
            keys,
            mouse,
            config,
        }
    }

    pub fn on_key(&mut self, key: &KeyEvent) -> bool {
        match self.keys.as_mut() {
            Some(keys) => keys.handle(&mut self.tracker, key),
            None => false,
        }
    }

    pub fn on_mouse(&mut self, event: &MouseEvent) -> bool {
        match self.mouse.as_mut() {
            Some(mouse) => mouse.handle(&mut self.tracker, event),
            None => false,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if let Some(keys) = self.keys.as_mut() {
            keys.resize(Surface::terminal(width, height));
        }
    }

    pub fn release_mode(&self) -> Option<ReleaseMode> {
        self.keys.as_ref().map(|k| k.mode())
    }

    /// Lets go of keys whose auto-repeat has stopped.
    pub fn expire_keys(&mut self, now: Instant) -> usize {
        match self.keys.as_mut() {
            Some(keys) => keys.expire(&mut self.tracker, now),
            None => 0,
        }
    }

    /// Earliest moment the loop has to wake up: a decision or an inferred key release.
    pub fn next_wakeup(&self) -> Option<Instant> {
        let expiry = self.keys.as_ref().and_then(|k| k.next_expiry());
        [self.tracker.deadline(), expiry].into_iter().flatten().min()
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(err) = init_tracing(&path, "info") {
            eprintln!("pickr: logging disabled: {}", err);
        }
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let release = if config.input_mode.uses_keys() && supports_keyboard_enhancement().unwrap_or(false) {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
        ReleaseMode::Release
    } else {
        ReleaseMode::Inferred
    };
    if config.input_mode.uses_mouse() {
        execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;

    info!(
        input = %config.input_mode,
        delay_ms = config.decision_delay_ms,
        release = ?release,
        "starting pickr"
    );

    let mut app = App::new(
        config.clone(),
        cli.seed,
        Surface::terminal(size.width, size.height),
        release,
    );
    let result = start_tui(&mut terminal, &mut app);

    if config.input_mode.uses_keys() && release == ReleaseMode::Release {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    if config.input_mode.uses_mouse() {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    run(terminal, app, &runner)
}

fn run<B: Backend, E: PickrEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step_until(app.next_wakeup()) {
            PickrEvent::Key(key) => {
                if is_quit(&key) {
                    break;
                }
                app.on_key(&key);
            }
            PickrEvent::Mouse(mouse) => {
                app.on_mouse(&mouse);
            }
            PickrEvent::Resize(width, height) => app.resize(width, height),
            // ticks keep the bounce animation moving
            PickrEvent::Tick => {}
            PickrEvent::Closed => {
                warn!("terminal input closed, shutting down");
                return Err("terminal input closed".into());
            }
        }

        app.expire_keys(Instant::now());
        app.tracker.poll();
        if app.tracker.renderer_mut().take_bell() && app.config.bell {
            ring_bell()?;
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ring_bell() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x07")?;
    stdout.flush()
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crossterm::event::{KeyEventState, MouseButton, MouseEventKind};
    use pickr::{board::Status, runtime::TestEventSource, ContactId, RoundState};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn test_app(input_mode: InputMode) -> App {
        let config = Config {
            decision_delay_ms: 1000,
            input_mode,
            bell: true,
        };
        App::new(config, Some(9), Surface::terminal(80, 24), ReleaseMode::Release)
    }

    fn key(c: char, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["pickr"]);

        assert_eq!(cli.delay_ms, None);
        assert_eq!(cli.input, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.no_bell);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_delay_and_input() {
        let cli = Cli::parse_from(["pickr", "-d", "2500", "-i", "keys"]);
        assert_eq!(cli.delay_ms, Some(2500));
        assert_eq!(cli.input, Some(InputMode::Keys));

        let cli = Cli::parse_from(["pickr", "--delay-ms", "300", "--input", "mouse"]);
        assert_eq!(cli.delay_ms, Some(300));
        assert_eq!(cli.input, Some(InputMode::Mouse));
    }

    #[test]
    fn test_cli_rejects_unknown_input() {
        assert!(Cli::try_parse_from(["pickr", "--input", "joystick"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["pickr", "-d", "400", "--no-bell"]);
        let cfg = cli.apply(Config::default());

        assert_eq!(cfg.decision_delay_ms, 400);
        assert!(!cfg.bell);
        assert_eq!(cfg.input_mode, Config::default().input_mode);
    }

    #[test]
    fn test_cli_keeps_stored_config_without_flags() {
        let stored = Config {
            decision_delay_ms: 1500,
            input_mode: InputMode::Mouse,
            bell: false,
        };
        let cli = Cli::parse_from(["pickr"]);
        assert_eq!(cli.apply(stored.clone()), stored);
    }

    #[test]
    fn test_app_wires_adapters_by_mode() {
        let app = test_app(InputMode::Keys);
        assert!(app.keys.is_some());
        assert!(app.mouse.is_none());

        let app = test_app(InputMode::Mouse);
        assert!(app.keys.is_none());
        assert!(app.mouse.is_some());
        assert_eq!(app.release_mode(), None);

        let app = test_app(InputMode::Both);
        assert!(app.keys.is_some() && app.mouse.is_some());
    }

    #[test]
    fn test_app_key_press_starts_round() {
        let mut app = test_app(InputMode::Keys);
        assert!(app.on_key(&key('a', KeyEventKind::Press)));

        assert_eq!(app.tracker.state(), RoundState::Pending);
        assert_eq!(app.tracker.renderer().status(), Status::HoldStill);
        assert!(app.tracker.contacts().contains(ContactId::Key('a')));
    }

    #[test]
    fn test_app_mouse_ignored_in_keys_mode() {
        let mut app = test_app(InputMode::Keys);
        let down = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert!(!app.on_mouse(&down));
        assert_eq!(app.tracker.state(), RoundState::Idle);
    }

    #[test]
    fn test_app_mouse_contacts() {
        let mut app = test_app(InputMode::Mouse);
        let down = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        let up = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            ..down
        };

        assert!(app.on_mouse(&down));
        assert!(app.tracker.contacts().contains(ContactId::Touch(0)));
        assert!(app.on_mouse(&up));
        assert_eq!(app.tracker.state(), RoundState::Idle);
    }

    #[test]
    fn test_app_release_ends_contact() {
        let mut app = test_app(InputMode::Both);
        app.on_key(&key('b', KeyEventKind::Press));
        app.on_key(&key('b', KeyEventKind::Release));

        assert!(app.tracker.contacts().is_empty());
        assert_eq!(app.tracker.renderer().status(), Status::Prompt);
    }

    #[test]
    fn test_inferred_release_wakes_the_loop() {
        let config = Config {
            decision_delay_ms: 60_000,
            input_mode: InputMode::Keys,
            bell: false,
        };
        let mut app = App::new(
            config,
            Some(2),
            Surface::terminal(80, 24),
            ReleaseMode::Inferred,
        );
        assert_eq!(app.next_wakeup(), None);

        app.on_key(&key('r', KeyEventKind::Press));
        let wakeup = app.next_wakeup().unwrap();
        assert!(wakeup < app.tracker.deadline().unwrap());

        assert_eq!(app.expire_keys(wakeup), 1);
        assert_eq!(app.tracker.state(), RoundState::Idle);
        assert_eq!(app.next_wakeup(), None);
    }

    #[test]
    fn test_loop_stops_when_input_closes() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app(InputMode::Keys);
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        tx.send(PickrEvent::Key(key('a', KeyEventKind::Press))).unwrap();
        drop(tx);

        let err = run(&mut terminal, &mut app, &runner).unwrap_err();
        assert_eq!(err.to_string(), "terminal input closed");
        assert!(app.tracker.contacts().contains(ContactId::Key('a')));
    }

    #[test]
    fn test_loop_quits_on_escape() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app(InputMode::Keys);
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        tx.send(PickrEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
            .unwrap();

        assert!(run(&mut terminal, &mut app, &runner).is_ok());
        drop(tx);
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));

        let esc_release = KeyEvent {
            kind: KeyEventKind::Release,
            ..KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
        };
        assert!(!is_quit(&esc_release));
    }

    #[test]
    fn test_resize_keeps_key_markers_on_screen() {
        let mut app = test_app(InputMode::Keys);
        app.resize(20, 10);
        app.on_key(&key('z', KeyEventKind::Press));

        let p = app
            .tracker
            .contacts()
            .get(ContactId::Key('z'))
            .unwrap()
            .position;
        assert!(p.x >= 6.0 && p.x < 14.0);
        assert!(p.y >= 3.0 && p.y < 7.0);
    }
}

pub mod ui;

use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use typerace::{
    app_dirs::AppDirs,
    artifact::{ArtifactGenerator, CsvArtifactGenerator},
    config::{Config, ConfigStore, FileConfigStore},
    paragraphs::{BuiltinParagraphs, FixedParagraph, ParagraphProvider},
    race::Race,
    report_store::{DiscardSink, Leaderboard, ReportStore, StatisticsSink},
    runtime::{keystroke_from, CrosstermEventSource, FixedTicker, RaceEvent, Runner},
    sound::{Silent, SoundNotifier, TerminalBell},
    Gamemode,
};

const TICK_RATE_MS: u64 = 100;
const LEADERBOARD_SIZE: usize = 10;

/// typing exercise with per-word timing, hardcore mode and a local leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a paragraph as fast and as accurately as you can. Every word is timed, mistakes are pinned to the word they happened in, and hardcore mode ends the run on the first slip."
)]
pub struct Cli {
    /// gamemode to play (defaults to the last one used)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Gamemode>,

    /// custom text to type instead of the built-in paragraphs
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// do not store results or write artifacts
    #[clap(long)]
    no_save: bool,

    /// do not write per-word CSV artifacts
    #[clap(long)]
    no_artifacts: bool,

    /// disable the terminal bell on mistakes
    #[clap(long)]
    mute: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub race: Race,
    pub state: AppState,
    pub leaderboard: Option<Leaderboard>,
    pub db_path: Option<PathBuf>,
    pub config: Config,
    config_store: Option<FileConfigStore>,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self, Box<dyn Error>> {
        let config_store = FileConfigStore::new();
        let mut config = config_store.load();
        if let Some(mode) = cli.mode {
            config.gamemode = mode;
        }

        let provider: Box<dyn ParagraphProvider> = match cli.prompt {
            Some(prompt) => Box::new(FixedParagraph::new(prompt)),
            None => Box::new(BuiltinParagraphs::load()?),
        };

        let save = config.save_results && !cli.no_save;
        let db_path = if save { AppDirs::db_path() } else { None };

        let sink: Box<dyn StatisticsSink> = match &db_path {
            Some(path) => Box::new(ReportStore::open(path)?),
            None => Box::new(DiscardSink::default()),
        };

        let artifacts: Option<Box<dyn ArtifactGenerator>> =
            match (&db_path, AppDirs::artifacts_dir()) {
                (Some(db), Some(out)) if config.artifacts && !cli.no_artifacts => {
                    Some(Box::new(CsvArtifactGenerator::new(db, out)))
                }
                _ => None,
            };

        let sound: Box<dyn SoundNotifier> = if config.sound && !cli.mute {
            Box::new(TerminalBell)
        } else {
            Box::new(Silent)
        };

        let race = Race::start(config.gamemode, provider, sink, artifacts, sound)?;

        Ok(Self {
            race,
            state: AppState::Typing,
            leaderboard: None,
            db_path,
            config,
            config_store: Some(config_store),
        })
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Left => self.restart(),
                KeyCode::Right => self.next_text(),
                KeyCode::Tab => self.cycle_mode(),
                _ => {
                    if let Some(keystroke) = keystroke_from(key) {
                        if self.race.handle_key(keystroke) {
                            self.state = AppState::Results;
                        }
                    }
                }
            },
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Left => self.restart(),
                KeyCode::Char('n') | KeyCode::Right => self.next_text(),
                KeyCode::Char('m') | KeyCode::Tab => self.cycle_mode(),
                KeyCode::Char('l') => self.show_leaderboard(),
                _ => {}
            },
            AppState::Leaderboard => match key.code {
                KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = if self.race.is_finished() {
                        AppState::Results
                    } else {
                        AppState::Typing
                    };
                }
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') => self.next_text(),
                KeyCode::Char('m') | KeyCode::Tab => {
                    self.cycle_mode();
                    self.show_leaderboard();
                }
                _ => {}
            },
        }

        Flow::Continue
    }

    fn restart(&mut self) {
        self.race.restart();
        self.state = AppState::Typing;
    }

    fn next_text(&mut self) {
        if self.race.next_text() {
            self.state = AppState::Typing;
        }
    }

    fn cycle_mode(&mut self) {
        let mode = self.race.mode().next();
        if !self.race.set_mode(mode) {
            return;
        }
        self.state = AppState::Typing;
        self.config.gamemode = mode;
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                warn!(error = %e, "could not save config");
            }
        }
    }

    fn show_leaderboard(&mut self) {
        self.leaderboard = match &self.db_path {
            Some(path) => ReportStore::open(path)
                .and_then(|store| store.leaderboard(self.race.mode(), LEADERBOARD_SIZE))
                .map_err(|e| warn!(error = %e, "could not load leaderboard"))
                .ok(),
            None => None,
        };
        self.state = AppState::Leaderboard;
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("TYPERACE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();
    let mut app = App::new(cli)?;
    info!(mode = %app.race.mode(), "typerace started");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

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

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            RaceEvent::Tick => {
                if app.race.on_tick(Local::now()).is_some() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            RaceEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            RaceEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if app.on_key(key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let screen = ui::screen::current_screen(&app.state);
    screen.render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_app(prompt: &str, mode: Gamemode) -> App {
        let race = Race::start(
            mode,
            Box::new(FixedParagraph::new(prompt)),
            Box::new(DiscardSink::default()),
            None,
            Box::new(Silent),
        )
        .unwrap();

        App {
            race,
            state: AppState::Typing,
            leaderboard: None,
            db_path: None,
            config: Config::default(),
            config_store: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_to_the_end_shows_results() {
        let mut app = test_app("hi", Gamemode::Standard);

        type_str(&mut app, "hi");

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.race.last_report().unwrap().typed_char_count, 2);
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = test_app("hi", Gamemode::Standard);

        assert_eq!(app.on_key(key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
        assert_eq!(app.race.session().state().cursor, 0);
    }

    #[test]
    fn test_results_keys_restart_and_leaderboard() {
        let mut app = test_app("hi", Gamemode::Standard);
        type_str(&mut app, "hi");

        app.on_key(key(KeyCode::Char('l')));
        assert_eq!(app.state, AppState::Leaderboard);
        assert!(app.leaderboard.is_none());

        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Typing);
        assert!(!app.race.is_finished());
    }

    #[test]
    fn test_tab_cycles_mode_without_persisting_in_tests() {
        let mut app = test_app("hi", Gamemode::Standard);

        app.on_key(key(KeyCode::Tab));

        assert_eq!(app.race.mode(), Gamemode::Short);
        assert_eq!(app.config.gamemode, Gamemode::Short);
    }

    #[test]
    fn test_hardcore_mistake_shows_results() {
        let mut app = test_app("abc", Gamemode::Hardcore);

        type_str(&mut app, "x");

        assert_eq!(app.state, AppState::Results);
    }
}

mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use typometer::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::SessionError,
    language::{EmbeddedWordSupplier, FallbackSupplier, HttpWordSupplier, Language, WordSupplier},
    logging,
    runtime::{self, AppEvent, CrosstermEventSource, FixedTicker, Runner},
    score_log::{CsvScoreStore, ScoreRecord, ScoreStore},
    session::{KeyInput, Session, SessionResult},
};

const TICK_RATE_MS: u64 = 100;

/// timed typing test with live wpm/cpm and a score log
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the passage before the clock runs out. The timer starts on your first keystroke; results are appended to a CSV score log."
)]
pub struct Cli {
    /// language to pull words from
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// number of words to offer in a session
    #[clap(short = 'w', long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    words: Option<usize>,

    /// session length in seconds
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..))]
    seconds: Option<u64>,

    /// custom passage to type instead of random words
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// fetch words from the online word API, falling back to the bundled lists
    #[clap(long)]
    online: bool,

    /// score log location (CSV)
    #[clap(long)]
    scores: Option<PathBuf>,

    /// log file location
    #[clap(long)]
    log_file: Option<PathBuf>,
}

/// Effective settings after merging the command line over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub language: Language,
    pub number_of_words: usize,
    pub duration: Duration,
    pub online: bool,
}

impl Cli {
    fn settings(&self, config: &Config) -> Settings {
        let config = config.clone().sanitized();
        Settings {
            language: self.language.unwrap_or(config.language),
            number_of_words: self.words.unwrap_or(config.number_of_words),
            duration: Duration::from_secs(self.seconds.unwrap_or(config.duration_secs)),
            online: self.online || config.online,
        }
    }

    fn prompt_words(&self) -> Option<Vec<String>> {
        self.prompt
            .as_ref()
            .map(|p| p.split_whitespace().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Unsaved,
    Saved,
    Failed(String),
}

/// What the event loop should do after a key was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyOutcome {
    Continue,
    LanguageChanged,
    Quit,
}

pub struct App {
    pub settings: Settings,
    pub session: Session,
    pub state: AppState,
    pub result: Option<SessionResult>,
    pub save_status: SaveStatus,
    pub last_score: Option<ScoreRecord>,
    pub notice: Option<String>,
    supplier: Box<dyn WordSupplier>,
    scores: Box<dyn ScoreStore>,
}

impl App {
    pub fn new(
        settings: Settings,
        words: Option<Vec<String>>,
        supplier: Box<dyn WordSupplier>,
        scores: Box<dyn ScoreStore>,
    ) -> Result<Self, SessionError> {
        let words = match words {
            Some(words) => words,
            None => supplier.fetch_words(settings.language, settings.number_of_words)?,
        };
        let session = build_session(words, &settings)?;

        let mut app = Self {
            settings,
            session,
            state: AppState::Typing,
            result: None,
            save_status: SaveStatus::Unsaved,
            last_score: None,
            notice: None,
            supplier,
            scores,
        };
        app.refresh_last_score();
        Ok(app)
    }

    /// Replaces the session; `None` draws fresh words from the supplier.
    /// On failure the current session is kept and a notice is shown.
    pub fn reset(&mut self, words: Option<Vec<String>>) -> bool {
        let words = match words {
            Some(words) => Ok(words),
            None => self
                .supplier
                .fetch_words(self.settings.language, self.settings.number_of_words)
                .map_err(SessionError::from),
        };

        match words.and_then(|w| build_session(w, &self.settings)) {
            Ok(session) => {
                self.session = session;
                self.state = AppState::Typing;
                self.result = None;
                self.save_status = SaveStatus::Unsaved;
                self.notice = None;
                self.refresh_last_score();
                true
            }
            Err(e) => {
                log::warn!("could not start a new session: {e}");
                self.notice = Some(format!("could not start a new session: {e}"));
                false
            }
        }
    }

    pub fn retry(&mut self) -> bool {
        let words = self.session.words().to_vec();
        self.reset(Some(words))
    }

    pub fn switch_language(&mut self) -> bool {
        let previous = self.settings.language;
        self.settings.language = previous.next();
        if self.reset(None) {
            true
        } else {
            self.settings.language = previous;
            false
        }
    }

    pub fn handle_input(&mut self, input: KeyInput) {
        if self.state != AppState::Typing {
            return;
        }
        self.session.on_key(input);
        if self.session.has_finished() {
            self.complete();
        }
    }

    /// Returns true when the screen should be redrawn
    pub fn on_tick(&mut self) -> bool {
        if self.state != AppState::Typing || !self.session.has_started() {
            return false;
        }
        self.session.tick();
        if self.session.has_finished() {
            self.complete();
        }
        true
    }

    pub fn save(&mut self) {
        let Some(result) = self.result.as_ref() else {
            return;
        };
        match self.scores.append(result) {
            Ok(()) => {
                self.last_score = Some(ScoreRecord::from(result));
                self.save_status = SaveStatus::Saved;
            }
            Err(e) => {
                log::error!("failed to save score: {e}");
                self.save_status = SaveStatus::Failed(e.to_string());
            }
        }
    }

    fn complete(&mut self) {
        match self.session.finalize() {
            Ok(result) => {
                self.result = Some(result);
                self.state = AppState::Results;
                self.save();
            }
            Err(e) => log::error!("finished session could not be finalized: {e}"),
        }
    }

    fn refresh_last_score(&mut self) {
        self.last_score = match self.scores.last() {
            Ok(record) => record,
            Err(e) => {
                log::warn!("unable to read score log: {e}");
                None
            }
        };
    }
}

fn build_session(words: Vec<String>, settings: &Settings) -> Result<Session, SessionError> {
    Ok(Session::start(words)?
        .with_language(settings.language)
        .with_duration_limit(settings.duration))
}

fn word_supplier(online: bool) -> Box<dyn WordSupplier> {
    if !online {
        return Box::new(EmbeddedWordSupplier);
    }
    match HttpWordSupplier::new() {
        Ok(http) => Box::new(FallbackSupplier::new(http, EmbeddedWordSupplier)),
        Err(e) => {
            log::warn!("online word source unavailable ({e}), using bundled lists");
            Box::new(EmbeddedWordSupplier)
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyOutcome {
    if key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
    {
        return KeyOutcome::Quit;
    }

    match app.state {
        AppState::Typing => match key.code {
            KeyCode::Left => {
                app.retry();
            }
            KeyCode::Right => {
                app.reset(None);
            }
            KeyCode::Tab => {
                if app.switch_language() {
                    return KeyOutcome::LanguageChanged;
                }
            }
            _ => {
                if let Some(input) = runtime::key_input(&key) {
                    app.handle_input(input);
                }
            }
        },
        AppState::Results => match key.code {
            KeyCode::Char('r') | KeyCode::Left => {
                app.retry();
            }
            KeyCode::Char('n') | KeyCode::Right => {
                app.reset(None);
            }
            KeyCode::Char('l') | KeyCode::Tab => {
                if app.switch_language() {
                    return KeyOutcome::LanguageChanged;
                }
            }
            KeyCode::Char('s') => {
                if matches!(app.save_status, SaveStatus::Failed(_)) {
                    app.save();
                }
            }
            _ => {}
        },
    }

    KeyOutcome::Continue
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = logging::init_to_file(&path) {
            eprintln!("unable to open log file {}: {e}", path.display());
        }
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let settings = cli.settings(&config_store.load());
    let scores = cli
        .scores
        .as_ref()
        .map(CsvScoreStore::with_path)
        .unwrap_or_default();

    let mut app = App::new(
        settings.clone(),
        cli.prompt_words(),
        word_supplier(settings.online),
        Box::new(scores),
    )?;

    enable_raw_mode()?;

    with_terminal_restored(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
            start_tui(&mut terminal, &mut app, &config_store)
        },
        restore_terminal,
    )
}

/// Runs `run`, then `restore` whatever the outcome; a `run` error wins
fn with_terminal_restored<T>(
    run: impl FnOnce() -> Result<T, Box<dyn Error>>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T, Box<dyn Error>> {
    let res = run();
    let restored = restore();
    let value = res?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config_store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                match handle_key(app, key) {
                    KeyOutcome::Quit => break,
                    KeyOutcome::LanguageChanged => {
                        let mut config = config_store.load();
                        config.language = app.settings.language;
                        if let Err(e) = config_store.save(&config) {
                            log::warn!("unable to save config: {e}");
                        }
                    }
                    KeyOutcome::Continue => {}
                }
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Closed => {
                log::error!("terminal input closed, exiting");
                break;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

use std::ops::Range;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;
use crate::language::Language;
use crate::metrics;
use crate::time_series::TimeSeries;

pub const DEFAULT_DURATION_LIMIT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running,
    Finished,
}

/// A single keystroke forwarded by the shell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Untyped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Pending,
    Current,
    Correct,
    Incorrect,
}

/// Read-only view of a session, aligned to the target text
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub status: Status,
    pub chars: Vec<CharState>,
    pub words: Vec<WordState>,
    pub typed_len: usize,
    pub correct_chars: usize,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub cpm: f64,
    pub wpm: f64,
}

impl Snapshot {
    /// Index of the word the cursor is in, if any
    pub fn current_word(&self) -> Option<usize> {
        self.words.iter().position(|w| *w == WordState::Current)
    }
}

/// Final metrics of a finished session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionResult {
    pub language: Language,
    pub timestamp: DateTime<Local>,
    pub elapsed: Duration,
    pub correct_chars: usize,
    pub typed_chars: usize,
    pub correct_words: usize,
    pub cpm: f64,
    pub wpm: f64,
    pub accuracy: f64,
}

#[derive(Clone, Copy, Debug)]
struct Completion {
    elapsed: Duration,
    at: DateTime<Local>,
}

/// One timed typing attempt.
///
/// All mutation goes through [`Session::on_key`] and [`Session::tick`]; the
/// timer starts on the first keystroke, not on construction.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    words: Vec<String>,
    target: Vec<char>,
    word_spans: Vec<Range<usize>>,
    typed: Vec<char>,
    status: Status,
    started_at: Option<Instant>,
    completion: Option<Completion>,
    duration_limit: Duration,
    language: Language,
    samples: TimeSeries,
    clock: C,
}

impl Session<SystemClock> {
    pub fn start(words: Vec<String>) -> Result<Self, SessionError> {
        Self::start_with_clock(words, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn start_with_clock(words: Vec<String>, clock: C) -> Result<Self, SessionError> {
        if words.is_empty() {
            return Err(SessionError::InvalidInput("word list is empty".to_string()));
        }
        // empty words would leave doubled separators and zero-width words
        let words: Vec<String> = words.into_iter().filter(|w| !w.is_empty()).collect();
        if words.is_empty() {
            return Err(SessionError::InvalidInput(
                "word list contains only empty words".to_string(),
            ));
        }

        let mut target = Vec::new();
        let mut word_spans = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                target.push(' ');
            }
            let start = target.len();
            target.extend(word.chars());
            word_spans.push(start..target.len());
        }

        log::debug!(
            "new session: {} words, {} chars",
            words.len(),
            target.len()
        );

        Ok(Self {
            words,
            target,
            word_spans,
            typed: Vec::new(),
            status: Status::NotStarted,
            started_at: None,
            completion: None,
            duration_limit: DEFAULT_DURATION_LIMIT,
            language: Language::default(),
            samples: TimeSeries::new(),
            clock,
        })
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_duration_limit(mut self, limit: Duration) -> Self {
        self.duration_limit = limit;
        self
    }

    /// Applies one keystroke and returns the resulting snapshot.
    ///
    /// Input after `Finished` is ignored. A keystroke arriving once the time
    /// limit has already passed closes the session without being applied.
    pub fn on_key(&mut self, input: KeyInput) -> Snapshot {
        if let KeyInput::Char(c) = input {
            if c.is_control() {
                return self.snapshot();
            }
        }

        match self.status {
            Status::Finished => return self.snapshot(),
            Status::NotStarted => {
                self.started_at = Some(self.clock.now());
                self.status = Status::Running;
                log::info!("session started ({})", self.language);
            }
            Status::Running => {
                if self.time_is_up() {
                    self.finish();
                    return self.snapshot();
                }
            }
        }

        match input {
            KeyInput::Char(c) => {
                if self.typed.len() < self.target.len() {
                    self.typed.push(c);
                }
            }
            KeyInput::Backspace => {
                self.typed.pop();
            }
        }

        if self.typed.len() == self.target.len() || self.time_is_up() {
            self.finish();
        } else {
            self.sample();
        }

        self.snapshot()
    }

    /// Periodic check from the shell; may close a running session on timeout
    pub fn tick(&mut self) -> Snapshot {
        if self.status == Status::Running {
            if self.time_is_up() {
                self.finish();
            } else {
                self.sample();
            }
        }
        self.snapshot()
    }

    /// Time since the first keystroke; frozen once finished
    pub fn elapsed(&self) -> Duration {
        match (self.completion, self.started_at) {
            (Some(done), _) => done.elapsed,
            (None, Some(start)) => self.clock.now().saturating_duration_since(start),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.duration_limit.saturating_sub(self.elapsed())
    }

    pub fn snapshot(&self) -> Snapshot {
        let elapsed = self.elapsed().min(self.duration_limit);
        let correct_chars = self.correct_chars();
        let cpm = metrics::cpm(correct_chars, elapsed);

        Snapshot {
            status: self.status,
            chars: self.char_states(),
            words: self.word_states(),
            typed_len: self.typed.len(),
            correct_chars,
            elapsed,
            remaining: self.duration_limit.saturating_sub(elapsed),
            cpm,
            wpm: metrics::wpm_from_cpm(cpm),
        }
    }

    pub fn finalize(&self) -> Result<SessionResult, SessionError> {
        let done = self.completion.ok_or(SessionError::NotFinished)?;
        let correct_chars = self.correct_chars();
        let cpm = metrics::cpm(correct_chars, done.elapsed);
        let correct_words = self
            .word_states()
            .iter()
            .filter(|w| **w == WordState::Correct)
            .count();

        Ok(SessionResult {
            language: self.language,
            timestamp: done.at,
            elapsed: done.elapsed,
            correct_chars,
            typed_chars: self.typed.len(),
            correct_words,
            cpm,
            wpm: metrics::wpm_from_cpm(cpm),
            accuracy: metrics::accuracy(correct_chars, self.typed.len()),
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn has_started(&self) -> bool {
        self.status != Status::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.status == Status::Finished
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_spans(&self) -> &[Range<usize>] {
        &self.word_spans
    }

    pub fn target_chars(&self) -> &[char] {
        &self.target
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn typed_len(&self) -> usize {
        self.typed.len()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn duration_limit(&self) -> Duration {
        self.duration_limit
    }

    pub fn samples(&self) -> &TimeSeries {
        &self.samples
    }

    pub fn correct_chars(&self) -> usize {
        self.typed
            .iter()
            .zip(&self.target)
            .filter(|(typed, expected)| typed == expected)
            .count()
    }

    fn char_states(&self) -> Vec<CharState> {
        self.target
            .iter()
            .enumerate()
            .map(|(i, expected)| match self.typed.get(i) {
                Some(c) if c == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None => CharState::Untyped,
            })
            .collect()
    }

    fn word_states(&self) -> Vec<WordState> {
        let cursor = self.typed.len();
        let last = self.word_spans.len() - 1;

        self.word_spans
            .iter()
            .enumerate()
            .map(|(i, span)| {
                // the last word has no trailing separator to step past
                let passed = if i == last {
                    cursor >= span.end
                } else {
                    cursor > span.end
                };
                if passed {
                    if self.typed[span.clone()] == self.target[span.clone()] {
                        WordState::Correct
                    } else {
                        WordState::Incorrect
                    }
                } else if cursor >= span.start {
                    WordState::Current
                } else {
                    WordState::Pending
                }
            })
            .collect()
    }

    fn time_is_up(&self) -> bool {
        self.elapsed() >= self.duration_limit
    }

    fn sample(&mut self) {
        let elapsed = self.elapsed();
        let wpm = metrics::wpm(self.correct_chars(), elapsed);
        self.samples.record(elapsed.as_secs_f64(), wpm);
    }

    fn finish(&mut self) {
        let elapsed = self.elapsed().min(self.duration_limit);
        self.completion = Some(Completion {
            elapsed,
            at: Local::now(),
        });
        self.status = Status::Finished;

        let wpm = metrics::wpm(self.correct_chars(), elapsed);
        self.samples.close(elapsed.as_secs_f64(), wpm);

        log::info!(
            "session finished after {:.2}s: {}/{} chars correct",
            elapsed.as_secs_f64(),
            self.correct_chars(),
            self.typed.len()
        );
    }
}

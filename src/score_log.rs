use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_dirs::AppDirs;
use crate::error::PersistenceError;
use crate::language::Language;
use crate::metrics::round2;
use crate::session::SessionResult;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the score log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub timestamp: String,
    pub language: String,
    pub wpm: f64,
    pub cpm: f64,
    pub duration: f64,
}

impl ScoreRecord {
    pub fn language(&self) -> Option<Language> {
        Language::from_code(&self.language)
    }
}

impl From<&SessionResult> for ScoreRecord {
    fn from(result: &SessionResult) -> Self {
        Self {
            timestamp: result.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            language: result.language.code().to_string(),
            wpm: round2(result.wpm),
            cpm: round2(result.cpm),
            duration: round2(result.elapsed.as_secs_f64()),
        }
    }
}

/// Append-only record store for finished sessions
pub trait ScoreStore {
    fn append(&self, result: &SessionResult) -> Result<(), PersistenceError>;
    fn last(&self) -> Result<Option<ScoreRecord>, PersistenceError>;
}

/// Score log kept as a flat CSV file
#[derive(Debug, Clone)]
pub struct CsvScoreStore {
    path: PathBuf,
}

impl CsvScoreStore {
    pub fn new() -> Self {
        let path = AppDirs::scores_path().unwrap_or_else(|| PathBuf::from("typometer_scores.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CsvScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for CsvScoreStore {
    fn append(&self, result: &SessionResult) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(ScoreRecord::from(result))?;
        writer.flush()?;

        log::info!("score appended to {}", self.path.display());
        Ok(())
    }

    fn last(&self) -> Result<Option<ScoreRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut last = None;
        for record in reader.deserialize() {
            last = Some(record?);
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Local, TimeZone};
    use std::time::Duration;
    use tempfile::tempdir;

    fn result(language: Language, cpm: f64) -> SessionResult {
        SessionResult {
            language,
            timestamp: Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            elapsed: Duration::from_secs(60),
            correct_chars: cpm as usize,
            typed_chars: cpm as usize,
            correct_words: 0,
            cpm,
            wpm: cpm / 5.0,
            accuracy: 100.0,
        }
    }

    #[test]
    fn test_record_from_result() {
        let mut r = result(Language::Portuguese, 123.456);
        r.elapsed = Duration::from_millis(42_500);
        let record = ScoreRecord::from(&r);

        assert_eq!(record.timestamp, "2025-03-14 09:26:53");
        assert_eq!(record.language, "pt-br");
        assert_eq!(record.language(), Some(Language::Portuguese));
        assert_eq!(record.cpm, 123.46);
        assert_eq!(record.wpm, 24.69);
        assert_eq!(record.duration, 42.5);
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.csv");
        let store = CsvScoreStore::with_path(&path);

        store.append(&result(Language::English, 210.0)).unwrap();
        store.append(&result(Language::Portuguese, 180.0)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,language,wpm,cpm,duration");
        assert_eq!(lines[1], "2025-03-14 09:26:53,en,42.0,210.0,60.0");
        assert!(lines[2].contains(",pt-br,36.0,180.0,"));
    }

    #[test]
    fn test_last_returns_most_recent_row() {
        let dir = tempdir().unwrap();
        let store = CsvScoreStore::with_path(dir.path().join("scores.csv"));

        store.append(&result(Language::English, 100.0)).unwrap();
        store.append(&result(Language::Portuguese, 250.0)).unwrap();

        let last = store.last().unwrap().unwrap();
        assert_eq!(last.language(), Some(Language::Portuguese));
        assert_eq!(last.cpm, 250.0);
        assert_eq!(last.wpm, 50.0);
    }

    #[test]
    fn test_last_on_missing_log_is_none() {
        let dir = tempdir().unwrap();
        let store = CsvScoreStore::with_path(dir.path().join("absent.csv"));

        assert_eq!(store.last().unwrap(), None);
    }

    #[test]
    fn test_append_to_directory_fails() {
        let dir = tempdir().unwrap();
        let store = CsvScoreStore::with_path(dir.path());

        let err = store.append(&result(Language::English, 1.0)).unwrap_err();
        assert_matches!(err, PersistenceError::Io(_));
    }
}

use std::time::Duration;

use reqwest::blocking::Client;

use super::core::{select_words, Language, WordList};
use crate::error::SupplyError;

pub const WORD_API_URL: &str = "https://random-word-api.herokuapp.com/all";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of the words to type in a session
pub trait WordSupplier {
    fn fetch_words(&self, language: Language, count: usize) -> Result<Vec<String>, SupplyError>;
}

/// Word lists compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedWordSupplier;

impl WordSupplier for EmbeddedWordSupplier {
    fn fetch_words(&self, language: Language, count: usize) -> Result<Vec<String>, SupplyError> {
        let list = WordList::load(language)?;
        select_words(&list.words, language, count, &mut rand::thread_rng())
    }
}

/// Fetches the full vocabulary from the random word API and samples it
#[derive(Debug, Clone)]
pub struct HttpWordSupplier {
    client: Client,
    base_url: String,
}

impl HttpWordSupplier {
    pub fn new() -> Result<Self, SupplyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: WORD_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, language: Language) -> String {
        match language.api_param() {
            Some(lang) => format!("{}?lang={lang}", self.base_url),
            None => self.base_url.clone(),
        }
    }
}

impl WordSupplier for HttpWordSupplier {
    fn fetch_words(&self, language: Language, count: usize) -> Result<Vec<String>, SupplyError> {
        let url = self.url(language);
        log::debug!("fetching words from {url}");

        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        let pool: Vec<String> =
            serde_json::from_str(&body).map_err(|e| SupplyError::Malformed(e.to_string()))?;

        log::debug!("received {} words for {language}", pool.len());
        select_words(&pool, language, count, &mut rand::thread_rng())
    }
}

/// Tries `primary`, then `fallback` when the primary fails
pub struct FallbackSupplier<P, F> {
    primary: P,
    fallback: F,
}

impl<P: WordSupplier, F: WordSupplier> FallbackSupplier<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: WordSupplier, F: WordSupplier> WordSupplier for FallbackSupplier<P, F> {
    fn fetch_words(&self, language: Language, count: usize) -> Result<Vec<String>, SupplyError> {
        match self.primary.fetch_words(language, count) {
            Ok(words) => Ok(words),
            Err(e) => {
                log::warn!("unable to load words ({e}), using bundled list");
                self.fallback.fetch_words(language, count)
            }
        }
    }
}

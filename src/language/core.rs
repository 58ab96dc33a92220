use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::from_str;

use crate::error::SupplyError;

static LANG_DIR: Dir = include_dir!("src/lang");

/// Longest word offered in a session
pub const MAX_WORD_LEN: usize = 8;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Portuguese];

    /// Short code written to the score log
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt-br",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }

    /// `lang` query value for the remote word API; English is its default
    pub fn api_param(&self) -> Option<&'static str> {
        match self {
            Language::English => None,
            Language::Portuguese => Some("pt-br"),
        }
    }

    /// The language after this one, wrapping around
    pub fn next(self) -> Self {
        match self {
            Language::English => Language::Portuguese,
            Language::Portuguese => Language::English,
        }
    }

    fn file_name(&self) -> String {
        format!("{self}.json")
    }
}

/// Word list bundled into the binary
#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    pub fn load(language: Language) -> Result<Self, SupplyError> {
        read_word_list(&language.file_name())
    }
}

fn read_word_list(file_name: &str) -> Result<WordList, SupplyError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| SupplyError::UnknownLanguage(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| SupplyError::Malformed(format!("{file_name} is not UTF-8")))?;

    from_str(file_as_str).map_err(|e| SupplyError::Malformed(format!("{file_name}: {e}")))
}

/// Random sample of up to `count` distinct short words from `pool`
pub fn select_words<R: Rng + ?Sized>(
    pool: &[String],
    language: Language,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, SupplyError> {
    let eligible: Vec<&String> = pool
        .iter()
        .filter(|w| !w.is_empty() && w.chars().count() <= MAX_WORD_LEN)
        .collect();

    if eligible.is_empty() || count == 0 {
        return Err(SupplyError::Empty(language));
    }

    Ok(eligible
        .choose_multiple(rng, count)
        .map(|w| (*w).clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_load_english() {
        let list = WordList::load(Language::English).unwrap();

        assert_eq!(list.name, "english");
        assert!(!list.words.is_empty());
        assert_eq!(list.size as usize, list.words.len());
    }

    #[test]
    fn test_load_portuguese() {
        let list = WordList::load(Language::Portuguese).unwrap();

        assert_eq!(list.name, "portuguese");
        assert!(list.words.iter().any(|w| w == "casa"));
    }

    #[test]
    fn test_bundled_words_fit_length_limit() {
        for language in Language::ALL {
            let list = WordList::load(language).unwrap();
            assert!(list
                .words
                .iter()
                .all(|w| w.chars().count() <= MAX_WORD_LEN));
        }
    }

    #[test]
    fn test_read_unknown_word_list() {
        let result = read_word_list("klingon.json");
        assert_matches!(result, Err(SupplyError::UnknownLanguage(_)));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Portuguese.code(), "pt-br");
        assert_eq!(Language::from_code("pt-br"), Some(Language::Portuguese));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::English.api_param(), None);
    }

    #[test]
    fn test_language_display_and_next() {
        assert_eq!(Language::English.to_string(), "english");
        assert_eq!(Language::English.next(), Language::Portuguese);
        assert_eq!(Language::Portuguese.next(), Language::English);
    }

    #[test]
    fn test_select_words_filters_long_words() {
        let mut rng = StdRng::seed_from_u64(7);
        let words = pool(&["short", "extraordinarily", "tiny", ""]);

        let selected = select_words(&words, Language::English, 10, &mut rng).unwrap();

        assert_eq!(selected.len(), 2);
        assert!(selected.contains(&"short".to_string()));
        assert!(selected.contains(&"tiny".to_string()));
    }

    #[test]
    fn test_select_words_counts_chars_not_bytes() {
        let mut rng = StdRng::seed_from_u64(1);
        let words = pool(&["coração", "pão"]);

        let selected = select_words(&words, Language::Portuguese, 2, &mut rng).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_words_samples_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let list = WordList::load(Language::English).unwrap();

        let selected = select_words(&list.words, Language::English, 20, &mut rng).unwrap();
        let mut deduped = selected.clone();
        deduped.sort();
        deduped.dedup();

        assert_eq!(selected.len(), 20);
        assert_eq!(deduped.len(), 20);
    }

    #[test]
    fn test_select_words_empty_pool() {
        let mut rng = StdRng::seed_from_u64(0);
        let words = pool(&["antidisestablishment"]);

        let result = select_words(&words, Language::English, 5, &mut rng);
        assert_matches!(result, Err(SupplyError::Empty(Language::English)));
    }
}

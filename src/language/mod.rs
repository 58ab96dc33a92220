pub mod core;
pub mod supplier;

pub use self::core::{select_words, Language, WordList, MAX_WORD_LEN};
pub use supplier::{EmbeddedWordSupplier, FallbackSupplier, HttpWordSupplier, WordSupplier};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{KeyInput, Session, Status};

    #[test]
    fn test_supplied_words_start_a_session() {
        let words = EmbeddedWordSupplier
            .fetch_words(Language::Portuguese, 5)
            .unwrap();
        let mut session = Session::start(words)
            .unwrap()
            .with_language(Language::Portuguese);

        let snapshot = session.on_key(KeyInput::Char('x'));
        assert_eq!(snapshot.status, Status::Running);
        assert_eq!(session.language(), Language::Portuguese);
    }
}

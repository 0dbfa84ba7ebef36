pub mod chat;
pub mod flashcards;
pub mod notes;
pub mod quiz;

pub use chat::{answer_question, ChatAnswer};
pub use flashcards::{generate_flashcards, Flashcard};
pub use notes::{generate_notes, StudyNotes};
pub use quiz::{generate_quiz, QuizQuestion};

use std::fmt;

/// Characters of source text included in notes and quiz prompts
pub const PROMPT_TEXT_LIMIT: usize = 8000;

/// Upper bound on requested cards or questions
pub const MAX_ITEMS: usize = 50;

/// Prompt-phrasing difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Exact matches of `easy`, `medium` or `hard` are accepted; anything else,
    /// including other casings or a missing value, becomes `Medium`.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some("easy") => Self::Easy,
            Some("hard") => Self::Hard,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested item count: positive values up to [`MAX_ITEMS`], otherwise `default`
pub fn normalize_count(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n > 0 => (n as u64).min(MAX_ITEMS as u64) as usize,
        _ => default,
    }
}

/// First `limit` characters of `text`
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_normalization() {
        assert_eq!(Difficulty::normalize(Some("easy")), Difficulty::Easy);
        assert_eq!(Difficulty::normalize(Some("medium")), Difficulty::Medium);
        assert_eq!(Difficulty::normalize(Some("hard")), Difficulty::Hard);

        assert_eq!(Difficulty::normalize(None), Difficulty::Medium);
        assert_eq!(Difficulty::normalize(Some("")), Difficulty::Medium);
        assert_eq!(Difficulty::normalize(Some("HARD")), Difficulty::Medium);
        assert_eq!(Difficulty::normalize(Some("Easy")), Difficulty::Medium);
        assert_eq!(Difficulty::normalize(Some("extreme")), Difficulty::Medium);
    }

    #[test]
    fn test_normalize_count() {
        assert_eq!(normalize_count(None, 10), 10);
        assert_eq!(normalize_count(Some(0), 10), 10);
        assert_eq!(normalize_count(Some(-3), 5), 5);
        assert_eq!(normalize_count(Some(7), 10), 7);
        assert_eq!(normalize_count(Some(1000), 10), MAX_ITEMS);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 3), "");
    }
}

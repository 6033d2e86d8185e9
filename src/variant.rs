use clap::ValueEnum;

pub const EMBEDDED_QUOTES: &str = include_str!("resources/quotes.tsv");
pub const EMBEDDED_STUDENTS: &str = include_str!("resources/students.tsv");

/// Column holding each student's display name in both sheets.
pub const NAME_FIELD: &str = "Students";

const QUOTE_FEEDBACK_FIELDS: &[&str] = &[NAME_FIELD];

const EPTSDLE_FEEDBACK_FIELDS: &[&str] = &[
    "Gender",
    "After EPTS",
    "Area of Study (EPTS)",
    "Affiliation",
    "Gavin Coolness Score",
    "Start Year",
    "End Year",
];

/// The two games sharing one guessing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GameKind {
    /// Guess which student said a quote
    Quote,
    /// Guess a student from attribute feedback
    Eptsdle,
}

impl GameKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Quote => "QuoteGuesser",
            Self::Eptsdle => "EPTSdle",
        }
    }

    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Quote => "Guess Who Said It",
            Self::Eptsdle => "Guess the EPTS Student",
        }
    }

    #[must_use]
    pub fn tagline(self) -> &'static str {
        match self {
            Self::Quote => "Read the quote and guess which student said it!",
            Self::Eptsdle => "Enter a student's name to guess. Get feedback on various attributes!",
        }
    }

    #[must_use]
    pub fn name_field(self) -> &'static str {
        NAME_FIELD
    }

    /// Column shown to the player as the clue, if the game has one.
    #[must_use]
    pub fn prompt_field(self) -> Option<&'static str> {
        match self {
            Self::Quote => Some("Quote"),
            Self::Eptsdle => None,
        }
    }

    /// Columns compared after every guess, in display order.
    #[must_use]
    pub fn feedback_fields(self) -> &'static [&'static str] {
        match self {
            Self::Quote => QUOTE_FEEDBACK_FIELDS,
            Self::Eptsdle => EPTSDLE_FEEDBACK_FIELDS,
        }
    }

    #[must_use]
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Quote => "Quote.xlsx",
            Self::Eptsdle => "EPTSdle.xlsx",
        }
    }

    #[must_use]
    pub fn embedded_data(self) -> &'static str {
        match self {
            Self::Quote => EMBEDDED_QUOTES,
            Self::Eptsdle => EMBEDDED_STUDENTS,
        }
    }

    #[must_use]
    pub fn win_message(self) -> &'static str {
        match self {
            Self::Quote => "You guessed who said it!",
            Self::Eptsdle => "You guessed the correct student!",
        }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Quote => Self::Eptsdle,
            Self::Eptsdle => Self::Quote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_store_from_str;

    #[test]
    fn test_other_toggles() {
        assert_eq!(GameKind::Quote.other(), GameKind::Eptsdle);
        assert_eq!(GameKind::Eptsdle.other(), GameKind::Quote);
    }

    #[test]
    fn test_embedded_quotes_have_prompt_column() {
        let store = load_store_from_str(GameKind::Quote.embedded_data(), NAME_FIELD, "quotes").unwrap();
        assert!(!store.is_empty());
        assert!(store.records().iter().all(|r| r.get("Quote").is_some()));
    }

    #[test]
    fn test_embedded_students_have_feedback_columns() {
        let store =
            load_store_from_str(GameKind::Eptsdle.embedded_data(), NAME_FIELD, "students").unwrap();
        assert!(store.len() >= 5);
        for record in store.records() {
            for field in GameKind::Eptsdle.feedback_fields() {
                assert!(record.get(field).is_some(), "{} lacks {field}", record.name());
            }
        }
    }
}

use crate::game_state::{DataPaths, GameInterface, UserAction};
use crate::record::Record;
use crate::session::{GuessEntry, SessionError};
use crate::store::{RecordStore, SUGGESTION_LIMIT};
use crate::variant::GameKind;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

/// EPTSdle and QuoteGuesser in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Game to start with
    #[arg(short = 'g', long = "game", value_enum, default_value_t = GameKind::Quote)]
    pub game: GameKind,

    /// Spreadsheet (.xlsx) or tab-separated file with the QuoteGuesser quotes
    #[arg(long = "quotes")]
    pub quotes_path: Option<PathBuf>,

    /// Spreadsheet (.xlsx) or tab-separated file with the EPTSdle students
    #[arg(long = "students")]
    pub students_path: Option<PathBuf>,

    /// Line-based prompts instead of the full-screen interface
    #[arg(long)]
    pub plain: bool,

    /// Seed for target selection, for reproducible rounds
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    #[must_use]
    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            quotes: self.quotes_path.clone(),
            students: self.students_path.clone(),
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

/// One line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandInput {
    Action(UserAction),
    Suggest(String),
    Empty,
}

pub fn parse_command(line: &str) -> CommandInput {
    let line = line.trim();
    if line.is_empty() {
        return CommandInput::Empty;
    }
    // '=' forces a guess, for names that clash with a command
    if let Some(name) = line.strip_prefix('=') {
        let name = name.trim_start();
        if name.is_empty() {
            return CommandInput::Empty;
        }
        return CommandInput::Action(UserAction::Guess(name.to_string()));
    }
    if let Some(partial) = line.strip_prefix('?') {
        return CommandInput::Suggest(partial.trim_start().to_string());
    }
    match line.to_lowercase().as_str() {
        "exit" | "quit" => CommandInput::Action(UserAction::Exit),
        "reset" | "next" => CommandInput::Action(UserAction::Reset),
        "reveal" | "answer" => CommandInput::Action(UserAction::Reveal),
        "switch" => CommandInput::Action(UserAction::SwitchGame),
        _ => CommandInput::Action(UserAction::Guess(line.to_string())),
    }
}

pub fn read_command<R: BufRead>(reader: &mut R) -> CommandInput {
    println!(
        "\nEnter a name to guess ('?text' for suggestions, 'reveal', 'reset', 'switch' or 'exit'):"
    );
    println!("Prefix a name with '=' to guess it literally, e.g. '=reset'.");
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) => CommandInput::Action(UserAction::Exit),
        Ok(_) => parse_command(&input),
        Err(e) => {
            log::warn!("Failed to read input: {e}");
            CommandInput::Action(UserAction::Exit)
        }
    }
}

pub fn display_suggestions(suggestions: &[&str]) {
    if suggestions.is_empty() {
        println!("No matching names.");
        return;
    }
    println!("Suggestions:");
    for name in suggestions {
        println!("  {name}");
    }
}

/// One feedback line per field, e.g. `Start Year: 2022 ✗ (lower)`.
#[must_use]
pub fn format_guess(entry: &GuessEntry) -> Vec<String> {
    entry
        .feedback
        .iter()
        .map(|feedback| {
            let value = feedback
                .guessed
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let mark = if feedback.correct { "✓" } else { "✗" };
            match feedback.hint {
                Some(hint) => format!("{}: {value} {mark} ({hint})", feedback.field),
                None => format!("{}: {value} {mark}", feedback.field),
            }
        })
        .collect()
}

/// Every field of the answer except its name column.
#[must_use]
pub fn format_answer(kind: GameKind, target: &Record) -> Vec<String> {
    target
        .fields()
        .filter(|(field, _)| *field != kind.name_field())
        .map(|(field, value)| format!("{field}: {value}"))
        .collect()
}

pub fn display_round(kind: GameKind, target: &Record, record_count: usize) {
    println!("\n=== {} ===", kind.title());
    println!("{}", kind.tagline());
    println!("Loaded {record_count} students.");
    if let Some(field) = kind.prompt_field()
        && let Some(clue) = target.get(field)
    {
        println!("\n\"{clue}\"");
    }
}

pub fn display_guess(entry: &GuessEntry, guess_count: usize) {
    println!("Guess {guess_count}: {}", entry.record.name());
    for line in format_guess(entry) {
        println!("  {line}");
    }
}

pub fn display_won(kind: GameKind, target: &Record, guess_count: usize) {
    println!("Congratulations! {}", kind.win_message());
    println!("It was {} ({guess_count} guesses). Type 'reset' to play again.", target.name());
}

pub fn display_answer(kind: GameKind, target: &Record) {
    println!("Better luck next time!");
    println!("The answer was {}", target.name());
    for line in format_answer(kind, target) {
        println!("  {line}");
    }
    println!("Type 'reset' to play again.");
}

/// CLI implementation of the GameInterface trait
/// This struct wraps a BufRead reader and implements the game interface for CLI interaction
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_loading(&mut self, kind: GameKind, source: &str) {
        println!("Loading {} from {source}...", kind.title());
    }

    fn display_load_error(&mut self, kind: GameKind, error: &SessionError) {
        println!("{}: {error}", kind.title());
        if let SessionError::Load { detail } = error {
            println!("({detail})");
        }
        println!("Type 'reset' to try again, 'switch' or 'exit'.");
    }

    fn display_round(&mut self, kind: GameKind, target: &Record, record_count: usize) {
        display_round(kind, target, record_count);
    }

    fn read_action(&mut self, store: Option<&RecordStore>) -> Option<UserAction> {
        match read_command(&mut self.reader) {
            CommandInput::Action(action) => Some(action),
            CommandInput::Suggest(partial) => {
                match store {
                    Some(store) => display_suggestions(&store.suggest(&partial, SUGGESTION_LIMIT)),
                    None => println!("No student data loaded."),
                }
                None
            }
            CommandInput::Empty => None,
        }
    }

    fn display_guess(&mut self, _kind: GameKind, entry: &GuessEntry, guess_count: usize) {
        display_guess(entry, guess_count);
    }

    fn display_error(&mut self, error: &SessionError) {
        println!("{error}");
    }

    fn display_won(&mut self, kind: GameKind, target: &Record, guess_count: usize) {
        display_won(kind, target, guess_count);
    }

    fn display_answer(&mut self, kind: GameKind, target: &Record) {
        display_answer(kind, target);
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{FeedbackEntry, Hint};
    use crate::record::Value;
    use std::io::Cursor;

    fn alice() -> Record {
        Record::new(
            "Alice",
            vec![
                ("Students".to_string(), Value::Text("Alice".to_string())),
                ("Gender".to_string(), Value::Text("Female".to_string())),
                ("Start Year".to_string(), Value::Number(2020.0)),
            ],
        )
    }

    #[test]
    fn test_parse_cli_defaults() {
        let cli = Cli::parse_from(["eptsdle"]);
        assert_eq!(cli.game, GameKind::Quote);
        assert_eq!(cli.quotes_path, None);
        assert!(!cli.plain);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_parse_cli_with_options() {
        let cli = Cli::parse_from([
            "eptsdle",
            "--game",
            "eptsdle",
            "--students",
            "/data/EPTSdle.xlsx",
            "--plain",
            "--seed",
            "42",
        ]);
        assert_eq!(cli.game, GameKind::Eptsdle);
        assert!(cli.plain);
        assert_eq!(cli.seed, Some(42));
        let paths = cli.data_paths();
        assert_eq!(paths.students, Some(PathBuf::from("/data/EPTSdle.xlsx")));
        assert_eq!(paths.quotes, None);
    }

    #[test]
    fn test_parse_command_keywords() {
        assert_eq!(parse_command("exit\n"), CommandInput::Action(UserAction::Exit));
        assert_eq!(parse_command("QUIT"), CommandInput::Action(UserAction::Exit));
        assert_eq!(parse_command("next"), CommandInput::Action(UserAction::Reset));
        assert_eq!(parse_command("Reset"), CommandInput::Action(UserAction::Reset));
        assert_eq!(parse_command("answer"), CommandInput::Action(UserAction::Reveal));
        assert_eq!(parse_command("switch"), CommandInput::Action(UserAction::SwitchGame));
    }

    #[test]
    fn test_parse_command_guess_trimmed() {
        assert_eq!(
            parse_command("  Ada Okafor \n"),
            CommandInput::Action(UserAction::Guess("Ada Okafor".to_string()))
        );
    }

    #[test]
    fn test_parse_command_suggest_and_empty() {
        assert_eq!(parse_command("?ada"), CommandInput::Suggest("ada".to_string()));
        assert_eq!(parse_command("? ad"), CommandInput::Suggest("ad".to_string()));
        assert_eq!(parse_command("   \n"), CommandInput::Empty);
    }

    #[test]
    fn test_parse_command_escaped_guess() {
        assert_eq!(
            parse_command("=Reset\n"),
            CommandInput::Action(UserAction::Guess("Reset".to_string()))
        );
        assert_eq!(
            parse_command("= exit"),
            CommandInput::Action(UserAction::Guess("exit".to_string()))
        );
        assert_eq!(
            parse_command("=?Mark"),
            CommandInput::Action(UserAction::Guess("?Mark".to_string()))
        );
        assert_eq!(parse_command("="), CommandInput::Empty);
    }

    #[test]
    fn test_read_command_eof_exits() {
        let mut reader = Cursor::new("");
        assert_eq!(read_command(&mut reader), CommandInput::Action(UserAction::Exit));
    }

    #[test]
    fn test_read_action_suggestion_is_not_an_action() {
        let store = RecordStore::new("Students", "test", vec![alice()]);
        let mut interface = CliInterface::new(Cursor::new("?ali\nAlice\n"));
        assert_eq!(interface.read_action(Some(&store)), None);
        assert_eq!(
            interface.read_action(Some(&store)),
            Some(UserAction::Guess("Alice".to_string()))
        );
        assert_eq!(interface.read_action(None), Some(UserAction::Exit));
    }

    #[test]
    fn test_format_guess() {
        let entry = GuessEntry {
            record: alice(),
            feedback: vec![
                FeedbackEntry {
                    field: "Gender".to_string(),
                    guessed: Some(Value::Text("Female".to_string())),
                    correct: true,
                    hint: None,
                },
                FeedbackEntry {
                    field: "Start Year".to_string(),
                    guessed: Some(Value::Number(2020.0)),
                    correct: false,
                    hint: Some(Hint::Higher),
                },
                FeedbackEntry {
                    field: "Affiliation".to_string(),
                    guessed: None,
                    correct: false,
                    hint: None,
                },
            ],
        };
        assert_eq!(
            format_guess(&entry),
            vec![
                "Gender: Female ✓".to_string(),
                "Start Year: 2020 ✗ (higher)".to_string(),
                "Affiliation: - ✗".to_string(),
            ]
        );
    }

    #[test]
    fn test_format_answer_skips_name() {
        assert_eq!(
            format_answer(GameKind::Eptsdle, &alice()),
            vec!["Gender: Female".to_string(), "Start Year: 2020".to_string()]
        );
    }
}

use crate::loader::{DataSource, LoadTask};
use crate::record::Record;
use crate::session::{GuessEntry, Phase, SessionError, SessionState};
use crate::store::RecordStore;
use crate::variant::GameKind;
use crate::{debug_log, info_log};
use rand::Rng;
use std::path::PathBuf;

/// What the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Guess(String),
    Reveal,
    Reset,
    SwitchGame,
    Exit,
}

/// Data files chosen on the command line, per game.
#[derive(Debug, Clone, Default)]
pub struct DataPaths {
    pub quotes: Option<PathBuf>,
    pub students: Option<PathBuf>,
}

impl DataPaths {
    #[must_use]
    pub fn source_for(&self, kind: GameKind) -> DataSource {
        let explicit = match kind {
            GameKind::Quote => self.quotes.as_deref(),
            GameKind::Eptsdle => self.students.as_deref(),
        };
        DataSource::locate(kind, explicit)
    }
}

/// Front end driven by [`game_loop`].
pub trait GameInterface {
    fn display_loading(&mut self, kind: GameKind, source: &str);
    fn display_load_error(&mut self, kind: GameKind, error: &SessionError);
    /// A new round has a target. Front ends may show its clue, never its name.
    fn display_round(&mut self, kind: GameKind, target: &Record, record_count: usize);
    /// `None` means nothing actionable was entered.
    fn read_action(&mut self, store: Option<&RecordStore>) -> Option<UserAction>;
    fn display_guess(&mut self, kind: GameKind, entry: &GuessEntry, guess_count: usize);
    fn display_error(&mut self, error: &SessionError);
    fn display_won(&mut self, kind: GameKind, target: &Record, guess_count: usize);
    fn display_answer(&mut self, kind: GameKind, target: &Record);
    fn display_exit_message(&mut self);
}

/// How a game loop ended.
#[derive(Debug)]
pub struct GameOutcome {
    pub kind: GameKind,
    pub state: SessionState,
    pub rounds_won: usize,
}

/// Run games until the player exits.
pub fn game_loop<I, R>(interface: &mut I, paths: &DataPaths, kind: GameKind, rng: &mut R) -> GameOutcome
where
    I: GameInterface + ?Sized,
    R: Rng,
{
    let mut kind = kind;
    let mut rounds_won = 0;
    let (mut state, mut store) = load_game(interface, paths, kind, SessionState::new(), rng);

    loop {
        let Some(action) = interface.read_action(store.as_ref()) else {
            continue;
        };
        debug_log!("game_loop() - action {:?} in phase {:?}", action, state.phase());

        match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::SwitchGame => {
                kind = kind.other();
                info_log!("Switching to {}", kind.title());
                (state, store) = load_game(interface, paths, kind, state, rng);
            }
            UserAction::Reset => {
                let reload = match store.as_ref() {
                    Some(records) if state.phase() != Phase::LoadFailed => {
                        state = state.reset(records, rng);
                        if let Some(target) = state.target() {
                            interface.display_round(kind, target, records.len());
                        }
                        false
                    }
                    _ => true,
                };
                if reload {
                    info_log!("Reloading {}", kind.title());
                    (state, store) = load_game(interface, paths, kind, state, rng);
                }
            }
            UserAction::Reveal => {
                state = state.reveal();
                if state.phase() == Phase::Revealed
                    && let Some(target) = state.target()
                {
                    interface.display_answer(kind, target);
                }
            }
            UserAction::Guess(input) => {
                let Some(records) = &store else {
                    interface.display_error(&SessionError::NotReady);
                    continue;
                };
                let before = state.guess_count();
                state = state.clear_error().submit(records, kind, &input);
                if let Some(error) = state.error() {
                    interface.display_error(error);
                    continue;
                }
                if state.guess_count() > before
                    && let Some(entry) = state.latest()
                {
                    interface.display_guess(kind, entry, state.guess_count());
                }
                if state.phase() == Phase::Won
                    && let Some(target) = state.target()
                {
                    rounds_won += 1;
                    interface.display_won(kind, target, state.guess_count());
                }
            }
        }
    }

    GameOutcome {
        kind,
        state,
        rounds_won,
    }
}

/// Load `kind`'s records on a background task and start a round.
fn load_game<I, R>(
    interface: &mut I,
    paths: &DataPaths,
    kind: GameKind,
    state: SessionState,
    rng: &mut R,
) -> (SessionState, Option<RecordStore>)
where
    I: GameInterface + ?Sized,
    R: Rng,
{
    let state = state.begin_load();
    let source = paths.source_for(kind);
    interface.display_loading(kind, &source.label());

    let task = LoadTask::spawn(source, kind.name_field(), state.generation());
    let (generation, result) = task.wait();
    let state = state.finish_load(generation, &result, rng);

    match (state.phase(), result) {
        (Phase::Ready, Ok(store)) => {
            if let Some(target) = state.target() {
                interface.display_round(kind, target, store.len());
            }
            (state, Some(store))
        }
        _ => {
            if let Some(error) = state.error() {
                interface.display_load_error(kind, error);
            }
            (state, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;

    /// Scripted front end that records what it was asked to show.
    #[derive(Default)]
    struct ScriptedInterface {
        actions: VecDeque<UserAction>,
        rounds: Vec<(GameKind, String)>,
        guesses: Vec<String>,
        errors: Vec<SessionError>,
        load_errors: usize,
        won: Vec<usize>,
        answers: Vec<String>,
        exited: bool,
    }

    impl ScriptedInterface {
        fn new(actions: Vec<UserAction>) -> Self {
            Self {
                actions: actions.into(),
                ..Self::default()
            }
        }
    }

    impl GameInterface for ScriptedInterface {
        fn display_loading(&mut self, _kind: GameKind, _source: &str) {}

        fn display_load_error(&mut self, _kind: GameKind, _error: &SessionError) {
            self.load_errors += 1;
        }

        fn display_round(&mut self, kind: GameKind, target: &Record, _record_count: usize) {
            self.rounds.push((kind, target.name().to_string()));
        }

        fn read_action(&mut self, _store: Option<&RecordStore>) -> Option<UserAction> {
            Some(self.actions.pop_front().unwrap_or(UserAction::Exit))
        }

        fn display_guess(&mut self, _kind: GameKind, entry: &GuessEntry, _guess_count: usize) {
            self.guesses.push(entry.record.name().to_string());
        }

        fn display_error(&mut self, error: &SessionError) {
            self.errors.push(error.clone());
        }

        fn display_won(&mut self, _kind: GameKind, _target: &Record, guess_count: usize) {
            self.won.push(guess_count);
        }

        fn display_answer(&mut self, _kind: GameKind, target: &Record) {
            self.answers.push(target.name().to_string());
        }

        fn display_exit_message(&mut self) {
            self.exited = true;
        }
    }

    /// Copies of the built-in data in per-test files.
    fn fixture_paths(tag: &str) -> DataPaths {
        let dir = std::env::temp_dir();
        let quotes = dir.join(format!("eptsdle_{tag}_quotes.tsv"));
        let students = dir.join(format!("eptsdle_{tag}_students.tsv"));
        std::fs::write(&quotes, GameKind::Quote.embedded_data()).unwrap();
        std::fs::write(&students, GameKind::Eptsdle.embedded_data()).unwrap();
        DataPaths {
            quotes: Some(quotes),
            students: Some(students),
        }
    }

    fn first_target(kind: GameKind, seed: u64) -> String {
        let store = DataSource::embedded(kind).load(kind.name_field()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        store.select_target(&mut rng).unwrap().name().to_string()
    }

    #[test]
    fn test_game_loop_immediate_exit() {
        let paths = fixture_paths("exit");
        let mut interface = ScriptedInterface::new(vec![UserAction::Exit]);
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = game_loop(&mut interface, &paths, GameKind::Quote, &mut rng);
        assert!(interface.exited);
        assert_eq!(interface.rounds.len(), 1);
        assert_eq!(outcome.state.phase(), Phase::Ready);
        assert_eq!(outcome.rounds_won, 0);
    }

    #[test]
    fn test_game_loop_win_then_reset() {
        let paths = fixture_paths("win");
        let target = first_target(GameKind::Quote, 21);
        let mut interface = ScriptedInterface::new(vec![
            UserAction::Guess("nobody at all".to_string()),
            UserAction::Guess(target.to_uppercase()),
            UserAction::Reset,
        ]);
        let mut rng = StdRng::seed_from_u64(21);
        let outcome = game_loop(&mut interface, &paths, GameKind::Quote, &mut rng);

        assert_eq!(interface.errors.len(), 1);
        assert!(matches!(interface.errors[0], SessionError::NotFound(_)));
        assert_eq!(interface.guesses, vec![target]);
        assert_eq!(interface.won, vec![1]);
        assert_eq!(interface.rounds.len(), 2);
        assert_eq!(outcome.rounds_won, 1);
        assert_eq!(outcome.state.phase(), Phase::Ready);
        assert!(outcome.state.history().is_empty());
    }

    #[test]
    fn test_game_loop_reveal_then_guess_rejected() {
        let paths = fixture_paths("reveal");
        let target = first_target(GameKind::Eptsdle, 4);
        let mut interface = ScriptedInterface::new(vec![
            UserAction::Reveal,
            UserAction::Guess(target.clone()),
        ]);
        let mut rng = StdRng::seed_from_u64(4);
        let outcome = game_loop(&mut interface, &paths, GameKind::Eptsdle, &mut rng);

        assert_eq!(interface.answers, vec![target]);
        assert_eq!(interface.errors, vec![SessionError::GameOver]);
        assert_eq!(outcome.state.phase(), Phase::Revealed);
        assert_eq!(outcome.rounds_won, 0);
    }

    #[test]
    fn test_game_loop_switch_game() {
        let paths = fixture_paths("switch");
        let mut interface = ScriptedInterface::new(vec![UserAction::SwitchGame]);
        let mut rng = StdRng::seed_from_u64(8);
        let outcome = game_loop(&mut interface, &paths, GameKind::Quote, &mut rng);

        assert_eq!(outcome.kind, GameKind::Eptsdle);
        let kinds: Vec<GameKind> = interface.rounds.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![GameKind::Quote, GameKind::Eptsdle]);
        assert_eq!(outcome.state.generation(), 2);
    }

    #[test]
    fn test_game_loop_load_failure_blocks_guessing() {
        let paths = DataPaths {
            quotes: Some(PathBuf::from("definitely-missing-quotes.tsv")),
            students: None,
        };
        let mut interface = ScriptedInterface::new(vec![
            UserAction::Guess("Ada Okafor".to_string()),
            UserAction::Reset,
        ]);
        let mut rng = StdRng::seed_from_u64(2);
        let outcome = game_loop(&mut interface, &paths, GameKind::Quote, &mut rng);

        // the initial load and the reload both fail
        assert_eq!(interface.load_errors, 2);
        assert_eq!(interface.errors, vec![SessionError::NotReady]);
        assert!(interface.rounds.is_empty());
        assert_eq!(outcome.state.phase(), Phase::LoadFailed);
    }

    #[test]
    fn test_source_for_uses_explicit_paths() {
        let paths = DataPaths {
            quotes: Some(PathBuf::from("q.tsv")),
            students: Some(PathBuf::from("s.xlsx")),
        };
        assert_eq!(
            paths.source_for(GameKind::Quote),
            DataSource::File(PathBuf::from("q.tsv"))
        );
        assert_eq!(
            paths.source_for(GameKind::Eptsdle),
            DataSource::File(PathBuf::from("s.xlsx"))
        );
    }
}

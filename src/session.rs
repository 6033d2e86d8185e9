//! Session state for one game of guessing.
//!
//! A [`SessionState`] is a plain value. Every transition consumes the current
//! state and returns the next one, so the controller owns exactly one copy and
//! front ends only ever read it.
//!
//! # Phases
//! - `Loading` → `Ready` once records arrive and a target is picked
//! - `Loading` → `LoadFailed` when the load fails or yields nothing
//! - `Ready` → `Ready` after a wrong guess, or with an error for an unknown name
//! - `Ready` → `Won` when the guessed name is the target's
//! - `Ready` → `Revealed` when the player gives up
//! - `Ready | Won | Revealed` → `Ready` on reset, with a fresh target

use crate::error::{LoadError, NotFoundError};
use crate::evaluator::{FeedbackEntry, evaluate};
use crate::record::Record;
use crate::store::RecordStore;
use crate::variant::GameKind;
use crate::{debug_log, info_log};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Won,
    Revealed,
    LoadFailed,
}

/// Problems shown to the player. None of them end the program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Error loading student data. Please try refreshing.")]
    Load { detail: String },

    #[error("Student not found. Please try another name.")]
    NotFound(#[from] NotFoundError),

    #[error("This round is over. Reset to play again.")]
    GameOver,

    #[error("Student data is still loading.")]
    NotReady,
}

/// One submitted guess and its verdicts.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessEntry {
    pub record: Record,
    pub feedback: Vec<FeedbackEntry>,
}

impl GuessEntry {
    #[must_use]
    pub fn all_correct(&self) -> bool {
        self.feedback.iter().all(|entry| entry.correct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    phase: Phase,
    target: Option<Record>,
    history: Vec<GuessEntry>,
    error: Option<SessionError>,
    generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            target: None,
            history: Vec::new(),
            error: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn target(&self) -> Option<&Record> {
        self.target.as_ref()
    }

    /// Guesses so far, most recent first.
    #[must_use]
    pub fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    #[must_use]
    pub fn latest(&self) -> Option<&GuessEntry> {
        self.history.first()
    }

    #[must_use]
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn guess_count(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Revealed)
    }

    /// Start a new load. Results tagged with an older generation are ignored.
    #[must_use]
    pub fn begin_load(self) -> Self {
        let generation = self.generation + 1;
        debug_log!("SessionState::begin_load() - generation {}", generation);
        Self {
            generation,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn finish_load<R: Rng>(
        self,
        generation: u64,
        result: &Result<RecordStore, LoadError>,
        rng: &mut R,
    ) -> Self {
        if generation != self.generation || self.phase != Phase::Loading {
            info_log!(
                "Ignoring stale load result (generation {}, current {})",
                generation,
                self.generation
            );
            return self;
        }
        let store = match result {
            Ok(store) => store,
            Err(err) => {
                log::error!("Failed to load records: {err}");
                return self.fail_load(err.to_string());
            }
        };
        match store.select_target(rng) {
            Ok(target) => {
                debug_log!("finish_load() - target picked from {} records", store.len());
                Self {
                    phase: Phase::Ready,
                    target: Some(target.clone()),
                    ..self
                }
            }
            Err(err) => {
                log::error!("Loaded store cannot supply a target: {err}");
                let detail = LoadError::Empty {
                    source_name: store.source_name().to_string(),
                };
                self.fail_load(detail.to_string())
            }
        }
    }

    fn fail_load(self, detail: String) -> Self {
        Self {
            phase: Phase::LoadFailed,
            target: None,
            history: Vec::new(),
            error: Some(SessionError::Load { detail }),
            ..self
        }
    }

    /// Resolve `input` to a record, score it against the target and record
    /// the guess. Unknown names leave the history untouched.
    #[must_use]
    pub fn submit(mut self, store: &RecordStore, kind: GameKind, input: &str) -> Self {
        match self.phase {
            Phase::Ready => {}
            Phase::Won | Phase::Revealed => {
                self.error = Some(SessionError::GameOver);
                return self;
            }
            Phase::Loading | Phase::LoadFailed => {
                self.error = Some(SessionError::NotReady);
                return self;
            }
        }
        let Some(target) = self.target.as_ref() else {
            self.error = Some(SessionError::NotReady);
            return self;
        };
        let guessed = match store.resolve(input) {
            Ok(record) => record,
            Err(err) => {
                debug_log!("submit() - {}", err);
                self.error = Some(err.into());
                return self;
            }
        };

        let feedback = evaluate(target, guessed, kind.feedback_fields());
        let won = guessed.name() == target.name();
        info_log!(
            "Guess '{}' ({} of {} fields correct)",
            guessed.name(),
            feedback.iter().filter(|entry| entry.correct).count(),
            feedback.len()
        );
        self.history.insert(
            0,
            GuessEntry {
                record: guessed.clone(),
                feedback,
            },
        );
        self.error = None;
        if won {
            self.phase = Phase::Won;
        }
        self
    }

    /// Give up and show the answer.
    #[must_use]
    pub fn reveal(mut self) -> Self {
        if self.phase == Phase::Ready {
            self.phase = Phase::Revealed;
            self.error = None;
        }
        self
    }

    /// Pick a new target and clear the round. Only valid once records are loaded.
    #[must_use]
    pub fn reset<R: Rng>(self, store: &RecordStore, rng: &mut R) -> Self {
        if !matches!(self.phase, Phase::Ready | Phase::Won | Phase::Revealed) {
            return self;
        }
        match store.select_target(rng) {
            Ok(target) => Self {
                phase: Phase::Ready,
                target: Some(target.clone()),
                history: Vec::new(),
                error: None,
                generation: self.generation,
            },
            Err(err) => self.fail_load(err.to_string()),
        }
    }

    #[must_use]
    pub fn clear_error(mut self) -> Self {
        if self.phase != Phase::LoadFailed {
            self.error = None;
        }
        self
    }
}

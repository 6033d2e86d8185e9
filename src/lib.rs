// Library interface for the EPTSdle and QuoteGuesser games
// This allows integration tests to access internal modules

pub mod cli;
pub mod error;
pub mod evaluator;
pub mod game_state;
pub mod loader;
pub mod logging;
pub mod record;
pub mod session;
pub mod store;
pub mod tui;
pub mod variant;

// Re-export commonly used items for easier testing
pub use error::{LoadError, NotFoundError, SelectionError};
pub use evaluator::{FeedbackEntry, Hint, evaluate};
pub use game_state::{DataPaths, GameInterface, GameOutcome, UserAction, game_loop};
pub use loader::{DataSource, LoadTask, load_store_from_file, load_store_from_str};
pub use record::{Record, Value};
pub use session::{GuessEntry, Phase, SessionError, SessionState};
pub use store::{RecordStore, SUGGESTION_LIMIT};
pub use variant::GameKind;

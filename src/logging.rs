use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

// Conditional logging macros - only active in debug builds

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

const LOG_DIR_NAME: &str = "eptsdle";

/// Log file for a run starting now, under the user cache directory.
#[must_use]
pub fn log_file_path() -> Option<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dirs::cache_dir().map(|dir| dir.join(LOG_DIR_NAME).join(format!("eptsdle-{stamp}.log")))
}

/// Set up `env_logger` from `RUST_LOG` (default `warn`).
///
/// The full-screen interface owns the terminal, so its log goes to a file;
/// returns the file path in that case. A logger is installed even when the
/// file cannot be opened.
pub fn init_logging(to_file: bool) -> io::Result<Option<PathBuf>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let mut written_to = Ok(None);
    if to_file {
        let (target, opened) = file_target(log_file_path());
        builder.target(target);
        written_to = opened;
    }
    // A second init (tests, embedding) keeps the first logger
    let _ = builder.try_init();
    written_to
}

/// Target for file logging. Output is discarded when no file can be used,
/// never sent to the terminal.
fn file_target(path: Option<PathBuf>) -> (env_logger::Target, io::Result<Option<PathBuf>>) {
    let Some(path) = path else {
        return (env_logger::Target::Pipe(Box::new(io::sink())), Ok(None));
    };
    let opened = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| File::create(&path));
    match opened {
        Ok(file) => (env_logger::Target::Pipe(Box::new(file)), Ok(Some(path))),
        Err(e) => (env_logger::Target::Pipe(Box::new(io::sink())), Err(e)),
    }
}

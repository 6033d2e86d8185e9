//! TUI (Terminal User Interface) module for the guessing games
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Architecture
//! - `TuiModel`: everything the screen shows plus the text being typed; all
//!   key handling lives here so it can run without a terminal
//! - `TuiInterface`: owns the terminal, renders the model and implements
//!   `GameInterface` for the game loop
//!
//! # State Machine
//! - `Loading` → `EnteringGuess` once a round starts, or `LoadFailed`
//! - `EnteringGuess` → `RoundOver` on a win or a reveal
//! - `RoundOver` / `LoadFailed` → back to `Loading` or `EnteringGuess` on reset

use crate::cli::format_answer;
use crate::evaluator::FeedbackEntry;
use crate::game_state::{GameInterface, UserAction};
use crate::record::Record;
use crate::session::{GuessEntry, SessionError};
use crate::store::{RecordStore, SUGGESTION_LIMIT};
use crate::variant::GameKind;
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
#[allow(clippy::cast_possible_truncation)]
const SUGGESTION_PANEL_HEIGHT: u16 = SUGGESTION_LIMIT as u16 + 2;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const CORRECT_STYLE: Style = Style::new().fg(Color::White).bg(Color::Green);
const WRONG_STYLE: Style = Style::new().fg(Color::White).bg(Color::Red);
const SELECTED_STYLE: Style = Style::new().fg(Color::White).bg(Color::Blue);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    Loading,
    EnteringGuess,
    /// Round finished: won, or the answer was revealed
    RoundOver {
        won: bool,
    },
    LoadFailed,
}

/// Screen contents and input handling, independent of the terminal.
#[derive(Debug)]
pub struct TuiModel {
    kind: GameKind,
    state: TuiState,
    clue: String,
    current_input: String,
    suggestions: Vec<String>,
    selected: Option<usize>,
    history: Vec<GuessEntry>,
    answer: Vec<String>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiModel {
    #[must_use]
    pub fn new(kind: GameKind) -> Self {
        Self {
            kind,
            state: TuiState::Loading,
            clue: String::new(),
            current_input: String::new(),
            suggestions: Vec::new(),
            selected: None,
            history: Vec::new(),
            answer: Vec::new(),
            message: String::new(),
            error_message: String::new(),
            status: "Starting".to_string(),
        }
    }

    #[must_use]
    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Route a key press to the handler for the current state.
    pub fn handle_key(&mut self, key: KeyEvent, store: Option<&RecordStore>) -> Option<UserAction> {
        match self.state {
            TuiState::Loading => None,
            TuiState::EnteringGuess => self.handle_guess_input(key, store),
            TuiState::RoundOver { .. } => Self::handle_round_over_input(key),
            TuiState::LoadFailed => Self::handle_load_failed_input(key),
        }
    }

    fn handle_guess_input(&mut self, key: KeyEvent, store: Option<&RecordStore>) -> Option<UserAction> {
        debug_log!(
            "handle_guess_input() - Processing key: {:?}, current_input: '{}'",
            key.code,
            self.current_input
        );
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('r' | 'R') => Some(UserAction::Reset),
                KeyCode::Char('g' | 'G') => Some(UserAction::Reveal),
                KeyCode::Char('t' | 'T') => Some(UserAction::SwitchGame),
                KeyCode::Char('c' | 'C') => Some(UserAction::Exit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => {
                info_log!("handle_guess_input() - ESC pressed, returning Exit");
                return Some(UserAction::Exit);
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::ALT) => {
                debug_log!("handle_guess_input() - Ignoring character with ALT");
            }
            KeyCode::Char(c) => {
                self.current_input.push(c);
                self.error_message.clear();
                self.refresh_suggestions(store);
            }
            KeyCode::Backspace if !self.current_input.is_empty() => {
                self.current_input.pop();
                self.error_message.clear();
                self.refresh_suggestions(store);
            }
            KeyCode::Down if !self.suggestions.is_empty() => {
                let last = self.suggestions.len() - 1;
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
            }
            KeyCode::Up => {
                self.selected = match self.selected {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
            }
            KeyCode::Tab => self.accept_suggestion(),
            KeyCode::Enter => {
                if self.selected.is_some() {
                    self.accept_suggestion();
                }
                let guess = self.current_input.trim().to_string();
                if guess.is_empty() {
                    self.error_message = "Type a student's name first.".to_string();
                } else {
                    self.suggestions.clear();
                    info_log!("handle_guess_input() - Submitting guess '{}'", guess);
                    return Some(UserAction::Guess(guess));
                }
            }
            _ => {
                debug_log!("handle_guess_input() - Ignoring key: {:?}", key.code);
            }
        }
        None
    }

    fn handle_round_over_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('n' | 'N' | 'r' | 'R') => Some(UserAction::Reset),
            KeyCode::Char('s' | 'S' | 't' | 'T') => Some(UserAction::SwitchGame),
            KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn handle_load_failed_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('r' | 'R') => Some(UserAction::Reset),
            KeyCode::Char('s' | 'S' | 't' | 'T') => Some(UserAction::SwitchGame),
            KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn refresh_suggestions(&mut self, store: Option<&RecordStore>) {
        self.suggestions = store
            .map(|store| {
                store
                    .suggest(&self.current_input, SUGGESTION_LIMIT)
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        self.selected = None;
    }

    /// Fill the input with the highlighted (or first) suggestion.
    fn accept_suggestion(&mut self) {
        let index = self.selected.unwrap_or(0);
        if let Some(name) = self.suggestions.get(index) {
            self.current_input.clone_from(name);
            self.suggestions.clear();
            self.selected = None;
        }
    }

    fn start_loading(&mut self, kind: GameKind, source: &str) {
        *self = Self::new(kind);
        self.status = format!("Loading {} from {source}...", kind.title());
    }

    fn start_round(&mut self, kind: GameKind, target: &Record, record_count: usize) {
        self.kind = kind;
        self.state = TuiState::EnteringGuess;
        self.clue = kind
            .prompt_field()
            .and_then(|field| target.get(field))
            .map(|clue| format!("\"{clue}\""))
            .unwrap_or_else(|| kind.tagline().to_string());
        self.current_input.clear();
        self.suggestions.clear();
        self.selected = None;
        self.history.clear();
        self.answer.clear();
        self.error_message.clear();
        self.message.clear();
        self.status = format!("New round - {record_count} students loaded");
    }

    fn record_guess(&mut self, entry: &GuessEntry, guess_count: usize) {
        self.history.insert(0, entry.clone());
        self.current_input.clear();
        self.error_message.clear();
        self.status = format!("Guess {guess_count}: {}", entry.record.name());
    }

    fn finish_round(&mut self, won: bool, target: &Record) {
        self.state = TuiState::RoundOver { won };
        self.suggestions.clear();
        self.answer = format_answer(self.kind, target);
        if won {
            self.message = format!("Congratulations! {}", self.kind.win_message());
        } else {
            self.message = format!("Better luck next time! It was {}.", target.name());
        }
    }

    fn fail_load(&mut self, error: &SessionError) {
        self.state = TuiState::LoadFailed;
        self.error_message = error.to_string();
        if let SessionError::Load { detail } = error {
            self.status = detail.clone();
        }
    }
}

/// Main TUI interface component.
///
/// Manages terminal rendering and input, and plugs into the game loop.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    model: TuiModel,
}

impl TuiInterface {
    pub fn new(kind: GameKind) -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete: alternate screen, cursor hidden");

        Ok(Self {
            terminal,
            model: TuiModel::new(kind),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let model = &self.model;
        self.terminal.draw(|f| render(f, model))?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn next_key(&mut self) -> Result<Option<KeyEvent>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                // Alt-tab and focus changes can leak escape sequences as garbage characters
                if let KeyCode::Char(c) = key.code
                    && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
                {
                    debug_log!("next_key() - Ignoring invalid character: {:?}", c);
                    return Ok(None);
                }
                Ok(Some(key))
            }
            Event::Key(_)
            | Event::Mouse(_)
            | Event::FocusGained
            | Event::FocusLost
            | Event::Paste(_)
            | Event::Resize(_, _) => Ok(None),
        }
    }
}

impl GameInterface for TuiInterface {
    fn display_loading(&mut self, kind: GameKind, source: &str) {
        self.model.start_loading(kind, source);
        self.draw_or_log();
    }

    fn display_load_error(&mut self, _kind: GameKind, error: &SessionError) {
        self.model.fail_load(error);
        self.draw_or_log();
    }

    fn display_round(&mut self, kind: GameKind, target: &Record, record_count: usize) {
        self.model.start_round(kind, target, record_count);
        self.draw_or_log();
    }

    fn read_action(&mut self, store: Option<&RecordStore>) -> Option<UserAction> {
        loop {
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }
            match self.next_key() {
                Ok(Some(key)) => {
                    if let Some(action) = self.model.handle_key(key, store) {
                        info_log!("read_action() - Action received: {:?}", action);
                        return Some(action);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    info_log!("read_action() - Error handling input: {}", e);
                    return Some(UserAction::Exit);
                }
            }
        }
    }

    fn display_guess(&mut self, _kind: GameKind, entry: &GuessEntry, guess_count: usize) {
        self.model.record_guess(entry, guess_count);
        self.draw_or_log();
    }

    fn display_error(&mut self, error: &SessionError) {
        self.model.error_message = error.to_string();
        self.draw_or_log();
    }

    fn display_won(&mut self, _kind: GameKind, target: &Record, _guess_count: usize) {
        self.model.finish_round(true, target);
        self.draw_or_log();
    }

    fn display_answer(&mut self, _kind: GameKind, target: &Record) {
        self.model.finish_round(false, target);
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.model.status = "Exiting...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the complete UI layout from the model.
fn render(f: &mut Frame, model: &TuiModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                       // Title
            Constraint::Length(5),                       // Clue
            Constraint::Length(3),                       // Input
            Constraint::Length(SUGGESTION_PANEL_HEIGHT), // Suggestions
            Constraint::Min(6),                          // Guesses / answer
            Constraint::Length(3),                       // Status line
            Constraint::Length(3),                       // Instructions
        ])
        .split(f.area());

    render_title(f, chunks[0], model.kind);
    render_clue(f, chunks[1], model);
    render_input(f, chunks[2], model);
    render_suggestions(f, chunks[3], &model.suggestions, model.selected);
    render_history(f, chunks[4], model);
    render_status(f, chunks[5], &model.status, &model.error_message);
    render_instructions(f, chunks[6], model.state);
}

fn render_title(f: &mut Frame, area: Rect, kind: GameKind) {
    let line = Line::from(vec![
        Span::styled(kind.title(), HEADER_STYLE),
        Span::raw(format!("   (Ctrl-T: switch to {})", kind.other().title())),
    ]);
    let title = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_clue(f: &mut Frame, area: Rect, model: &TuiModel) {
    let text = match model.state {
        TuiState::Loading => "Loading student data...".to_string(),
        _ => model.clue.clone(),
    };
    let paragraph = Paragraph::new(text)
        .style(MESSAGE_STYLE)
        .block(
            Block::default()
                .title(model.kind.heading())
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_input(f: &mut Frame, area: Rect, model: &TuiModel) {
    let mut spans = vec![Span::raw("> "), Span::raw(model.current_input.as_str())];
    if model.state == TuiState::EnteringGuess {
        spans.push(Span::styled("_", INFO_STYLE));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Student name").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_suggestions(f: &mut Frame, area: Rect, suggestions: &[String], selected: Option<usize>) {
    let lines: Vec<Line> = suggestions
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if selected == Some(i) {
                Line::from(Span::styled(format!(" {name} "), SELECTED_STYLE))
            } else {
                Line::from(format!(" {name}"))
            }
        })
        .collect();
    let paragraph =
        Paragraph::new(lines).block(Block::default().title("Suggestions").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_history(f: &mut Frame, area: Rect, model: &TuiModel) {
    let mut lines = Vec::new();

    if let TuiState::RoundOver { won } = model.state {
        let style = if won { SUCCESS_STYLE } else { INFO_STYLE };
        lines.push(Line::from(Span::styled(model.message.as_str(), style)));
        for line in &model.answer {
            lines.push(Line::from(format!("  {line}")));
        }
        lines.push(Line::from(""));
    }

    for entry in &model.history {
        lines.push(Line::from(Span::styled(
            entry.record.name(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(feedback_line(entry));
        lines.push(Line::from(""));
    }

    let title = format!("Guesses ({})", model.history.len());
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Green and red cells, one per field, with arrows on numeric misses.
fn feedback_line(entry: &GuessEntry) -> Line<'static> {
    let mut spans = Vec::new();
    for feedback in &entry.feedback {
        let cell = format!(" {} ", feedback_cell(feedback));
        let style = if feedback.correct { CORRECT_STYLE } else { WRONG_STYLE };
        spans.push(Span::styled(cell, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// `field: value`, with an arrow when the answer is higher or lower.
fn feedback_cell(feedback: &FeedbackEntry) -> String {
    let value = feedback
        .guessed
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    match feedback.hint {
        Some(hint) => format!("{}: {value} {}", feedback.field, hint.arrow()),
        None => format!("{}: {value}", feedback.field),
    }
}

fn render_status(f: &mut Frame, area: Rect, status: &str, error_message: &str) {
    let paragraph = if error_message.is_empty() {
        let status_text = if status.is_empty() { "Ready" } else { status };
        Paragraph::new(status_text.to_string()).style(HEADER_STYLE)
    } else {
        Paragraph::new(error_message.to_string()).style(ERROR_STYLE)
    };
    f.render_widget(
        paragraph.block(Block::default().borders(Borders::ALL).title("Status")),
        area,
    );
}

fn render_instructions(f: &mut Frame, area: Rect, state: TuiState) {
    let text = match state {
        TuiState::Loading => "Loading...",
        TuiState::EnteringGuess => {
            "ENTER: Guess | TAB/↑↓: Suggestions | Ctrl-G: Show answer | Ctrl-R: Reset | ESC: Quit"
        }
        TuiState::RoundOver { .. } => "N: Play again | S: Switch game | ESC: Quit",
        TuiState::LoadFailed => "R: Retry loading | S: Switch game | ESC: Quit",
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

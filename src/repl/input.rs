//! Query input for the interactive loop
//!
//! `ReadlineInput` reads from the terminal with rustyline (line editing and
//! persistent history); `ScriptedInput` replays a fixed list of events.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::warn;

use crate::errors::Result;

pub const DEFAULT_PROMPT: &str = "Enter your query (or type 'exit' to stop): ";

/// One read from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A line of text, already trimmed
    Line(String),
    /// Ctrl-C at the prompt
    Interrupted,
    /// Ctrl-D / end of input
    Eof,
}

/// Source of queries for the loop
pub trait QueryInput {
    fn read_query(&mut self) -> Result<InputEvent>;
}

/// Terminal input with history
pub struct ReadlineInput {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl ReadlineInput {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            history_path: None,
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self {
            editor,
            history_path: Some(history_file),
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}

impl QueryInput for ReadlineInput {
    fn read_query(&mut self) -> Result<InputEvent> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    if let Err(e) = self.editor.add_history_entry(trimmed) {
                        warn!(error = %e, "failed to record history entry");
                    }
                }
                Ok(InputEvent::Line(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Replays prepared events, then reports end of input
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Each string becomes a `Line` event
    pub fn lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::new(lines.into_iter().map(|l| InputEvent::Line(l.into())))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl QueryInput for ScriptedInput {
    fn read_query(&mut self) -> Result<InputEvent> {
        Ok(self.events.pop_front().unwrap_or(InputEvent::Eof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scripted_input_order() {
        let mut input = ScriptedInput::lines(["one", "two"]);
        assert_eq!(input.read_query().unwrap(), InputEvent::Line("one".into()));
        assert_eq!(input.read_query().unwrap(), InputEvent::Line("two".into()));
        assert_eq!(input.read_query().unwrap(), InputEvent::Eof);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_readline_input_creation() {
        assert!(ReadlineInput::new().is_ok());
    }

    #[test]
    fn test_default_prompt() {
        let input = ReadlineInput::new().unwrap();
        assert_eq!(input.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_history_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let history_path = temp_dir.path().join("nested").join("history");

        {
            let mut input = ReadlineInput::with_history(history_path.clone()).unwrap();
            let _ = input.editor.add_history_entry("what is a vector?");
            input.save_history().unwrap();
        }

        assert!(history_path.exists());
        assert_eq!(input_history_len(&history_path), 1);
    }

    fn input_history_len(path: &PathBuf) -> usize {
        use rustyline::history::History;
        let input = ReadlineInput::with_history(path.clone()).unwrap();
        input.editor.history().len()
    }
}

//! Query loop state machine
//!
//! Valid transitions:
//! 1.  AwaitingInput → Searching      (on: Submit)
//! 2.  AwaitingInput → Stopped        (on: Exit)
//! 3.  Searching     → Displaying     (on: ResultsReady)
//! 4.  Searching     → AwaitingInput  (on: QueryFailed)
//! 5.  Displaying    → Generating     (on: Generate)
//! 6.  Displaying    → AwaitingInput  (on: Done)
//! 7.  Generating    → AwaitingInput  (on: Done | QueryFailed)
//! 8.  \*            → Stopped        (on: Interrupt)
//! 9.  Stopped       → Stopped        (terminal)
//!
//! A failed query always lands back in `AwaitingInput`; only `Exit` and
//! `Interrupt` reach `Stopped`.

use crate::errors::{Result, SymbiontError};

/// Query loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    AwaitingInput,
    Searching,
    Displaying,
    Generating,
    Stopped,
}

/// Events that drive the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// A query was entered
    Submit,
    /// Exit sentinel or end of input
    Exit,
    /// Search returned
    ResultsReady,
    /// LLM answer requested
    Generate,
    /// Query fully handled
    Done,
    /// Search or generation failed
    QueryFailed,
    /// Ctrl-C
    Interrupt,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Stopped)
    }

    pub fn transition(&self, event: LoopEvent) -> Result<LoopState> {
        use LoopEvent::*;
        use LoopState::*;

        if event == Interrupt {
            return Ok(Stopped);
        }

        let next = match (self, event) {
            (AwaitingInput, Submit) => Searching,
            (AwaitingInput, Exit) => Stopped,

            (Searching, ResultsReady) => Displaying,
            (Searching, QueryFailed) => AwaitingInput,

            (Displaying, Generate) => Generating,
            (Displaying, Done) => AwaitingInput,

            (Generating, Done) => AwaitingInput,
            (Generating, QueryFailed) => AwaitingInput,

            (Stopped, _) => Stopped,

            (from, event) => {
                return Err(SymbiontError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }
}

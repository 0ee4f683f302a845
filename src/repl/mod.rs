//! Interactive query loop
//!
//! Reads queries, runs retrieval (and optionally generation) for each one,
//! and keeps going until the exit sentinel, end of input or Ctrl-C. A
//! failure while serving one query is logged and the loop returns to the
//! prompt; it never ends the session.

pub mod display;
pub mod input;
pub mod state;

use tracing::{error, info};

use crate::errors::Result;
use crate::rag::RagPipeline;

pub use display::DisplayManager;
pub use input::{InputEvent, QueryInput, ReadlineInput, ScriptedInput};
pub use state::{LoopEvent, LoopState};

/// Typing this (any case) ends the session
pub const EXIT_SENTINEL: &str = "exit";

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Sentinel,
    EndOfInput,
    Interrupted,
}

/// What happened to a single query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Results shown, LLM disabled
    Retrieved { documents: usize },
    /// Results shown and the LLM answered
    Answered { documents: usize, answer: String },
    /// Search failed; nothing shown
    RetrievalFailed { error: String },
    /// Results shown but the LLM call failed
    GenerationFailed { documents: usize, error: String },
}

impl QueryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            QueryOutcome::RetrievalFailed { .. } | QueryOutcome::GenerationFailed { .. }
        )
    }
}

/// Totals for a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub queries: usize,
    pub failures: usize,
    pub exit: ExitReason,
}

/// Drives [`LoopState`] over a [`RagPipeline`]
pub struct QueryLoop<'a> {
    pipeline: &'a mut RagPipeline,
    display: DisplayManager,
    state: LoopState,
    queries: usize,
    failures: usize,
}

impl<'a> QueryLoop<'a> {
    pub fn new(pipeline: &'a mut RagPipeline, display: DisplayManager) -> Self {
        Self {
            pipeline,
            display,
            state: LoopState::AwaitingInput,
            queries: 0,
            failures: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    fn advance(&mut self, event: LoopEvent) -> Result<()> {
        self.state = self.state.transition(event)?;
        Ok(())
    }

    /// Stop after Ctrl-C arrived outside the prompt, clearing any spinner
    pub fn interrupt(&mut self) {
        self.state = LoopState::Stopped;
        self.display.finish_current();
        self.display.show_goodbye();
        info!(queries = self.queries, failures = self.failures, "session interrupted");
    }

    /// Totals so far, reported as an interrupted session
    pub fn interrupted_summary(&self) -> LoopSummary {
        LoopSummary {
            queries: self.queries,
            failures: self.failures,
            exit: ExitReason::Interrupted,
        }
    }

    /// Run until the user stops the session
    pub async fn run<I: QueryInput + ?Sized>(&mut self, input: &mut I) -> Result<LoopSummary> {
        loop {
            let exit = match input.read_query()? {
                InputEvent::Line(line) if line.is_empty() => continue,
                InputEvent::Line(line) if line.eq_ignore_ascii_case(EXIT_SENTINEL) => {
                    self.advance(LoopEvent::Exit)?;
                    ExitReason::Sentinel
                }
                InputEvent::Line(line) => {
                    self.handle_query(&line).await?;
                    continue;
                }
                InputEvent::Eof => {
                    self.advance(LoopEvent::Exit)?;
                    ExitReason::EndOfInput
                }
                InputEvent::Interrupted => {
                    self.advance(LoopEvent::Interrupt)?;
                    self.display.show_goodbye();
                    ExitReason::Interrupted
                }
            };

            info!(queries = self.queries, failures = self.failures, reason = ?exit, "session ended");
            return Ok(LoopSummary {
                queries: self.queries,
                failures: self.failures,
                exit,
            });
        }
    }

    /// Serve one query: search, display, then optionally generate.
    ///
    /// Per-query failures are reported through the returned outcome; an
    /// `Err` here only signals a broken state machine.
    pub async fn handle_query(&mut self, query: &str) -> Result<QueryOutcome> {
        self.advance(LoopEvent::Submit)?;
        self.queries += 1;
        self.pipeline.begin_query();

        let results = match self.pipeline.search(query).await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "Error during search and QA");
                self.display.show_error(&e.to_string());
                self.failures += 1;
                self.advance(LoopEvent::QueryFailed)?;
                return Ok(QueryOutcome::RetrievalFailed {
                    error: e.to_string(),
                });
            }
        };

        self.advance(LoopEvent::ResultsReady)?;
        let documents = results.len();
        self.pipeline.absorb(&results);
        self.display.show_results(&results);

        if !self.pipeline.llm_enabled() {
            self.advance(LoopEvent::Done)?;
            return Ok(QueryOutcome::Retrieved { documents });
        }

        self.advance(LoopEvent::Generate)?;
        let model = self.pipeline.model_name().unwrap_or("the LLM");
        let _spinner = self.display.start_generating(model);

        match self.pipeline.generate(query).await {
            Ok(Some(answer)) => {
                self.display.show_answer(&answer);
                self.advance(LoopEvent::Done)?;
                Ok(QueryOutcome::Answered { documents, answer })
            }
            Ok(None) => {
                self.display.finish_current();
                self.advance(LoopEvent::Done)?;
                Ok(QueryOutcome::Retrieved { documents })
            }
            Err(e) => {
                error!(error = %e, "Error during search and QA");
                self.display.show_error(&e.to_string());
                self.failures += 1;
                self.advance(LoopEvent::QueryFailed)?;
                Ok(QueryOutcome::GenerationFailed {
                    documents,
                    error: e.to_string(),
                })
            }
        }
    }
}

//! Terminal output for the query loop
//!
//! Results and answers go to stdout, coloured by kind (green for
//! information, yellow for warnings, red for errors).

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::document::ScoredDocument;

const SEPARATOR_WIDTH: usize = 40;

/// Display manager for the query loop
pub struct DisplayManager {
    pub(super) current_bar: Option<ProgressBar>,
    update_interval: Duration,
    show_progress: bool,
}

impl DisplayManager {
    /// Update frequency: 10 FPS (100ms interval)
    pub fn new() -> Self {
        DisplayManager {
            current_bar: None,
            update_interval: Duration::from_millis(100),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, collection: &str, k: usize, model: Option<&str>) {
        let width = 64;
        let title = format!("  Symbiont {} - Document Q&A", version);
        let answers = model.map(|m| format!("LLM: {}", m)).unwrap_or_else(|| "LLM: off".to_string());
        let info = format!("  Collection: {} | k: {} | {}", collection, k, answers);

        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!("Type your question (or {} to quit)\n", "exit".green());
    }

    /// Print every retrieved document
    pub fn show_results(&self, results: &[ScoredDocument]) {
        if results.is_empty() {
            self.show_warning("No matching documents found");
            return;
        }

        for result in results {
            println!("{}", format_result(result).green());
        }
    }

    /// Spinner shown while waiting for the LLM
    pub fn start_generating(&mut self, model: &str) -> ProgressBar {
        self.finish_current();

        let pb = if self.show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Asking {}...", model));
        pb.enable_steady_tick(self.update_interval);

        self.current_bar = Some(pb.clone());
        pb
    }

    /// Finish current progress bar
    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Display the generated answer
    pub fn show_answer(&mut self, answer: &str) {
        self.finish_current();
        println!("\n{}\n{}\n", "Answer:".bold().green(), answer.green());
    }

    /// Display error message
    pub fn show_error(&mut self, error: &str) {
        self.finish_current();
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    pub fn show_goodbye(&self) {
        println!("{}", "Exiting gracefully...".green());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata, flattened page content and a separator for one document
pub fn format_result(result: &ScoredDocument) -> String {
    let mut out = String::from("Document Metadata:\n");
    for (key, value) in &result.document.metadata {
        out.push_str(&format!("  {}: {}\n", key, format_value(value)));
    }
    out.push_str(&format!("  score: {:.4}\n", result.score));
    out.push_str("\nPage Content:\n");
    out.push_str(&result.document.flattened_content());
    out.push_str(&format!("\n\n{}\n", "=".repeat(SEPARATOR_WIDTH)));
    out
}

/// Strings without quotes, everything else as JSON
fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn sample() -> ScoredDocument {
        ScoredDocument {
            document: Document::new("first line\nsecond line")
                .with_metadata("source", "docs/guide.pdf")
                .with_metadata("page", 3),
            score: 0.87654,
        }
    }

    #[test]
    fn test_format_result() {
        let text = format_result(&sample());
        assert!(text.starts_with("Document Metadata:\n"));
        assert!(text.contains("  source: docs/guide.pdf\n"));
        assert!(text.contains("  page: 3\n"));
        assert!(text.contains("  score: 0.8765\n"));
        assert!(text.contains("Page Content:\nfirst line second line"));
        assert!(text.trim_end().ends_with(&"=".repeat(SEPARATOR_WIDTH)));
    }

    #[test]
    fn test_display_manager_creation() {
        let manager = DisplayManager::new();
        assert!(manager.current_bar.is_none());
        assert_eq!(manager.update_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_generating_spinner_lifecycle() {
        let mut manager = DisplayManager::new().with_progress(false);
        let _pb = manager.start_generating("gpt-3.5-turbo");
        assert!(manager.current_bar.is_some());

        manager.show_answer("42");
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_spinner_names_model() {
        let mut manager = DisplayManager::new().with_progress(false);
        let pb = manager.start_generating("gpt-4o-mini");
        assert!(pb.message().contains("gpt-4o-mini"));
    }

    #[test]
    fn test_error_clears_spinner() {
        let mut manager = DisplayManager::new().with_progress(false);
        let _pb = manager.start_generating("m");
        manager.show_error("boom");
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_message_display() {
        let manager = DisplayManager::new();
        manager.show_results(&[sample()]);
        manager.show_results(&[]);
        manager.show_warning("Test warning");
        manager.show_banner("v0.3.0", "docs", 3, Some("gpt-3.5-turbo"));
        manager.show_banner("v0.3.0", "docs", 3, None);
        manager.show_goodbye();
    }
}

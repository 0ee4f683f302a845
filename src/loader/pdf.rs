//! PDF directory loader
//!
//! Walks a directory tree, picks up every `*.pdf` file and emits one
//! [`Document`] per page. Page numbers in metadata are 0-based.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::DocumentSource;
use crate::document::Document;
use crate::errors::{Result, SymbiontError};

const PDF_EXTENSION: &str = "pdf";

/// Loads every PDF below `root`
#[derive(Debug, Clone)]
pub struct PdfDirectoryLoader {
    root: PathBuf,
    show_progress: bool,
}

impl PdfDirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            show_progress: false,
        }
    }

    /// Show a progress bar while files are parsed
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// All matching files, sorted for a deterministic load order
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        collect_pdfs(&self.root, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Extract one document per page of a single file
    pub fn load_file(path: &Path) -> Result<Vec<Document>> {
        let load_err = |reason: String| SymbiontError::DocumentLoadError {
            path: path.display().to_string(),
            reason,
        };

        let pdf = lopdf::Document::load(path).map_err(|e| load_err(e.to_string()))?;
        let pages = pdf.get_pages();
        let total_pages = pages.len();
        let source = path.display().to_string();

        let mut documents = Vec::with_capacity(total_pages);
        for (index, page_number) in pages.keys().enumerate() {
            let text = pdf
                .extract_text(&[*page_number])
                .map_err(|e| load_err(format!("page {}: {}", page_number, e)))?;

            documents.push(
                Document::new(text.trim_end())
                    .with_metadata("source", source.clone())
                    .with_metadata("file_path", source.clone())
                    .with_metadata("page", index)
                    .with_metadata("total_pages", total_pages),
            );
        }

        debug!(file = %source, pages = total_pages, "loaded pdf");
        Ok(documents)
    }
}

impl DocumentSource for PdfDirectoryLoader {
    fn load(&self) -> Result<Vec<Document>> {
        let files = self.discover()?;
        info!(directory = %self.root.display(), files = files.len(), "loading documents");

        let pb = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.cyan} Loading [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut documents = Vec::new();
        for file in &files {
            pb.set_message(
                file.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            match Self::load_file(file) {
                Ok(pages) => documents.extend(pages),
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(documents)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PDF_EXTENSION))
        .unwrap_or(false)
}

fn collect_pdfs(current: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let read_dir = fs::read_dir(current).map_err(|e| SymbiontError::DocumentLoadError {
        path: current.display().to_string(),
        reason: format!("Failed to read directory: {}", e),
    })?;

    for entry in read_dir {
        let path = entry?.path();
        if is_hidden(&path) {
            continue;
        }

        if path.is_dir() {
            collect_pdfs(&path, files)?;
        } else if is_pdf(&path) {
            files.push(path);
        }
    }

    Ok(())
}

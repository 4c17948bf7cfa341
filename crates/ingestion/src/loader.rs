//! Document loader
//!
//! Produces page-level text plus metadata for a file or a directory of PDFs.
//! The primary extractor parses the content-stream operator structure and
//! takes the title from the document information dictionary; when primary
//! extraction fails, a lossy extractor runs instead and the title is derived
//! from the filename.

use crate::errors::IngestionError;
use crate::pdf;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One page of extracted text with its metadata
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub content: String,
    pub metadata: PageMetadata,
}

/// Metadata attached to every extracted page
#[derive(Debug, Clone)]
pub struct PageMetadata {
    pub title: String,
    pub source: PathBuf,
    /// 1-based page number
    pub page: usize,
}

/// Loads PDFs into page documents, remembering the title resolved for each
/// file.
#[derive(Default)]
pub struct DocumentLoader {
    extracted_titles: HashMap<String, String>,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles resolved so far, keyed by file name
    pub fn extracted_titles(&self) -> &HashMap<String, String> {
        &self.extracted_titles
    }

    /// Load a single PDF into page documents.
    pub fn load_document(&mut self, path: &Path) -> Result<Vec<PageDocument>, IngestionError> {
        let (pages, title) = match pdf::extract_pages(path) {
            Ok(pages) => {
                let title =
                    pdf::metadata_title(path).unwrap_or_else(|| title_from_filename(path));
                (pages, title)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Primary extraction failed, falling back");
                let pages = pdf::extract_pages_lossy(path)?;
                (pages, title_from_filename(path))
            }
        };

        info!(path = %path.display(), title = %title, pages = pages.len(), "Document loaded");
        self.remember_title(path, &title);

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(index, content)| PageDocument {
                content,
                metadata: PageMetadata {
                    title: title.clone(),
                    source: path.to_path_buf(),
                    page: index + 1,
                },
            })
            .collect())
    }

    /// Load every PDF in a directory, skipping files that fail to extract.
    pub fn load_directory(&mut self, dir: &Path) -> Result<Vec<PageDocument>, IngestionError> {
        let mut documents = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map(|e| e == "pdf").unwrap_or(false) {
                match self.load_document(&path) {
                    Ok(pages) => documents.extend(pages),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to load PDF, skipping");
                    }
                }
            }
        }

        if documents.is_empty() {
            warn!(dir = %dir.display(), "No PDF documents found or loaded from the directory");
        }

        Ok(documents)
    }

    fn remember_title(&mut self, path: &Path, title: &str) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.extracted_titles.insert(file_name, title.to_string());
    }
}

/// Derive a display title from the file name: stem with underscores and
/// hyphens turned into spaces
pub fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string())
        .replace(['_', '-'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_filename() {
        assert_eq!(
            title_from_filename(Path::new("papers/attention_is-all_you-need.pdf")),
            "attention is all you need"
        );
        assert_eq!(title_from_filename(Path::new("plain.pdf")), "plain");
    }

    #[test]
    fn test_load_directory_skips_missing_pdfs() {
        let dir = std::env::temp_dir().join(format!("citegraph-loader-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        // A file with a .pdf extension that is not a PDF gets skipped
        std::fs::write(dir.join("not_really.pdf"), b"plain text").unwrap();
        std::fs::write(dir.join("ignored.txt"), b"not a pdf").unwrap();

        let mut loader = DocumentLoader::new();
        let documents = loader.load_directory(&dir).unwrap();
        assert!(documents.is_empty());
        assert!(loader.extracted_titles().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}

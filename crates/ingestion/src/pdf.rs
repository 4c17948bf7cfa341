//! PDF text extraction module
//!
//! Extracts page-level text from PDF files using lopdf. The primary path
//! parses text-showing operators out of each page's content stream; a lossy
//! fallback scans for string literals without honoring the operator
//! structure.

use crate::errors::IngestionError;
use lopdf::{Document, Object};
use std::path::Path;
use tracing::{debug, warn};

/// Extract text per page. Pages that fail individually are logged and
/// yield an empty string; a document with no text at all is an error.
pub fn extract_pages(path: &Path) -> Result<Vec<String>, IngestionError> {
    let doc = load_document(path)?;
    let pages = doc.get_pages();

    debug!(page_count = pages.len(), "Extracting text from PDF");

    let mut extracted = Vec::with_capacity(pages.len());
    for (page_num, page_id) in pages.iter() {
        match doc.get_page_content(*page_id) {
            Ok(content) => extracted.push(clean_text(&text_from_content(&content, true))),
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to read page content, skipping");
                extracted.push(String::new());
            }
        }
    }

    if extracted.iter().all(|page| page.trim().is_empty()) {
        return Err(IngestionError::PdfParse {
            path: path.display().to_string(),
            message: "No text content extracted from PDF".to_string(),
        });
    }

    Ok(extracted)
}

/// Lossy fallback: collect every string literal in each page's content
/// stream, ignoring the text-block operator structure.
pub fn extract_pages_lossy(path: &Path) -> Result<Vec<String>, IngestionError> {
    let doc = load_document(path)?;
    let pages = doc.get_pages();

    let extracted: Vec<String> = pages
        .values()
        .map(|page_id| match doc.get_page_content(*page_id) {
            Ok(content) => clean_text(&text_from_content(&content, false)),
            Err(_) => String::new(),
        })
        .collect();

    if extracted.iter().all(|page| page.trim().is_empty()) {
        return Err(IngestionError::PdfParse {
            path: path.display().to_string(),
            message: "No text content recovered by fallback extractor".to_string(),
        });
    }

    Ok(extracted)
}

/// Title from the document information dictionary, if present
pub fn metadata_title(path: &Path) -> Option<String> {
    let doc = load_document(path).ok()?;
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    match info.get(b"Title").ok()? {
        Object::String(bytes, _) => {
            let title = String::from_utf8_lossy(bytes).trim().to_string();
            (!title.is_empty()).then_some(title)
        }
        _ => None,
    }
}

fn load_document(path: &Path) -> Result<Document, IngestionError> {
    if !path.exists() {
        return Err(IngestionError::FileNotFound(path.display().to_string()));
    }
    Document::load(path).map_err(|e| IngestionError::PdfParse {
        path: path.display().to_string(),
        message: format!("Failed to load PDF: {}", e),
    })
}

/// Pull text out of a page content stream. With `structured` set, only
/// string literals inside BT/ET text blocks next to text-showing operators
/// count; otherwise every parenthesized literal is taken.
fn text_from_content(content: &[u8], structured: bool) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = !structured;

    for line in content_str.lines() {
        let trimmed = line.trim();

        if structured {
            match trimmed {
                "BT" => {
                    in_text_block = true;
                    continue;
                }
                "ET" => {
                    in_text_block = false;
                    text.push(' ');
                    continue;
                }
                _ => {}
            }
            if !in_text_block || !is_text_showing(trimmed) {
                continue;
            }
        }

        if let Some(literal) = literals_in_line(trimmed) {
            text.push_str(&literal);
            text.push(' ');
        }
    }

    text
}

/// Whether a content-stream line ends in a text-showing operator
fn is_text_showing(line: &str) -> bool {
    line.ends_with("Tj") || line.ends_with("TJ") || line.ends_with('\'') || line.ends_with('"')
}

/// Concatenated, unescaped string literals on one line, if any
fn literals_in_line(line: &str) -> Option<String> {
    let mut result = String::new();
    let mut current = String::new();
    let mut in_paren = false;
    let mut escaped = false;

    for ch in line.chars() {
        if in_paren {
            if escaped {
                current.push(unescape(ch));
                escaped = false;
            } else {
                match ch {
                    '\\' => escaped = true,
                    ')' => {
                        in_paren = false;
                        result.push_str(&current);
                        current.clear();
                    }
                    _ => current.push(ch),
                }
            }
        } else if ch == '(' {
            in_paren = true;
        }
    }

    (!result.is_empty()).then_some(result)
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

/// Collapse whitespace and strip common PDF artifacts
fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{FEFF}', "")
}

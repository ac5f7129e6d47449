//! Document extraction for rubric upload.
//!
//! A rubric arrives either as a PDF, whose text is extracted on a blocking
//! thread, or as a grid of `cell-<row>-<col>` form fields, which is rendered
//! as a Markdown table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("uploaded document is empty")]
    EmptyDocument,

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("no readable text found in document")]
    NoText,

    #[error("malformed table cell name '{0}'")]
    BadCell(String),

    #[error("table cell '{cell}' is outside the {max_rows}x{max_cols} grid")]
    TableTooLarge {
        cell: String,
        max_rows: usize,
        max_cols: usize,
    },
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Returns the document's text as Markdown.
    async fn extract(&self, document: Bytes) -> Result<String, AppError>;
}

/// Local PDF text extraction via `pdf-extract`.
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, AppError> {
        if document.is_empty() {
            return Err(ExtractError::EmptyDocument.into());
        }

        // pdf-extract is synchronous and CPU-bound
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&document)
                .map_err(|e| ExtractError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}")))??;

        let text = normalize_extracted(&text);
        if text.is_empty() {
            return Err(ExtractError::NoText.into());
        }
        Ok(text)
    }
}

/// Collapses runs of blank lines and turns bullet glyphs into Markdown list items.
fn normalize_extracted(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() && lines.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        let line = line.trim_start();
        let line = match line.strip_prefix('•').or_else(|| line.strip_prefix('●')) {
            Some(rest) => format!("- {}", rest.trim_start()),
            None => line.to_string(),
        };
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

/// Largest rubric grid accepted from `cell-<row>-<col>` fields.
pub const MAX_TABLE_ROWS: usize = 50;
pub const MAX_TABLE_COLS: usize = 50;

/// Builds a row-major grid from `cell-<row>-<col>` fields. Missing cells are empty.
/// Indices outside `MAX_TABLE_ROWS` x `MAX_TABLE_COLS` are rejected.
pub fn table_from_cells(pairs: &[(String, String)]) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut cells: BTreeMap<(usize, usize), &str> = BTreeMap::new();
    for (name, value) in pairs {
        let Some(coords) = name.strip_prefix("cell-") else {
            continue;
        };
        let (row, col) = coords
            .split_once('-')
            .and_then(|(r, c)| Some((r.parse::<usize>().ok()?, c.parse::<usize>().ok()?)))
            .ok_or_else(|| ExtractError::BadCell(name.clone()))?;
        if row >= MAX_TABLE_ROWS || col >= MAX_TABLE_COLS {
            return Err(ExtractError::TableTooLarge {
                cell: name.clone(),
                max_rows: MAX_TABLE_ROWS,
                max_cols: MAX_TABLE_COLS,
            });
        }
        cells.insert((row, col), value.as_str());
    }

    let rows = cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0);
    let mut table: Vec<Vec<String>> = vec![Vec::new(); rows];
    for ((row, col), value) in cells {
        let line = &mut table[row];
        if line.len() <= col {
            line.resize(col + 1, String::new());
        }
        line[col] = value.to_string();
    }
    Ok(table)
}

/// Renders a grid as a Markdown table with the first row as header.
/// Returns `None` when every cell is blank.
pub fn table_to_markdown(table: &[Vec<String>]) -> Option<String> {
    if table.iter().flatten().all(|c| c.trim().is_empty()) {
        return None;
    }
    let width = table.iter().map(Vec::len).max().unwrap_or(0);
    let render_row = |row: &Vec<String>| {
        (0..width)
            .map(|i| row.get(i).map(|c| clean_cell(c)).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut markdown = String::new();
    let mut rows = table.iter();
    if let Some(header) = rows.next() {
        markdown.push_str(&render_row(header));
        markdown.push('\n');
        markdown.push_str(&vec!["---"; width].join(" | "));
        markdown.push('\n');
    }
    for row in rows {
        markdown.push_str(&render_row(row));
        markdown.push('\n');
    }
    Some(markdown)
}

/// Table cells are single-line: bullets become dashes, newlines become spaces.
fn clean_cell(cell: &str) -> String {
    cell.replace("\n•", "\n- ")
        .replace("\n●", "\n- ")
        .replace('\n', " ")
        .replace('|', "\\|")
        .trim()
        .to_string()
}

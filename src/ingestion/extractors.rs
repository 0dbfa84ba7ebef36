use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Supported document formats, picked by file extension.
/// Uploads with any other extension are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Resolve a kind from a filename or path. Matching is case-insensitive.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "md" | "csv" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Extract the visible text of the file at `path`.
    ///
    /// Returns an empty string when the document has no text-bearing content.
    pub fn extract(self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let text = match self {
            Self::Pdf => extract_pdf_text(&bytes)?,
            Self::Docx => extract_docx_text(&bytes)?,
            Self::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        };

        if text.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(text)
    }
}

/// Dispatch on the extension of `path`. Unsupported formats yield no text.
pub fn extract_text(path: &Path) -> Result<String> {
    match DocumentKind::from_path(path) {
        Some(kind) => kind.extract(path),
        None => Ok(String::new()),
    }
}

/// Extract text from PDF bytes with a `Page N:` header before every non-blank page
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .context("Failed to extract PDF text")?;

    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(idx, text)| format!("Page {}:\n{}", idx + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extract paragraph text, then table rows, from a .docx package
pub fn extract_docx_text(docx_bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(docx_bytes)).context("Failed to open DOCX archive")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX archive has no word/document.xml")?
        .read_to_string(&mut xml)
        .context("Failed to read word/document.xml")?;

    let body = parse_document_xml(&xml)?;

    let mut lines: Vec<String> = body
        .paragraphs
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect();

    for row in body.table_rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .collect();
        if !cells.is_empty() {
            lines.push(cells.join(" | "));
        }
    }

    if lines.is_empty() {
        return Ok(String::new());
    }

    Ok(format!("Document Text:\n{}", lines.join("\n")))
}

#[derive(Debug, Default)]
struct DocxBody {
    paragraphs: Vec<String>,
    table_rows: Vec<Vec<String>>,
}

/// Walk WordprocessingML collecting top-level paragraphs and table cells.
///
/// Paragraphs nested in table cells belong to the cell, not to `paragraphs`.
/// Nested tables are flattened into the enclosing cell.
fn parse_document_xml(xml: &str) -> Result<DocxBody> {
    let mut reader = Reader::from_str(xml);
    let mut body = DocxBody::default();

    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut in_run = false;
    let mut paragraph = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<String> = None;

    loop {
        match reader.read_event().context("Malformed word/document.xml")? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"tr" if table_depth == 1 => row.clear(),
                b"tc" if table_depth == 1 => cell = Some(String::new()),
                b"p" if table_depth == 0 => paragraph.clear(),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            // Tab stops under w:pPr/w:tabs are also <w:tab/>; only runs carry text
            Event::Empty(e) if in_run => match e.local_name().as_ref() {
                b"tab" => push_text(table_depth, &mut paragraph, &mut cell, "\t"),
                b"br" | b"cr" => push_text(table_depth, &mut paragraph, &mut cell, "\n"),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e.unescape().context("Invalid text in word/document.xml")?;
                push_text(table_depth, &mut paragraph, &mut cell, &text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" if table_depth == 0 => body.paragraphs.push(std::mem::take(&mut paragraph)),
                b"p" => {
                    // Separate paragraphs within one cell
                    if let Some(cell) = cell.as_mut() {
                        if !cell.is_empty() && !cell.ends_with(' ') {
                            cell.push(' ');
                        }
                    }
                }
                b"tc" if table_depth == 1 => {
                    if let Some(text) = cell.take() {
                        row.push(text);
                    }
                }
                b"tr" if table_depth == 1 => body.table_rows.push(std::mem::take(&mut row)),
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body)
}

fn push_text(table_depth: usize, paragraph: &mut String, cell: &mut Option<String>, text: &str) {
    if table_depth == 0 {
        paragraph.push_str(text);
    } else if let Some(cell) = cell.as_mut() {
        cell.push_str(text);
    }
}

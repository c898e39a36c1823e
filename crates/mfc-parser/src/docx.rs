//! DOCX document parser using docx-rs
//!
//! Reads the top-level paragraphs of a Word document in order. Tables,
//! headers and footers are not part of the article text and are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use docx_rs::{
    read_docx, Break, BreakType, DocumentChild, Docx, Paragraph, ParagraphChild, Run, RunChild,
};
use tracing::debug;

use crate::{DocumentParser, FileType, ParsedDocument, ParserError, Result};

/// DOCX document parser
#[derive(Debug, Default)]
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    /// Append the visible text of a paragraph's runs to `out`.
    ///
    /// Line breaks and carriage returns become `\n`; page and column breaks
    /// carry no text.
    fn collect_text(children: &[ParagraphChild], out: &mut String) {
        let silent = [Break::new(BreakType::Page), Break::new(BreakType::Column)];
        for child in children {
            match child {
                ParagraphChild::Run(run) => {
                    for run_child in &run.children {
                        match run_child {
                            RunChild::Text(text) => out.push_str(&text.text),
                            RunChild::Tab(_) => out.push('\t'),
                            RunChild::Break(br) if !silent.contains(br) => out.push('\n'),
                            RunChild::CarriageReturn(_) => out.push('\n'),
                            _ => {}
                        }
                    }
                }
                ParagraphChild::Hyperlink(link) => Self::collect_text(&link.children, out),
                _ => {}
            }
        }
    }
}

impl DocumentParser for DocxParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let mut file = File::open(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| ParserError::IoError {
                path: path.display().to_string(),
                source: e,
            })?;

        let docx = read_docx(&buf).map_err(|e| ParserError::DocxError(e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in &docx.document.children {
            if let DocumentChild::Paragraph(para) = child {
                let mut text = String::new();
                Self::collect_text(&para.children, &mut text);
                paragraphs.push(text);
            }
        }
        debug!(path = %path.display(), paragraphs = paragraphs.len(), "parsed docx");

        Ok(ParsedDocument::new(path.display().to_string(), FileType::Docx)
            .with_paragraphs(paragraphs))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Docx]
    }
}

/// Write `paragraphs` as a minimal DOCX file, one run per paragraph.
///
/// Empty strings become empty paragraphs.
pub fn write_docx<S: AsRef<str>>(path: &Path, paragraphs: &[S]) -> Result<()> {
    let file = File::create(path).map_err(|e| ParserError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        let text = text.as_ref();
        let paragraph = if text.is_empty() {
            Paragraph::new()
        } else {
            Paragraph::new().add_run(Run::new().add_text(text))
        };
        docx.add_paragraph(paragraph)
    });

    docx.build()
        .pack(file)
        .map_err(|e| ParserError::DocxError(e.to_string()))
}

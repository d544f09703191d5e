//! Structured-text DOCX extraction
//!
//! A DOCX file is a zip archive; the document body lives in
//! `word/document.xml`. Text runs (`<w:t>`) are gathered per paragraph
//! (`<w:p>`) and non-empty paragraphs are concatenated with blank lines.

use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Extract text from a DOCX document.
///
/// Returns the extracted text and the number of non-empty paragraphs.
pub(crate) fn extract_docx(path: &Path) -> Result<(String, usize), ExtractError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut document_xml)?;

    let paragraphs = collect_paragraphs(&document_xml)?;
    let count = paragraphs.len();
    Ok((paragraphs.join("\n\n"), count))
}

fn collect_paragraphs(document_xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(document_xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
        }
    }

    Ok(paragraphs)
}

//! Page-based PDF text extraction

use crate::error::ExtractError;
use lopdf::Document;
use std::path::Path;
use tracing::warn;

/// Extract text from every page of a PDF.
///
/// A single page's extraction failure contributes an empty string for that
/// page and is logged; only a document-level parse failure is an error.
/// Returns the extracted text and the page count.
pub(crate) fn extract_pdf(path: &Path) -> Result<(String, usize), ExtractError> {
    let doc = Document::load(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut parts: Vec<String> = Vec::with_capacity(page_count);
    for (page_num, _object_id) in pages {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => parts.push(page_text),
            Err(err) => {
                warn!(
                    "failed to extract page {} of {}: {}",
                    page_num,
                    path.display(),
                    err
                );
                parts.push(String::new());
            }
        }
    }

    Ok((parts.join("\n\n"), page_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn invalid_pdf_is_a_document_level_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a pdf").unwrap();

        let result = extract_pdf(&path);
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }
}
